use crate::errors::ConcordResult;
use crate::models::ConflictAuditEvent;

/// Consumer of conflict audit events. Retention is the sink's own policy.
pub trait IAuditSink: Send + Sync {
    fn append(&self, event: &ConflictAuditEvent) -> ConcordResult<()>;
}
