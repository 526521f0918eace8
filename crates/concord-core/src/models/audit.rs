//! Audit events handed to the audit collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conflict::Severity;
use super::entity::EntityType;
use super::record::{ConflictRecord, ConflictStatus, ResolutionStrategy};

/// Who/when/what for one conflict lifecycle step. Carries field names, never
/// field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictAuditEvent {
    pub conflict_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub status: ConflictStatus,
    pub strategy: ResolutionStrategy,
    pub severity: Severity,
    pub fields: Vec<String>,
    pub actor: Option<String>,
    pub dismissed: bool,
    pub at: DateTime<Utc>,
}

impl ConflictAuditEvent {
    pub fn from_record(record: &ConflictRecord, at: DateTime<Utc>) -> Self {
        Self {
            conflict_id: record.conflict_id.clone(),
            entity_type: record.entity_type.clone(),
            entity_id: record.entity_id.clone(),
            status: record.status,
            strategy: record.resolution_strategy,
            severity: record.severity,
            fields: record.conflicting_fields.iter().cloned().collect(),
            actor: record.resolved_by.clone(),
            dismissed: record.dismissed,
            at,
        }
    }
}
