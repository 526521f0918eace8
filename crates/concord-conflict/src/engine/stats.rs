use std::collections::BTreeMap;

use serde::Serialize;

use concord_core::models::{ConflictRecord, ConflictStatus, Severity};

/// Summary of conflict history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictStats {
    pub total: usize,
    pub auto_resolved: usize,
    pub pending_manual: usize,
    pub manually_resolved: usize,
    pub dismissed: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    /// Entities currently holding back queued remote updates.
    pub blocked_entities: usize,
}

impl ConflictStats {
    pub(crate) fn from_records(records: &[ConflictRecord], blocked_entities: usize) -> Self {
        let mut stats = Self {
            total: records.len(),
            blocked_entities,
            ..Self::default()
        };
        for r in records {
            match r.status {
                ConflictStatus::AutoResolved => stats.auto_resolved += 1,
                ConflictStatus::PendingManual => stats.pending_manual += 1,
                ConflictStatus::ManuallyResolved => stats.manually_resolved += 1,
                ConflictStatus::Dismissed => stats.dismissed += 1,
            }
            *stats.by_severity.entry(r.severity).or_insert(0) += 1;
        }
        stats
    }
}
