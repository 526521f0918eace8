//! In-memory conflict history.
//!
//! Append-only: records are never replaced. The SQLite implementation in
//! `concord-storage` is the durable counterpart.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{ConflictRecord, HistoryQuery, RecordResolution};
use concord_core::traits::IConflictHistory;

#[derive(Debug, Default)]
pub struct InMemoryConflictHistory {
    records: RwLock<Vec<ConflictRecord>>,
}

impl InMemoryConflictHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update<T>(
        &self,
        conflict_id: &str,
        f: impl FnOnce(&mut ConflictRecord) -> ConcordResult<T>,
    ) -> ConcordResult<T> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let record = records
            .iter_mut()
            .find(|r| r.conflict_id == conflict_id)
            .ok_or_else(|| ConcordError::ConflictNotFound {
                id: conflict_id.to_string(),
            })?;
        f(record)
    }
}

impl IConflictHistory for InMemoryConflictHistory {
    fn record(&self, record: &ConflictRecord) -> ConcordResult<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if records.iter().any(|r| r.conflict_id == record.conflict_id) {
            return Err(ConcordError::DuplicateConflict {
                id: record.conflict_id.clone(),
            });
        }
        tracing::debug!(
            conflict_id = %record.conflict_id,
            status = %record.status,
            "history: conflict recorded"
        );
        records.push(record.clone());
        Ok(())
    }

    fn get(&self, conflict_id: &str) -> ConcordResult<Option<ConflictRecord>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .iter()
            .find(|r| r.conflict_id == conflict_id)
            .cloned())
    }

    fn query(&self, query: &HistoryQuery) -> ConcordResult<Vec<ConflictRecord>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut matched: Vec<ConflictRecord> =
            records.iter().filter(|r| query.matches(r)).cloned().collect();
        // Stable sort keeps insertion order among equal timestamps.
        matched.sort_by_key(|r| r.detected_at);
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    fn mark_viewed(&self, conflict_id: &str) -> ConcordResult<()> {
        self.update(conflict_id, |r| {
            r.viewed = true;
            Ok(())
        })
    }

    fn mark_dismissed(&self, conflict_id: &str) -> ConcordResult<()> {
        self.update(conflict_id, |r| {
            r.dismissed = true;
            Ok(())
        })
    }

    fn resolve(
        &self,
        conflict_id: &str,
        resolution: &RecordResolution,
    ) -> ConcordResult<ConflictRecord> {
        self.update(conflict_id, |r| {
            if r.resolved_snapshot.is_some() {
                return Err(ConcordError::AlreadyResolved {
                    id: conflict_id.to_string(),
                });
            }
            r.resolved_snapshot = Some(resolution.snapshot.clone());
            r.resolution_strategy = resolution.strategy;
            r.status = resolution.status;
            r.resolved_at = Some(resolution.resolved_at);
            r.resolved_by = resolution.resolved_by.clone();
            Ok(r.clone())
        })
    }

    fn purge_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize> {
        let cutoff = now - Duration::days(retention_days);
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|r| !(r.status.is_terminal() && r.detected_at < cutoff));
        Ok(before - records.len())
    }
}
