use chrono::{DateTime, Utc};

use crate::errors::ConcordResult;
use crate::models::{ConflictRecord, HistoryQuery, RecordResolution};

/// Append-only conflict history.
pub trait IConflictHistory: Send + Sync {
    /// Append a record. Fails with `DuplicateConflict` if the id exists.
    fn record(&self, record: &ConflictRecord) -> ConcordResult<()>;

    fn get(&self, conflict_id: &str) -> ConcordResult<Option<ConflictRecord>>;

    /// Matching records ordered by detection time, oldest first.
    fn query(&self, query: &HistoryQuery) -> ConcordResult<Vec<ConflictRecord>>;

    fn mark_viewed(&self, conflict_id: &str) -> ConcordResult<()>;

    fn mark_dismissed(&self, conflict_id: &str) -> ConcordResult<()>;

    /// Set the resolved snapshot of a pending record. Fails with
    /// `AlreadyResolved` if one is already set.
    fn resolve(
        &self,
        conflict_id: &str,
        resolution: &RecordResolution,
    ) -> ConcordResult<ConflictRecord>;

    /// Remove terminal records detected before `now - retention_days`.
    /// Pending records are kept. Returns the number removed.
    fn purge_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize>;
}
