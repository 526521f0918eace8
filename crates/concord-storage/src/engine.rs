//! StorageEngine: owns the connection and implements the collaborator
//! traits the conflict engine talks to.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use concord_core::clock::VersionVector;
use concord_core::config::StorageConfig;
use concord_core::errors::ConcordResult;
use concord_core::models::{
    ConflictAuditEvent, ConflictNotification, ConflictRecord, EntitySnapshot, EntityType,
    HistoryQuery, RecordResolution,
};
use concord_core::traits::{
    IAuditSink, IConflictHistory, IEntityStore, IHierarchyLookup, INotificationOutbox,
};

use crate::migrations;
use crate::pool::WriteConnection;
use crate::queries::{audit_ops, entity_ops, history_ops, notification_ops};

/// SQLite-backed storage for entities, conflict history, notifications
/// and the audit log.
pub struct StorageEngine {
    writer: WriteConnection,
}

impl StorageEngine {
    /// Open or create a database file and bring its schema up to date.
    pub fn open(path: &Path) -> ConcordResult<Self> {
        Self::open_with_timeout(path, concord_core::config::defaults::DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn from_config(config: &StorageConfig) -> ConcordResult<Self> {
        Self::open_with_timeout(Path::new(&config.db_path), config.busy_timeout_ms)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ConcordResult<Self> {
        let engine = Self {
            writer: WriteConnection::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn open_with_timeout(path: &Path, busy_timeout_ms: u32) -> ConcordResult<Self> {
        let engine = Self {
            writer: WriteConnection::open(path, busy_timeout_ms)?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> ConcordResult<()> {
        let version = self.writer.with_conn_sync(migrations::run_migrations)?;
        tracing::debug!(schema_version = version, "storage initialized");
        Ok(())
    }

    /// Run a closure against the connection. Used by tests and tooling
    /// that read tables directly.
    pub fn with_conn<F, T>(&self, f: F) -> ConcordResult<T>
    where
        F: FnOnce(&Connection) -> ConcordResult<T>,
    {
        self.writer.with_conn_sync(f)
    }

    /// Async variant for callers running on a tokio runtime, where the
    /// blocking lock of [`StorageEngine::with_conn`] would panic.
    pub async fn with_conn_async<F, T>(&self, f: F) -> ConcordResult<T>
    where
        F: FnOnce(&Connection) -> ConcordResult<T>,
    {
        self.writer.with_conn(f).await
    }

    pub fn schema_version(&self) -> ConcordResult<u32> {
        self.writer.with_conn_sync(migrations::current_version)
    }

    pub fn entity_count(&self) -> ConcordResult<usize> {
        self.writer.with_conn_sync(entity_ops::count_entities)
    }

    pub fn record_count(&self) -> ConcordResult<usize> {
        self.writer.with_conn_sync(history_ops::count_records)
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine").finish_non_exhaustive()
    }
}

impl IEntityStore for StorageEngine {
    fn get(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
    ) -> ConcordResult<Option<EntitySnapshot>> {
        self.writer
            .with_conn_sync(|conn| entity_ops::get_entity(conn, entity_type, entity_id))
    }

    fn compare_and_set(
        &self,
        expected: Option<&VersionVector>,
        snapshot: &EntitySnapshot,
    ) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| entity_ops::compare_and_set(conn, expected, snapshot))
    }
}

impl IHierarchyLookup for StorageEngine {
    fn parent_of(&self, entity_type: &EntityType, entity_id: &str) -> Option<String> {
        match self
            .writer
            .with_conn_sync(|conn| entity_ops::parent_of(conn, entity_type, entity_id))
        {
            Ok(parent) => parent,
            Err(e) => {
                tracing::warn!(entity_id, error = %e, "parent lookup failed");
                None
            }
        }
    }
}

impl IConflictHistory for StorageEngine {
    fn record(&self, record: &ConflictRecord) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| history_ops::insert_record(conn, record))
    }

    fn get(&self, conflict_id: &str) -> ConcordResult<Option<ConflictRecord>> {
        self.writer
            .with_conn_sync(|conn| history_ops::get_record(conn, conflict_id))
    }

    fn query(&self, query: &HistoryQuery) -> ConcordResult<Vec<ConflictRecord>> {
        self.writer
            .with_conn_sync(|conn| history_ops::query_records(conn, query))
    }

    fn mark_viewed(&self, conflict_id: &str) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| history_ops::mark_viewed(conn, conflict_id))
    }

    fn mark_dismissed(&self, conflict_id: &str) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| history_ops::mark_dismissed(conn, conflict_id))
    }

    fn resolve(
        &self,
        conflict_id: &str,
        resolution: &RecordResolution,
    ) -> ConcordResult<ConflictRecord> {
        self.writer
            .with_conn_sync(|conn| history_ops::resolve_record(conn, conflict_id, resolution))
    }

    fn purge_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize> {
        let cutoff = now - Duration::days(retention_days);
        self.writer
            .with_conn_sync(|conn| history_ops::purge_terminal_before(conn, cutoff))
    }
}

impl INotificationOutbox for StorageEngine {
    fn push(&self, notification: &ConflictNotification) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| notification_ops::push(conn, notification))
    }

    fn drain(&self) -> ConcordResult<Vec<ConflictNotification>> {
        self.writer.with_conn_sync(notification_ops::drain)
    }

    fn get(&self, id: &str) -> ConcordResult<Option<ConflictNotification>> {
        self.writer
            .with_conn_sync(|conn| notification_ops::get(conn, id))
    }

    fn for_conflict(&self, conflict_id: &str) -> ConcordResult<Vec<ConflictNotification>> {
        self.writer
            .with_conn_sync(|conn| notification_ops::for_conflict(conn, conflict_id))
    }

    fn active(&self) -> ConcordResult<Vec<ConflictNotification>> {
        self.writer.with_conn_sync(notification_ops::active)
    }

    fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| notification_ops::mark_viewed(conn, id, at))
    }

    fn dismiss(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| notification_ops::dismiss(conn, id, at))
    }

    fn dismiss_for_conflict(&self, conflict_id: &str, at: DateTime<Utc>) -> ConcordResult<usize> {
        self.writer
            .with_conn_sync(|conn| notification_ops::dismiss_for_conflict(conn, conflict_id, at))
    }

    fn expire_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize> {
        let cutoff = now - Duration::days(retention_days);
        self.writer
            .with_conn_sync(|conn| notification_ops::expire_before(conn, cutoff))
    }
}

impl IAuditSink for StorageEngine {
    fn append(&self, event: &ConflictAuditEvent) -> ConcordResult<()> {
        self.writer
            .with_conn_sync(|conn| audit_ops::append(conn, event))
    }
}
