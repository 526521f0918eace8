//! Schema migrations tracked with `PRAGMA user_version`.

pub mod v001_entities;
pub mod v002_conflict_history;
pub mod v003_conflict_notifications;
pub mod v004_audit_log;

use rusqlite::Connection;
use tracing::info;

use concord_core::errors::{ConcordResult, StorageError};

/// Highest schema version this build knows about.
pub const LATEST_VERSION: u32 = 4;

const MIGRATIONS: &[(&str, u32)] = &[
    (v001_entities::MIGRATION_SQL, 1),
    (v002_conflict_history::MIGRATION_SQL, 2),
    (v003_conflict_notifications::MIGRATION_SQL, 3),
    (v004_audit_log::MIGRATION_SQL, 4),
];

fn failed(version: u32, e: rusqlite::Error) -> StorageError {
    StorageError::MigrationFailed {
        version,
        reason: e.to_string(),
    }
}

/// Run every migration above the stored schema version. Each step and
/// its version bump commit together.
pub fn run_migrations(conn: &Connection) -> ConcordResult<u32> {
    let current = current_version(conn)?;

    for (sql, version) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| failed(*version, e))?;
        tx.execute_batch(sql).map_err(|e| failed(*version, e))?;
        tx.pragma_update(None, "user_version", version)
            .map_err(|e| failed(*version, e))?;
        tx.commit().map_err(|e| failed(*version, e))?;
        info!(version = version, "applied migration");
    }

    Ok(current.max(LATEST_VERSION))
}

/// Get the current schema version.
pub fn current_version(conn: &Connection) -> ConcordResult<u32> {
    let version = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| failed(0, e))?;
    Ok(version)
}
