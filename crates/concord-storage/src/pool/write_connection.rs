//! Single write connection behind `tokio::sync::Mutex`.

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use concord_core::errors::ConcordResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// The one connection every statement runs on. Compare-and-set relies on
/// writes being serialized here.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, busy_timeout_ms: u32) -> ConcordResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ConcordResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, 0)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the lock from async code.
    pub async fn with_conn<F, T>(&self, f: F) -> ConcordResult<T>
    where
        F: FnOnce(&Connection) -> ConcordResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }

    /// Synchronous access. Must not be called from inside an async task.
    pub fn with_conn_sync<F, T>(&self, f: F) -> ConcordResult<T>
    where
        F: FnOnce(&Connection) -> ConcordResult<T>,
    {
        let guard = self.conn.blocking_lock();
        f(&guard)
    }
}
