//! # concord-storage
//!
//! SQLite persistence for the conflict engine: the entity store with
//! compare-and-set, the append-only conflict history, the notification
//! outbox and the audit log. All writes go through a single connection.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use concord_core::errors::{ConcordError, StorageError};

/// Helper to convert a SQLite error message into a `ConcordError`.
pub fn to_storage_err(msg: String) -> ConcordError {
    ConcordError::StorageError(StorageError::SqliteError { message: msg })
}
