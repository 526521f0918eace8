//! Error taxonomy for the conflict engine.

mod merge_error;
mod storage_error;

pub use merge_error::MergeError;
pub use storage_error::StorageError;

/// Convenience alias used throughout the workspace.
pub type ConcordResult<T> = Result<T, ConcordError>;

/// Top-level error for every Concord operation.
#[derive(Debug, thiserror::Error)]
pub enum ConcordError {
    /// A version vector is missing required structure. Detection fails
    /// closed on this: the pair is treated as a critical conflict.
    #[error("malformed version vector: {reason}")]
    MalformedVector { reason: String },

    /// A custom entity merger found an impossible merged state.
    #[error("merge invariant violated: {0}")]
    MergeInvariantViolation(#[from] MergeError),

    /// Compare-and-set failed because local state moved on.
    #[error("stale write rejected for entity {entity_id}")]
    StaleWriteRejected { entity_id: String },

    /// No merge strategy is registered for this entity type tag.
    #[error("unknown entity type: {type_name}")]
    UnknownEntityType { type_name: String },

    #[error("conflict not found: {id}")]
    ConflictNotFound { id: String },

    #[error("notification not found: {id}")]
    NotificationNotFound { id: String },

    /// The record already carries a resolved snapshot.
    #[error("conflict {id} is already resolved")]
    AlreadyResolved { id: String },

    /// History is append-only; a record id may only be written once.
    #[error("conflict {id} is already recorded")]
    DuplicateConflict { id: String },

    /// Manual resolution was requested for a conflict that is not pending.
    #[error("conflict {id} is not pending manual resolution")]
    NotPending { id: String },

    /// The resolution was recorded, but writing it opened another pending
    /// conflict on the same entity.
    #[error("resolution of conflict {id} was not applied, conflict {pending} is pending")]
    ResolutionNotApplied { id: String, pending: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for ConcordError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

impl From<toml::de::Error> for ConcordError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl ConcordError {
    /// Errors the engine handles by retrying rather than surfacing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StaleWriteRejected { .. })
    }
}
