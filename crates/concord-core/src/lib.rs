//! # concord-core
//!
//! Foundation crate for the Concord conflict engine.
//! Defines the entity model, version vectors, conflict records, errors,
//! config, and the traits implemented by the storage and UI collaborators.
//! Every other crate in the workspace depends on this.

pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use clock::{Causality, VersionVector};
pub use config::ConcordConfig;
pub use errors::{ConcordError, ConcordResult};
pub use models::{
    ConflictNotification, ConflictRecord, ConflictStatus, ConflictType, DetectedConflict,
    EntitySnapshot, EntityState, EntityType, FieldValue, ResolutionStrategy, Severity,
};
