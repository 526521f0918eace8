//! Data model shared by every crate.

pub mod audit;
pub mod conflict;
pub mod entity;
pub mod notification;
pub mod record;

pub use audit::ConflictAuditEvent;
pub use conflict::{ConflictType, DetectedConflict, Severity};
pub use entity::{EntitySnapshot, EntityState, EntityType, FieldValue};
pub use notification::ConflictNotification;
pub use record::{
    ConflictRecord, ConflictStatus, HistoryQuery, RecordResolution, ResolutionStrategy,
};
