//! Interfaces to the engine's external collaborators.

mod audit_sink;
mod conflict_history;
mod entity_store;
mod hierarchy;
mod notification_outbox;

pub use audit_sink::IAuditSink;
pub use conflict_history::IConflictHistory;
pub use entity_store::IEntityStore;
pub use hierarchy::{IHierarchyLookup, NoHierarchy};
pub use notification_outbox::INotificationOutbox;
