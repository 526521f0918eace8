//! # concord-conflict
//!
//! The conflict pipeline: detection, automatic resolution, history,
//! notifications, and the [`ConflictEngine`] that wires them together with
//! per-entity serialization and a queue for updates that arrive while a
//! conflict waits for the user.

pub mod conflict;
pub mod engine;
pub mod notification;

pub use conflict::detection::{conflict_id, ConflictDetector, Detection};
pub use conflict::history::InMemoryConflictHistory;
pub use conflict::resolution::{AutoResolver, ResolutionOutcome};
pub use engine::{
    CommitReport, ConflictEngine, ConflictStats, ManualChoice, ManualResolution, PurgeReport,
    SyncOutcome,
};
pub use notification::generator::NotificationGenerator;
pub use notification::outbox::InMemoryOutbox;
