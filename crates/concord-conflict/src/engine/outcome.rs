//! Results handed back to the sync and UI collaborators.

use concord_core::models::{ConflictNotification, ConflictRecord, EntitySnapshot};
use serde::Serialize;

/// What happened to one inbound remote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Same causal history as local. Nothing to do.
    Unchanged,
    /// Remote is older than local.
    KeepLocal,
    /// Remote descends from local (or local did not exist).
    ApplyRemote { snapshot: EntitySnapshot },
    /// Concurrent but identical content; only the vector moved.
    Converged { snapshot: EntitySnapshot },
    AutoResolved {
        record: ConflictRecord,
        snapshot: EntitySnapshot,
        notification: Option<ConflictNotification>,
    },
    /// Waiting for the user. Local state stays as is.
    PendingManual {
        record: ConflictRecord,
        notification: Option<ConflictNotification>,
    },
    /// The entity already has a pending conflict; the update waits in line.
    Queued { conflict_id: String, queue_len: usize },
}

impl SyncOutcome {
    /// Snapshot the caller must write, if any.
    pub fn snapshot_to_commit(&self) -> Option<&EntitySnapshot> {
        match self {
            Self::ApplyRemote { snapshot }
            | Self::Converged { snapshot }
            | Self::AutoResolved { snapshot, .. } => Some(snapshot),
            Self::Unchanged | Self::KeepLocal | Self::PendingManual { .. } | Self::Queued { .. } => {
                None
            }
        }
    }

    pub fn record(&self) -> Option<&ConflictRecord> {
        match self {
            Self::AutoResolved { record, .. } | Self::PendingManual { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&ConflictNotification> {
        match self {
            Self::AutoResolved { notification, .. } | Self::PendingManual { notification, .. } => {
                notification.as_ref()
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::KeepLocal => "keep_local",
            Self::ApplyRemote { .. } => "apply_remote",
            Self::Converged { .. } => "converged",
            Self::AutoResolved { .. } => "auto_resolved",
            Self::PendingManual { .. } => "pending_manual",
            Self::Queued { .. } => "queued",
        }
    }
}

/// The user's answer to a pending conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum ManualChoice {
    KeepLocal,
    KeepRemote,
    /// A snapshot the user edited by hand.
    Custom(EntitySnapshot),
}

/// A settled pending conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualResolution {
    pub record: ConflictRecord,
    /// Snapshot to commit.
    pub snapshot: EntitySnapshot,
    /// Remote updates that arrived while the conflict was pending, oldest
    /// first. They must be re-diffed against the committed state.
    pub released: Vec<EntitySnapshot>,
}

/// A manual resolution or dismissal written through an entity store.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    pub resolution: ManualResolution,
    /// How the resolved snapshot landed against the stored entity.
    pub applied: SyncOutcome,
    /// Outcomes of the released queued updates, in order.
    pub replayed: Vec<SyncOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub records: usize,
    pub notifications: usize,
}
