//! Conflict history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::conflict::{ConflictType, DetectedConflict, Severity};
use super::entity::{EntitySnapshot, EntityType};

/// How a conflict was (or will be) settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Whole-entity last-write-wins.
    AutoLww,
    /// Field-level merge through the strategy registry.
    AutoMerge,
    /// Explicit override keeping the local snapshot.
    LocalWins,
    /// Explicit override keeping the remote snapshot.
    RemoteWins,
    /// Deferred to the user.
    Manual,
    /// A user-edited snapshot.
    Custom,
}

impl ResolutionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoLww => "auto_lww",
            Self::AutoMerge => "auto_merge",
            Self::LocalWins => "local_wins",
            Self::RemoteWins => "remote_wins",
            Self::Manual => "manual",
            Self::Custom => "custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto_lww" => Some(Self::AutoLww),
            "auto_merge" => Some(Self::AutoMerge),
            "local_wins" => Some(Self::LocalWins),
            "remote_wins" => Some(Self::RemoteWins),
            "manual" => Some(Self::Manual),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Strategies that come from a user or policy choice rather than a
    /// deterministic rule.
    pub fn is_override(self) -> bool {
        matches!(self, Self::LocalWins | Self::RemoteWins | Self::Custom)
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position of a recorded conflict.
///
/// `AutoResolved`, `ManuallyResolved` and `Dismissed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    AutoResolved,
    PendingManual,
    ManuallyResolved,
    Dismissed,
}

impl ConflictStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoResolved => "auto_resolved",
            Self::PendingManual => "pending_manual",
            Self::ManuallyResolved => "manually_resolved",
            Self::Dismissed => "dismissed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto_resolved" => Some(Self::AutoResolved),
            "pending_manual" => Some(Self::PendingManual),
            "manually_resolved" => Some(Self::ManuallyResolved),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::PendingManual)
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable history entry for one conflict.
///
/// Only `viewed` and `dismissed` change after creation, plus the one-shot
/// resolution (`resolved_snapshot` goes from `None` to a value once).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub conflict_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub conflicting_fields: BTreeSet<String>,
    pub local_snapshot: EntitySnapshot,
    pub remote_snapshot: EntitySnapshot,
    pub resolved_snapshot: Option<EntitySnapshot>,
    /// Best-effort merge computed at detection time; dismissal commits it.
    pub proposed_snapshot: Option<EntitySnapshot>,
    pub resolution_strategy: ResolutionStrategy,
    pub status: ConflictStatus,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Device or user that resolved it. `None` for automatic resolution.
    pub resolved_by: Option<String>,
    /// Invariant violation or vector error that forced manual handling.
    pub violation: Option<String>,
    pub viewed: bool,
    pub dismissed: bool,
}

impl ConflictRecord {
    /// Start a record from a detected conflict. Resolution fields are empty.
    pub fn from_conflict(conflict: &DetectedConflict, strategy: ResolutionStrategy) -> Self {
        Self {
            conflict_id: conflict.id.clone(),
            entity_type: conflict.entity_type.clone(),
            entity_id: conflict.entity_id.clone(),
            conflict_type: conflict.conflict_type,
            severity: conflict.severity,
            conflicting_fields: conflict.conflicting_fields.clone(),
            local_snapshot: conflict.local.clone(),
            remote_snapshot: conflict.remote.clone(),
            resolved_snapshot: None,
            proposed_snapshot: None,
            resolution_strategy: strategy,
            status: ConflictStatus::PendingManual,
            detected_at: conflict.detected_at,
            resolved_at: None,
            resolved_by: None,
            violation: conflict.vector_error.clone(),
            viewed: false,
            dismissed: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ConflictStatus::PendingManual
    }
}

/// The one-shot resolution applied to a pending record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordResolution {
    pub snapshot: EntitySnapshot,
    pub strategy: ResolutionStrategy,
    pub status: ConflictStatus,
    pub resolved_at: DateTime<Utc>,
    pub resolved_by: Option<String>,
}

/// Filters for history queries. Empty filters match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryQuery {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<ConflictStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn for_entity(entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    /// In-memory evaluation of the filter (range is `[from, to)`).
    pub fn matches(&self, record: &ConflictRecord) -> bool {
        self.entity_type
            .as_ref()
            .map_or(true, |t| *t == record.entity_type)
            && self
                .entity_id
                .as_ref()
                .map_or(true, |id| *id == record.entity_id)
            && self.severity.map_or(true, |s| s == record.severity)
            && self.status.map_or(true, |s| s == record.status)
            && self.from.map_or(true, |from| record.detected_at >= from)
            && self.to.map_or(true, |to| record.detected_at < to)
    }
}
