//! Detected conflicts and their classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::entity::{EntitySnapshot, EntityType};

/// What kind of divergence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Both sides edited a live record.
    ConcurrentUpdate,
    /// Local side deleted, remote side updated.
    DeleteUpdate,
    /// Local side updated, remote side deleted.
    UpdateDelete,
    /// The two sides disagree on the entity type tag.
    TypeMismatch,
}

impl ConflictType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConcurrentUpdate => "concurrent_update",
            Self::DeleteUpdate => "delete_update",
            Self::UpdateDelete => "update_delete",
            Self::TypeMismatch => "type_mismatch",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "concurrent_update" => Some(Self::ConcurrentUpdate),
            "delete_update" => Some(Self::DeleteUpdate),
            "update_delete" => Some(Self::UpdateDelete),
            "type_mismatch" => Some(Self::TypeMismatch),
            _ => None,
        }
    }

    pub fn involves_deletion(self) -> bool {
        matches!(self, Self::DeleteUpdate | Self::UpdateDelete)
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict severity, ordered from least to most serious.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified conflict between a local and a remote snapshot.
///
/// `conflicting_fields` is never empty for `ConcurrentUpdate`; deletion
/// conflicts always list the tombstone pseudo-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedConflict {
    /// Deterministic digest of the detection inputs.
    pub id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub conflicting_fields: BTreeSet<String>,
    pub local: EntitySnapshot,
    pub remote: EntitySnapshot,
    pub detected_at: DateTime<Utc>,
    /// Set when a vector failed validation and detection failed closed.
    pub vector_error: Option<String>,
}
