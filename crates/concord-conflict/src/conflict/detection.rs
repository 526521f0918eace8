//! Conflict detection: decides whether a remote snapshot can simply be
//! applied or kept out, and classifies real conflicts.
//!
//! Detection is pure. The same pair and timestamp always yield the same
//! result, including the conflict id.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use concord_core::clock::{Causality, VersionVector};
use concord_core::config::DetectionConfig;
use concord_core::constants::{
    CONFLICT_ID_HEX_LEN, ENTITY_TYPE_FIELD, TOMBSTONE_FIELD, VERSION_FIELD,
};
use concord_core::models::{ConflictType, DetectedConflict, EntitySnapshot, Severity};
use concord_crdt::{FieldPriority, MergeRegistry};
use concord_observability::events;

/// What the detector concluded for one pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// Same causal history.
    Unchanged,
    /// Local is an ancestor of remote.
    ApplyRemote,
    /// Remote is an ancestor of local.
    KeepLocal,
    /// Concurrent vectors but identical content. Only the vectors need
    /// merging.
    Converged,
    Conflict(DetectedConflict),
}

impl Detection {
    pub fn conflict(&self) -> Option<&DetectedConflict> {
        match self {
            Self::Conflict(c) => Some(c),
            _ => None,
        }
    }
}

/// Deterministic conflict id over the entity and both vectors.
pub fn conflict_id(local: &EntitySnapshot, remote: &EntitySnapshot) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(remote.entity_type.as_str().as_bytes());
    hasher.update(&[0]);
    hasher.update(remote.id.as_bytes());
    for vector in [&local.version, &remote.version] {
        hasher.update(&[0]);
        for (device, counter) in vector.entries() {
            hasher.update(device.as_bytes());
            hasher.update(b"=");
            hasher.update(&counter.to_le_bytes());
            hasher.update(b";");
        }
    }
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..CONFLICT_ID_HEX_LEN].to_string()
}

#[derive(Debug, Clone, Default)]
pub struct ConflictDetector {
    config: DetectionConfig,
    registry: MergeRegistry,
}

impl ConflictDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            registry: MergeRegistry::new(),
        }
    }

    /// `Some` only for real conflicts.
    pub fn detect_conflict(
        &self,
        local: &EntitySnapshot,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> Option<DetectedConflict> {
        match self.detect(local, remote, now) {
            Detection::Conflict(c) => Some(c),
            _ => None,
        }
    }

    pub fn detect(
        &self,
        local: &EntitySnapshot,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> Detection {
        // Malformed vectors fail closed.
        if let Some(reason) = vector_error(&local.version, &remote.version) {
            events::malformed_vector(&remote.id, &reason);
            let mut fields = conflicting_fields(local, remote);
            fields.insert(VERSION_FIELD.to_string());
            return Detection::Conflict(self.build(local, remote, fields, Some(reason), now));
        }

        match local.version.compare(&remote.version) {
            Causality::Equal => Detection::Unchanged,
            Causality::Precedes => Detection::ApplyRemote,
            Causality::Follows => Detection::KeepLocal,
            Causality::Concurrent => {
                let fields = conflicting_fields(local, remote);
                if fields.is_empty() {
                    Detection::Converged
                } else {
                    Detection::Conflict(self.build(local, remote, fields, None, now))
                }
            }
        }
    }

    fn build(
        &self,
        local: &EntitySnapshot,
        remote: &EntitySnapshot,
        conflicting_fields: BTreeSet<String>,
        vector_error: Option<String>,
        now: DateTime<Utc>,
    ) -> DetectedConflict {
        let conflict_type = classify_type(local, remote);
        let mut conflict = DetectedConflict {
            id: conflict_id(local, remote),
            entity_type: remote.entity_type.clone(),
            entity_id: remote.id.clone(),
            conflict_type,
            severity: Severity::Critical,
            conflicting_fields,
            local: local.clone(),
            remote: remote.clone(),
            detected_at: now,
            vector_error,
        };
        conflict.severity = self.classify_severity(&conflict);
        conflict
    }

    /// Severity ladder: critical for anything that must not be merged
    /// silently, high for important fields or wide conflicts, low when only
    /// cosmetic fields differ.
    pub fn classify_severity(&self, conflict: &DetectedConflict) -> Severity {
        if conflict.vector_error.is_some()
            || conflict.conflict_type != ConflictType::ConcurrentUpdate
        {
            return Severity::Critical;
        }
        let fields = &conflict.conflicting_fields;
        if fields
            .iter()
            .any(|f| self.config.blocking_fields.iter().any(|b| b == f))
        {
            return Severity::Critical;
        }

        let priorities: Vec<FieldPriority> = fields
            .iter()
            .map(|f| self.registry.priority_of(&conflict.entity_type, f))
            .collect();
        if priorities.contains(&FieldPriority::High)
            || fields.len() > self.config.high_severity_field_threshold
        {
            Severity::High
        } else if priorities.iter().all(|p| *p == FieldPriority::Cosmetic) {
            Severity::Low
        } else {
            Severity::Medium
        }
    }
}

fn vector_error(local: &VersionVector, remote: &VersionVector) -> Option<String> {
    [("local", local), ("remote", remote)]
        .into_iter()
        .find_map(|(side, v)| v.validate().err().map(|e| format!("{side}: {e}")))
}

fn classify_type(local: &EntitySnapshot, remote: &EntitySnapshot) -> ConflictType {
    if local.entity_type != remote.entity_type {
        ConflictType::TypeMismatch
    } else {
        match (local.is_deleted(), remote.is_deleted()) {
            (true, false) => ConflictType::DeleteUpdate,
            (false, true) => ConflictType::UpdateDelete,
            _ => ConflictType::ConcurrentUpdate,
        }
    }
}

/// Differing fields plus the pseudo-fields for tombstone and type tag.
fn conflicting_fields(local: &EntitySnapshot, remote: &EntitySnapshot) -> BTreeSet<String> {
    let mut fields = local.differing_fields(remote);
    if local.is_deleted() != remote.is_deleted() {
        fields.insert(TOMBSTONE_FIELD.to_string());
    }
    if local.entity_type != remote.entity_type {
        fields.insert(ENTITY_TYPE_FIELD.to_string());
    }
    fields
}
