//! Resolution strategies and the severity policy that picks one.

use chrono::{DateTime, Utc};

use concord_core::errors::MergeError;
use concord_core::models::{DetectedConflict, EntitySnapshot, ResolutionStrategy, Severity};
use concord_crdt::{MergeContext, MergeEngine};

/// Result of applying one strategy to a conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionOutcome {
    /// `None` when the conflict needs the user.
    pub resolved_snapshot: Option<EntitySnapshot>,
    pub strategy: ResolutionStrategy,
    pub requires_manual: bool,
    /// Set when an entity rule rejected the merged snapshot.
    pub violation: Option<MergeError>,
}

impl ResolutionOutcome {
    fn resolved(snapshot: EntitySnapshot, strategy: ResolutionStrategy) -> Self {
        Self {
            resolved_snapshot: Some(snapshot),
            strategy,
            requires_manual: false,
            violation: None,
        }
    }

    fn manual(violation: Option<MergeError>) -> Self {
        Self {
            resolved_snapshot: None,
            strategy: ResolutionStrategy::Manual,
            requires_manual: true,
            violation,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoResolver {
    merge: MergeEngine,
}

impl AutoResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategy chosen for a severity: automatic merge up to `high`,
    /// manual for `critical`.
    pub fn policy_for(severity: Severity) -> ResolutionStrategy {
        match severity {
            Severity::Low | Severity::Medium | Severity::High => ResolutionStrategy::AutoMerge,
            Severity::Critical => ResolutionStrategy::Manual,
        }
    }

    /// Apply `strategy` to the conflict in `ctx`.
    ///
    /// `Custom` needs a snapshot from the user and resolves to manual here;
    /// see [`AutoResolver::apply_override`].
    pub fn resolve(
        &self,
        conflict: &DetectedConflict,
        strategy: ResolutionStrategy,
        ctx: &MergeContext<'_>,
    ) -> ResolutionOutcome {
        let merged_vector = conflict.local.version.merged(&conflict.remote.version);
        match strategy {
            ResolutionStrategy::AutoLww => ResolutionOutcome::resolved(
                MergeEngine::lww_snapshot(&conflict.local, &conflict.remote),
                strategy,
            ),
            ResolutionStrategy::AutoMerge => match self.merge.merge(ctx) {
                Ok(merged) => ResolutionOutcome::resolved(merged, strategy),
                Err(e) => ResolutionOutcome::manual(Some(e)),
            },
            ResolutionStrategy::LocalWins => ResolutionOutcome::resolved(
                conflict.local.clone().with_version(merged_vector),
                strategy,
            ),
            ResolutionStrategy::RemoteWins => ResolutionOutcome::resolved(
                conflict.remote.clone().with_version(merged_vector),
                strategy,
            ),
            ResolutionStrategy::Manual | ResolutionStrategy::Custom => {
                ResolutionOutcome::manual(None)
            }
        }
    }

    /// Best-effort snapshot kept on a pending record for dismissal. `None`
    /// when the field merge was rejected; dismissal then falls back to
    /// whole-entity LWW.
    pub fn propose(&self, ctx: &MergeContext<'_>) -> Option<EntitySnapshot> {
        self.merge.merge(ctx).ok()
    }

    /// Finalize a user-chosen snapshot. The vector covers both inputs and
    /// the chosen snapshot, then records one edit by the resolving device
    /// so the resolution dominates everything it replaced. Zero clocks and
    /// blank device ids from a malformed input are dropped.
    pub fn apply_override(
        conflict_local: &EntitySnapshot,
        conflict_remote: &EntitySnapshot,
        mut chosen: EntitySnapshot,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> EntitySnapshot {
        let mut version = conflict_local.version.merged(&conflict_remote.version);
        version.merge(&chosen.version);
        version.prune();
        chosen.version = version;
        chosen.id = conflict_remote.id.clone();
        let at = now
            .max(conflict_local.modified_at)
            .max(conflict_remote.modified_at);
        chosen.record_edit(resolved_by, at);
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use concord_core::clock::{Causality, VersionVector};
    use concord_core::models::{ConflictType, EntityType, FieldValue};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn conflict() -> DetectedConflict {
        let local = EntitySnapshot::new("t-1", EntityType::Transaction, "dev1", at(10))
            .with_field("status", FieldValue::text("posted"));
        let remote = EntitySnapshot::new("t-1", EntityType::Transaction, "dev2", at(20))
            .with_field("status", FieldValue::text("draft"));
        DetectedConflict {
            id: "c".into(),
            entity_type: EntityType::Transaction,
            entity_id: "t-1".into(),
            conflict_type: ConflictType::ConcurrentUpdate,
            severity: Severity::High,
            conflicting_fields: ["status".to_string()].into(),
            local,
            remote,
            detected_at: at(30),
            vector_error: None,
        }
    }

    #[test]
    fn policy_by_severity() {
        assert_eq!(
            AutoResolver::policy_for(Severity::High),
            ResolutionStrategy::AutoMerge
        );
        assert_eq!(
            AutoResolver::policy_for(Severity::Critical),
            ResolutionStrategy::Manual
        );
    }

    #[test]
    fn auto_lww_and_auto_merge_differ_on_sticky_fields() {
        let c = conflict();
        let ctx = MergeContext::new(&c.local, &c.remote);
        let resolver = AutoResolver::new();

        let lww = resolver.resolve(&c, ResolutionStrategy::AutoLww, &ctx);
        let merged = resolver.resolve(&c, ResolutionStrategy::AutoMerge, &ctx);
        assert_eq!(
            lww.resolved_snapshot.unwrap().field("status"),
            Some(&FieldValue::text("draft"))
        );
        assert_eq!(
            merged.resolved_snapshot.unwrap().field("status"),
            Some(&FieldValue::text("posted"))
        );
    }

    #[test]
    fn manual_produces_nothing() {
        let c = conflict();
        let ctx = MergeContext::new(&c.local, &c.remote);
        let out = AutoResolver::new().resolve(&c, ResolutionStrategy::Manual, &ctx);
        assert!(out.requires_manual);
        assert!(out.resolved_snapshot.is_none());
    }

    #[test]
    fn override_dominates_both_inputs() {
        let c = conflict();
        let chosen = AutoResolver::apply_override(&c.local, &c.remote, c.local.clone(), "dev3", at(40));
        for side in [&c.local, &c.remote] {
            assert_eq!(side.version.compare(&chosen.version), Causality::Precedes);
        }
        assert_eq!(
            chosen.version,
            VersionVector::from_entries([("dev1", 1), ("dev2", 1), ("dev3", 1)])
        );
        assert_eq!(chosen.modified_by, "dev3");
    }

    #[test]
    fn override_of_malformed_vectors_is_valid() {
        let mut c = conflict();
        c.local.version = VersionVector::from_entries([("dev1", 0)]);
        c.remote.version = VersionVector::from_entries([("dev2", 1), (" ", 3)]);
        let chosen = AutoResolver::apply_override(&c.local, &c.remote, c.remote.clone(), "dev1", at(40));
        assert_eq!(
            chosen.version,
            VersionVector::from_entries([("dev1", 1), ("dev2", 1)])
        );
        assert!(chosen.version.validate().is_ok());
    }
}
