//! Property tests: no silent deletion, repeatable detection, severity
//! policy.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use concord_conflict::{ConflictDetector, ConflictEngine, SyncOutcome};
use concord_core::clock::VersionVector;
use concord_core::config::ConcordConfig;
use concord_core::models::{EntitySnapshot, EntityType, FieldValue, Severity};

fn arb_type() -> impl Strategy<Value = EntityType> {
    prop_oneof![
        Just(EntityType::Account),
        Just(EntityType::Transaction),
        Just(EntityType::Contact),
        Just(EntityType::Product),
        Just(EntityType::from("invoice")),
    ]
}

fn arb_fields() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-d]", "[x-z]{1,3}"), 0..4)
}

fn build(
    entity_type: EntityType,
    device: &str,
    secs: i64,
    counter: u64,
    fields: Vec<(String, String)>,
    deleted: bool,
) -> EntitySnapshot {
    let at = |s: i64| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap();
    let mut snapshot = EntitySnapshot::new("e-1", entity_type, device, at(secs))
        .with_version(VersionVector::from_entries([(device, counter)]));
    for (k, v) in fields {
        snapshot = snapshot.with_field(&k, FieldValue::text(v));
    }
    if deleted {
        snapshot = snapshot.deleted(at(secs + 1));
    }
    snapshot
}

proptest! {
    #[test]
    fn prop_one_sided_deletion_never_auto_resolves(
        entity_type in arb_type(),
        local_fields in arb_fields(),
        remote_fields in arb_fields(),
        local_deleted in any::<bool>(),
        l_secs in 0i64..100,
        r_secs in 0i64..100,
    ) {
        let local = build(entity_type.clone(), "dev-a", l_secs, 1, local_fields, local_deleted);
        let remote = build(entity_type, "dev-b", r_secs, 1, remote_fields, !local_deleted);

        let engine = ConflictEngine::in_memory(ConcordConfig::default());
        let outcome = engine.process_remote(Some(&local), &remote, Utc::now()).unwrap();
        let SyncOutcome::PendingManual { record, notification } = outcome else {
            return Err(TestCaseError::fail("deletion was resolved automatically"));
        };
        prop_assert_eq!(record.severity, Severity::Critical);
        prop_assert!(notification.map_or(false, |n| n.actionable));
    }

    #[test]
    fn prop_detection_is_repeatable(
        entity_type in arb_type(),
        local_fields in arb_fields(),
        remote_fields in arb_fields(),
        l_counter in 1u64..4,
        r_counter in 1u64..4,
    ) {
        let local = build(entity_type.clone(), "dev-a", 10, l_counter, local_fields, false);
        let remote = build(entity_type, "dev-b", 20, r_counter, remote_fields, false);
        let detector = ConflictDetector::default();
        let now = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        prop_assert_eq!(
            detector.detect(&local, &remote, now),
            detector.detect(&local, &remote, now)
        );
        if let Some(c) = detector.detect_conflict(&local, &remote, now) {
            prop_assert!(!c.conflicting_fields.is_empty());
        }
    }

    #[test]
    fn prop_non_critical_conflicts_auto_resolve(
        local_fields in arb_fields(),
        remote_fields in arb_fields(),
    ) {
        let local = build(EntityType::Contact, "dev-a", 10, 1, local_fields, false);
        let remote = build(EntityType::Contact, "dev-b", 20, 1, remote_fields, false);
        let engine = ConflictEngine::in_memory(ConcordConfig::default());
        match engine.process_remote(Some(&local), &remote, Utc::now()).unwrap() {
            SyncOutcome::AutoResolved { record, .. } => {
                prop_assert!(record.severity < Severity::Critical);
                prop_assert!(record.resolved_snapshot.is_some());
            }
            SyncOutcome::Converged { .. } => {}
            other => return Err(TestCaseError::fail(format!("unexpected {}", other.as_str()))),
        }
    }
}
