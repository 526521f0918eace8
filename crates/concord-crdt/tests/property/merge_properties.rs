//! Property tests: merge idempotence, union/OR commutativity, sticky
//! monotonicity.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use concord_core::models::{EntitySnapshot, EntityType, FieldValue};
use concord_crdt::strategy::transaction::TERMINAL_STATUSES;
use concord_crdt::{FieldResolver, MergeContext, MergeEngine};

fn contact(device: &str, secs: i64, tags: Vec<String>, active: bool, name: &str) -> EntitySnapshot {
    EntitySnapshot::new(
        "c-1",
        EntityType::Contact,
        device,
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
    )
    .with_field("tags", FieldValue::set(tags))
    .with_field("active", FieldValue::Bool(active))
    .with_field("name", FieldValue::text(name))
}

fn arb_contact(device: &'static str) -> impl Strategy<Value = EntitySnapshot> {
    (
        0i64..100,
        prop::collection::vec("[a-e]", 0..4),
        any::<bool>(),
        "[A-Z][a-z]{0,6}",
    )
        .prop_map(move |(secs, tags, active, name)| contact(device, secs, tags, active, &name))
}

fn arb_status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("draft".to_string()),
        Just("pending".to_string()),
        Just("posted".to_string()),
        Just("reconciled".to_string()),
        Just("void".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_merge_with_self_is_identity(a in arb_contact("dev-a")) {
        let merged = MergeEngine::new().merge(&MergeContext::new(&a, &a)).unwrap();
        prop_assert_eq!(&merged, &a);
        prop_assert!(a.differing_fields(&merged).is_empty());
    }

    #[test]
    fn prop_union_and_or_commute(a in arb_contact("dev-a"), b in arb_contact("dev-b")) {
        let engine = MergeEngine::new();
        let ab = engine.merge(&MergeContext::new(&a, &b)).unwrap();
        let ba = engine.merge(&MergeContext::new(&b, &a)).unwrap();
        prop_assert_eq!(ab.field("tags"), ba.field("tags"));
        prop_assert_eq!(ab.field("active"), ba.field("active"));
        // The whole snapshot converges, LWW fields included.
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn prop_sticky_keeps_terminal(
        l in arb_status(),
        r in arb_status(),
        l_secs in 0i64..100,
        r_secs in 0i64..100,
    ) {
        let at = |s: i64| Utc.timestamp_opt(1_700_000_000 + s, 0).unwrap();
        let local = EntitySnapshot::new("t-1", EntityType::Transaction, "dev-a", at(l_secs))
            .with_field("status", FieldValue::text(l.clone()));
        let remote = EntitySnapshot::new("t-1", EntityType::Transaction, "dev-b", at(r_secs))
            .with_field("status", FieldValue::text(r.clone()));
        let resolver = FieldResolver::Sticky { terminal: TERMINAL_STATUSES };

        let merged = resolver.resolve(
            local.field("status"),
            remote.field("status"),
            &MergeContext::new(&local, &remote),
        );
        let swapped = resolver.resolve(
            remote.field("status"),
            local.field("status"),
            &MergeContext::new(&remote, &local),
        );
        prop_assert_eq!(&merged, &swapped);

        let merged = merged.unwrap();
        let text = merged.as_text().unwrap();
        let terminal = |s: &str| TERMINAL_STATUSES.contains(&s);
        if terminal(&l) || terminal(&r) {
            prop_assert!(terminal(text));
        }
    }
}
