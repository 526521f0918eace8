//! Property tests: compare-and-set admits exactly the current vector, and
//! SQL history windows agree with the in-memory filter.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use concord_core::clock::VersionVector;
use concord_core::models::{
    ConflictRecord, ConflictType, DetectedConflict, EntitySnapshot, EntityType, HistoryQuery,
    ResolutionStrategy, Severity,
};
use concord_core::traits::{IConflictHistory, IEntityStore};
use concord_storage::StorageEngine;

fn vector() -> impl Strategy<Value = VersionVector> {
    prop::collection::btree_map(prop::sample::select(vec!["d1", "d2", "d3"]), 1u64..4, 1..3)
        .prop_map(VersionVector::from_entries)
}

fn record(n: usize, offset_ms: i64) -> ConflictRecord {
    let detected_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::milliseconds(offset_ms);
    let snap = EntitySnapshot::new("P1", EntityType::Product, "d1", detected_at);
    let conflict = DetectedConflict {
        id: format!("c-{n}"),
        entity_type: EntityType::Product,
        entity_id: "P1".into(),
        conflict_type: ConflictType::ConcurrentUpdate,
        severity: Severity::Low,
        conflicting_fields: ["name".to_string()].into(),
        local: snap.clone(),
        remote: snap,
        detected_at,
        vector_error: None,
    };
    ConflictRecord::from_conflict(&conflict, ResolutionStrategy::AutoMerge)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cas_accepts_only_the_stored_vector(stored in vector(), guess in vector()) {
        let storage = StorageEngine::open_in_memory().unwrap();
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let first = EntitySnapshot::new("P1", EntityType::Product, "d1", at)
            .with_version(stored.clone());
        storage.compare_and_set(None, &first).unwrap();

        let mut next = first.clone();
        next.record_edit("d9", at);
        let result = storage.compare_and_set(Some(&guess), &next);

        prop_assert_eq!(result.is_ok(), guess == stored);
        let current = IEntityStore::get(&storage, &EntityType::Product, "P1").unwrap().unwrap();
        let expected = if guess == stored { next } else { first };
        prop_assert_eq!(current, expected);
    }

    #[test]
    fn history_window_matches_in_memory_filter(
        offsets in prop::collection::vec(-5_000i64..5_000, 1..12),
        from in -6_000i64..6_000,
        len in 0i64..8_000,
    ) {
        let storage = StorageEngine::open_in_memory().unwrap();
        let records: Vec<_> = offsets.iter().enumerate().map(|(i, o)| record(i, *o)).collect();
        for r in &records {
            storage.record(r).unwrap();
        }

        let base = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let query = HistoryQuery {
            from: Some(base + Duration::milliseconds(from)),
            to: Some(base + Duration::milliseconds(from + len)),
            ..HistoryQuery::default()
        };
        let mut got: Vec<_> = storage.query(&query).unwrap().into_iter().map(|r| r.conflict_id).collect();
        let mut want: Vec<_> = records
            .iter()
            .filter(|r| query.matches(r))
            .map(|r| r.conflict_id.clone())
            .collect();
        got.sort();
        want.sort();
        prop_assert_eq!(got, want);
    }
}
