//! Property tests: comparator symmetry, merge dominance, merge laws.

use proptest::prelude::*;

use concord_core::{Causality, VersionVector};

fn arb_vector() -> impl Strategy<Value = VersionVector> {
    prop::collection::btree_map("dev[0-4]", 0u64..6, 0..5)
        .prop_map(|m| VersionVector::from_entries(m.into_iter()))
}

proptest! {
    #[test]
    fn prop_compare_is_symmetric(a in arb_vector(), b in arb_vector()) {
        prop_assert_eq!(a.compare(&b), b.compare(&a).inverse());
    }

    #[test]
    fn prop_merged_vector_dominates_inputs(a in arb_vector(), b in arb_vector()) {
        let m = a.merged(&b);
        for input in [&a, &b] {
            let rel = m.compare(input);
            prop_assert!(rel == Causality::Follows || rel == Causality::Equal);
        }
    }

    #[test]
    fn prop_merge_is_commutative_and_idempotent(a in arb_vector(), b in arb_vector()) {
        prop_assert_eq!(a.merged(&b).compare(&b.merged(&a)), Causality::Equal);
        prop_assert_eq!(a.merged(&a).compare(&a), Causality::Equal);
    }

    #[test]
    fn prop_increment_moves_forward(a in arb_vector(), dev in "dev[0-4]") {
        let mut b = a.clone();
        b.increment(&dev);
        prop_assert_eq!(a.compare(&b), Causality::Precedes);
    }
}
