//! Fallback for entity types without a registered strategy: whole-record
//! last-write-wins.

use super::{EntityRule, MergeStrategy};

pub static GENERIC: MergeStrategy = MergeStrategy {
    name: "generic",
    fields: &[],
    rule: EntityRule::None,
};
