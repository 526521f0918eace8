//! Set union. Additions from either side are never dropped.
//!
//! Absent and `Null` read as the empty set. Non-set values fall back to
//! last-write-wins.

use std::collections::BTreeSet;

use concord_core::models::FieldValue;

use super::lww::last_write_wins;
use crate::context::MergeContext;

fn as_set(value: Option<&FieldValue>) -> Option<BTreeSet<String>> {
    match value {
        None | Some(FieldValue::Null) => Some(BTreeSet::new()),
        Some(FieldValue::Set(items)) => Some(items.clone()),
        Some(_) => None,
    }
}

pub fn union(
    local: Option<&FieldValue>,
    remote: Option<&FieldValue>,
    ctx: &MergeContext<'_>,
) -> Option<FieldValue> {
    match (as_set(local), as_set(remote)) {
        (Some(mut l), Some(r)) => {
            l.extend(r);
            Some(FieldValue::Set(l))
        }
        _ => last_write_wins(local, remote, ctx),
    }
}
