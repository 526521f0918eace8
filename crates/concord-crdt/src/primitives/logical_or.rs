//! Logical OR for sticky-true flags: once true anywhere, stays true.
//!
//! Absent and `Null` read as `false`. Non-boolean values fall back to
//! last-write-wins.

use concord_core::models::FieldValue;

use super::lww::last_write_wins;
use crate::context::MergeContext;

fn as_flag(value: Option<&FieldValue>) -> Option<bool> {
    match value {
        None | Some(FieldValue::Null) => Some(false),
        Some(FieldValue::Bool(b)) => Some(*b),
        Some(_) => None,
    }
}

pub fn logical_or(
    local: Option<&FieldValue>,
    remote: Option<&FieldValue>,
    ctx: &MergeContext<'_>,
) -> Option<FieldValue> {
    match (as_flag(local), as_flag(remote)) {
        (Some(l), Some(r)) => Some(FieldValue::Bool(l || r)),
        _ => last_write_wins(local, remote, ctx),
    }
}
