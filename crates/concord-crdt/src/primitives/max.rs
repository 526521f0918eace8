//! Max-wins: the greater of two ordinal values.
//!
//! Used for monotonic quantities. An absent value loses to a present one.
//! Values of different kinds fall back to last-write-wins.

use std::cmp::Ordering;

use concord_core::models::FieldValue;

use super::lww::last_write_wins;
use crate::context::MergeContext;

fn ordinal_cmp(a: &FieldValue, b: &FieldValue) -> Option<Ordering> {
    use FieldValue::*;
    match (a, b) {
        (Integer(x), Integer(y)) => Some(x.cmp(y)),
        (Decimal(x), Decimal(y)) => Some(x.total_cmp(y)),
        (Integer(x), Decimal(y)) => Some((*x as f64).total_cmp(y)),
        (Decimal(x), Integer(y)) => Some(x.total_cmp(&(*y as f64))),
        (Text(x), Text(y)) => Some(x.cmp(y)),
        (Timestamp(x), Timestamp(y)) => Some(x.cmp(y)),
        (Bool(x), Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub fn max_wins(
    local: Option<&FieldValue>,
    remote: Option<&FieldValue>,
    ctx: &MergeContext<'_>,
) -> Option<FieldValue> {
    match (local, remote) {
        (Some(l), Some(r)) => match ordinal_cmp(l, r) {
            Some(Ordering::Greater) => Some(l.clone()),
            Some(Ordering::Less) => Some(r.clone()),
            // Numerically equal but differently typed (2 vs 2.0).
            Some(Ordering::Equal) | None => last_write_wins(local, remote, ctx),
        },
        (Some(v), None) | (None, Some(v)) => Some(v.clone()),
        (None, None) => None,
    }
}
