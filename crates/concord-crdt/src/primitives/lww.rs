//! Last-write-wins.
//!
//! The snapshot with the later `modified_at` wins. Ties go to the
//! lexicographically greater `modified_by` device, then the greater entity
//! id, then the greater value, so every replica picks the same side.

use std::cmp::Ordering;

use concord_core::models::{EntitySnapshot, FieldValue};

use crate::context::MergeContext;

/// `Greater` when `local` is the later write.
pub fn lww_order(local: &EntitySnapshot, remote: &EntitySnapshot) -> Ordering {
    local
        .modified_at
        .cmp(&remote.modified_at)
        .then_with(|| local.modified_by.cmp(&remote.modified_by))
        .then_with(|| local.id.cmp(&remote.id))
}

/// Whole-snapshot order with content as the final tie-break. Deletion
/// outranks a live state at an exact tie.
pub fn snapshot_lww_order(local: &EntitySnapshot, remote: &EntitySnapshot) -> Ordering {
    lww_order(local, remote)
        .then_with(|| local.is_deleted().cmp(&remote.is_deleted()))
        .then_with(|| {
            let keys = local.fields.keys().chain(remote.fields.keys());
            for key in keys {
                let ord = option_cmp(local.field(key), remote.field(key));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
}

fn option_cmp(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.canonical_cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

pub fn last_write_wins(
    local: Option<&FieldValue>,
    remote: Option<&FieldValue>,
    ctx: &MergeContext<'_>,
) -> Option<FieldValue> {
    match lww_order(ctx.local, ctx.remote) {
        Ordering::Greater => local.cloned(),
        Ordering::Less => remote.cloned(),
        Ordering::Equal => {
            if option_cmp(local, remote) == Ordering::Less {
                remote.cloned()
            } else {
                local.cloned()
            }
        }
    }
}
