//! Chart-of-accounts entries.

use concord_core::constants::MAX_HIERARCHY_DEPTH;
use concord_core::errors::MergeError;
use concord_core::models::{EntitySnapshot, FieldValue};

use super::{EntityRule, FieldRule, MergeStrategy};
use crate::context::MergeContext;
use crate::primitives::FieldResolver::*;

pub const PARENT_FIELD: &str = "parent_id";

pub static ACCOUNT: MergeStrategy = MergeStrategy {
    name: "account",
    fields: &[
        ("name", FieldRule::normal(LastWriteWins)),
        ("code", FieldRule::high(LastWriteWins)),
        (PARENT_FIELD, FieldRule::high(LastWriteWins)),
        ("balance", FieldRule::normal(Max)),
        ("active", FieldRule::normal(LogicalOr)),
        ("tags", FieldRule::normal(Union)),
        ("description", FieldRule::cosmetic()),
        ("color", FieldRule::cosmetic()),
    ],
    rule: EntityRule::AccountHierarchy,
};

/// Walk the merged parent chain through stored parents. Reaching the
/// entity itself is a cycle.
pub fn validate_hierarchy(
    merged: &EntitySnapshot,
    ctx: &MergeContext<'_>,
) -> Result<(), MergeError> {
    if merged.is_deleted() {
        return Ok(());
    }
    let Some(mut current) = merged
        .field(PARENT_FIELD)
        .and_then(FieldValue::as_text)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
    else {
        return Ok(());
    };

    let mut path = vec![merged.id.clone()];
    for _ in 0..MAX_HIERARCHY_DEPTH {
        path.push(current.clone());
        if current == merged.id {
            return Err(MergeError::CyclicHierarchy {
                path: path.join(" -> "),
            });
        }
        match ctx.hierarchy.parent_of(&merged.entity_type, &current) {
            Some(parent) if !parent.is_empty() => current = parent,
            _ => return Ok(()),
        }
    }
    Err(MergeError::HierarchyTooDeep {
        entity_id: merged.id.clone(),
        max_depth: MAX_HIERARCHY_DEPTH,
    })
}
