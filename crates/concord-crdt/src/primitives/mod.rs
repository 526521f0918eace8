//! Field-level resolvers.
//!
//! Each resolver receives the local and remote value of one field (absent
//! fields are `None`) plus the [`MergeContext`] and returns the merged
//! value. All of them are order-independent: swapping `local` and `remote`
//! (together with the context) yields the same result.

pub mod logical_or;
pub mod lww;
pub mod max;
pub mod sticky;
pub mod union;

pub use lww::{last_write_wins, lww_order, snapshot_lww_order};

use concord_core::models::FieldValue;
use serde::Serialize;

use crate::context::MergeContext;

/// Built-in merge rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldResolver {
    LastWriteWins,
    Max,
    Union,
    LogicalOr,
    /// Terminal values in ascending precedence. A terminal value is never
    /// replaced by a non-terminal one.
    Sticky { terminal: &'static [&'static str] },
}

impl FieldResolver {
    pub fn resolve(
        &self,
        local: Option<&FieldValue>,
        remote: Option<&FieldValue>,
        ctx: &MergeContext<'_>,
    ) -> Option<FieldValue> {
        if local == remote {
            return local.cloned();
        }
        match self {
            Self::LastWriteWins => last_write_wins(local, remote, ctx),
            Self::Max => max::max_wins(local, remote, ctx),
            Self::Union => union::union(local, remote, ctx),
            Self::LogicalOr => logical_or::logical_or(local, remote, ctx),
            Self::Sticky { terminal } => sticky::sticky(terminal, local, remote, ctx),
        }
    }
}
