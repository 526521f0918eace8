//! Ledger transactions.
//!
//! `status` only moves forward into a terminal value. Once one side has
//! posted, reconciled or voided the transaction, its ledger fields are
//! taken from that side.

use concord_core::errors::MergeError;
use concord_core::models::EntitySnapshot;

use super::{EntityRule, FieldRule, MergeStrategy};
use crate::context::MergeContext;
use crate::primitives::sticky::terminal_rank;
use crate::primitives::FieldResolver::{self, *};

pub const STATUS_FIELD: &str = "status";
pub const TERMINAL_STATUSES: &[&str] = &["posted", "reconciled", "void"];
pub const LEDGER_FIELDS: &[&str] = &["amount", "date", "account_id"];

pub static TRANSACTION: MergeStrategy = MergeStrategy {
    name: "transaction",
    fields: &[
        (
            STATUS_FIELD,
            FieldRule::high(FieldResolver::Sticky {
                terminal: TERMINAL_STATUSES,
            }),
        ),
        ("amount", FieldRule::normal(LastWriteWins)),
        ("date", FieldRule::normal(LastWriteWins)),
        ("account_id", FieldRule::high(LastWriteWins)),
        ("payee", FieldRule::normal(LastWriteWins)),
        ("attachments", FieldRule::normal(Union)),
        ("memo", FieldRule::cosmetic()),
    ],
    rule: EntityRule::TransactionLifecycle,
};

fn status_rank(snapshot: &EntitySnapshot) -> Option<usize> {
    terminal_rank(TERMINAL_STATUSES, snapshot.field(STATUS_FIELD))
}

pub(crate) fn pinned_side<'a>(
    ctx: &MergeContext<'a>,
) -> Option<(&'a EntitySnapshot, &'static [&'static str])> {
    match (status_rank(ctx.local), status_rank(ctx.remote)) {
        (Some(_), None) => Some((ctx.local, LEDGER_FIELDS)),
        (None, Some(_)) => Some((ctx.remote, LEDGER_FIELDS)),
        _ => None,
    }
}

pub(crate) fn validate_lifecycle(
    merged: &EntitySnapshot,
    ctx: &MergeContext<'_>,
) -> Result<(), MergeError> {
    let merged_rank = status_rank(merged);
    for side in [ctx.local, ctx.remote] {
        if let Some(rank) = status_rank(side) {
            if merged_rank.map_or(true, |m| m < rank) {
                return Err(MergeError::TerminalStateRegression {
                    field: STATUS_FIELD.to_string(),
                    terminal: TERMINAL_STATUSES[rank].to_string(),
                });
            }
        }
    }

    if status_rank(ctx.local).is_some() && status_rank(ctx.remote).is_some() {
        if let Some(field) = LEDGER_FIELDS
            .iter()
            .find(|f| ctx.local.field(f) != ctx.remote.field(f))
        {
            return Err(MergeError::TerminalFieldDivergence {
                field: (*field).to_string(),
            });
        }
    }
    Ok(())
}
