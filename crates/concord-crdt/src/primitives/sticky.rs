//! Sticky terminal values.
//!
//! A value listed in `terminal` is never replaced by a non-terminal one,
//! regardless of timestamps. Between two terminal values the one listed
//! later wins. Two non-terminal values fall back to last-write-wins.

use concord_core::models::FieldValue;

use super::lww::last_write_wins;
use crate::context::MergeContext;

/// Position of `value` in the terminal list.
pub fn terminal_rank(terminal: &[&str], value: Option<&FieldValue>) -> Option<usize> {
    let text = value?.as_text()?;
    terminal.iter().position(|t| *t == text)
}

pub fn sticky(
    terminal: &[&str],
    local: Option<&FieldValue>,
    remote: Option<&FieldValue>,
    ctx: &MergeContext<'_>,
) -> Option<FieldValue> {
    match (terminal_rank(terminal, local), terminal_rank(terminal, remote)) {
        (Some(l), Some(r)) if r > l => remote.cloned(),
        (Some(_), _) => local.cloned(),
        (None, Some(_)) => remote.cloned(),
        (None, None) => last_write_wins(local, remote, ctx),
    }
}
