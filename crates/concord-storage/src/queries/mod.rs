//! Raw SQL operations, one module per table. No business logic.

pub mod audit_ops;
pub mod entity_ops;
pub mod history_ops;
pub mod notification_ops;

use chrono::{DateTime, SecondsFormat, Utc};

use concord_core::errors::ConcordResult;

use crate::to_storage_err;

/// Fixed-width UTC timestamps so text order equals time order.
pub(crate) fn fmt_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_ts(raw: &str) -> ConcordResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_opt_ts(raw: Option<String>) -> ConcordResult<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_ts).transpose()
}
