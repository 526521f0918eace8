//! conflict_notifications outbox rows, ordered by insertion sequence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::debug;

use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{ConflictNotification, EntityType, Severity};

use super::{fmt_ts, parse_opt_ts, parse_ts};
use crate::to_storage_err;

const COLUMNS: &str = "id, conflict_id, entity_type, entity_id, severity, title, message,
    created_at, actionable, delivered, viewed_at, dismissed_at";

struct NotificationRow {
    id: String,
    conflict_id: String,
    entity_type: String,
    entity_id: String,
    severity: String,
    title: String,
    message: String,
    created_at: String,
    actionable: bool,
    delivered: bool,
    viewed_at: Option<String>,
    dismissed_at: Option<String>,
}

impl NotificationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            conflict_id: row.get(1)?,
            entity_type: row.get(2)?,
            entity_id: row.get(3)?,
            severity: row.get(4)?,
            title: row.get(5)?,
            message: row.get(6)?,
            created_at: row.get(7)?,
            actionable: row.get(8)?,
            delivered: row.get(9)?,
            viewed_at: row.get(10)?,
            dismissed_at: row.get(11)?,
        })
    }

    fn into_notification(self) -> ConcordResult<ConflictNotification> {
        let severity = Severity::parse(&self.severity)
            .ok_or_else(|| to_storage_err(format!("unknown severity {:?}", self.severity)))?;
        Ok(ConflictNotification {
            id: self.id,
            conflict_id: self.conflict_id,
            entity_type: EntityType::from(self.entity_type),
            entity_id: self.entity_id,
            severity,
            title: self.title,
            message: self.message,
            created_at: parse_ts(&self.created_at)?,
            actionable: self.actionable,
            delivered: self.delivered,
            viewed_at: parse_opt_ts(self.viewed_at)?,
            dismissed_at: parse_opt_ts(self.dismissed_at)?,
        })
    }
}

fn select<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> ConcordResult<Vec<ConflictNotification>> {
    let sql = format!("SELECT {COLUMNS} FROM conflict_notifications {filter} ORDER BY seq ASC");
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, NotificationRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let row = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(row.into_notification()?);
    }
    Ok(out)
}

pub fn push(conn: &Connection, n: &ConflictNotification) -> ConcordResult<()> {
    debug!(notification_id = %n.id, conflict_id = %n.conflict_id, "pushing notification");
    conn.execute(
        &format!(
            "INSERT INTO conflict_notifications ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            n.id,
            n.conflict_id,
            n.entity_type.as_str(),
            n.entity_id,
            n.severity.as_str(),
            n.title,
            n.message,
            fmt_ts(n.created_at),
            n.actionable,
            n.delivered,
            n.viewed_at.map(fmt_ts),
            n.dismissed_at.map(fmt_ts),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Undelivered notifications in creation order, marked delivered in the
/// same transaction.
pub fn drain(conn: &Connection) -> ConcordResult<Vec<ConflictNotification>> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("drain begin: {e}")))?;

    let mut drained = select(&tx, "WHERE delivered = 0", [])?;
    tx.execute(
        "UPDATE conflict_notifications SET delivered = 1 WHERE delivered = 0",
        [],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    tx.commit()
        .map_err(|e| to_storage_err(format!("drain commit: {e}")))?;

    for n in &mut drained {
        n.delivered = true;
    }
    debug!(count = drained.len(), "drained notifications");
    Ok(drained)
}

pub fn get(conn: &Connection, id: &str) -> ConcordResult<Option<ConflictNotification>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM conflict_notifications WHERE id = ?1"),
            params![id],
            NotificationRow::from_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(NotificationRow::into_notification).transpose()
}

pub fn for_conflict(conn: &Connection, conflict_id: &str) -> ConcordResult<Vec<ConflictNotification>> {
    select(conn, "WHERE conflict_id = ?1", params![conflict_id])
}

pub fn active(conn: &Connection) -> ConcordResult<Vec<ConflictNotification>> {
    select(conn, "WHERE dismissed_at IS NULL", [])
}

/// Set a timestamp column once; later calls keep the first value.
fn stamp_once(conn: &Connection, id: &str, column: &str, at: DateTime<Utc>) -> ConcordResult<()> {
    let changed = conn
        .execute(
            &format!(
                "UPDATE conflict_notifications SET {column} = COALESCE({column}, ?2) WHERE id = ?1"
            ),
            params![id, fmt_ts(at)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(ConcordError::NotificationNotFound { id: id.to_string() });
    }
    Ok(())
}

pub fn mark_viewed(conn: &Connection, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
    stamp_once(conn, id, "viewed_at", at)
}

pub fn dismiss(conn: &Connection, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
    stamp_once(conn, id, "dismissed_at", at)
}

pub fn dismiss_for_conflict(
    conn: &Connection,
    conflict_id: &str,
    at: DateTime<Utc>,
) -> ConcordResult<usize> {
    conn.execute(
        "UPDATE conflict_notifications SET dismissed_at = ?2
         WHERE conflict_id = ?1 AND dismissed_at IS NULL",
        params![conflict_id, fmt_ts(at)],
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn expire_before(conn: &Connection, cutoff: DateTime<Utc>) -> ConcordResult<usize> {
    let removed = conn
        .execute(
            "DELETE FROM conflict_notifications
             WHERE created_at < ?1 AND NOT (actionable = 1 AND dismissed_at IS NULL)",
            params![fmt_ts(cutoff)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    debug!(removed, "expired notifications");
    Ok(removed)
}
