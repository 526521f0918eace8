//! conflict_audit_log: append-only lifecycle trail.

use rusqlite::{params, Connection};

use concord_core::errors::ConcordResult;
use concord_core::models::{ConflictAuditEvent, ConflictStatus};

use super::fmt_ts;
use crate::to_storage_err;

/// One stored audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub conflict_id: String,
    pub status: String,
    pub strategy: String,
    pub fields: Vec<String>,
    pub actor: String,
    pub dismissed: bool,
    pub timestamp: String,
}

pub fn append(conn: &Connection, event: &ConflictAuditEvent) -> ConcordResult<()> {
    conn.execute(
        "INSERT INTO conflict_audit_log
            (conflict_id, entity_type, entity_id, status, strategy, severity, fields, actor, dismissed, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            event.conflict_id,
            event.entity_type.as_str(),
            event.entity_id,
            event.status.as_str(),
            event.strategy.as_str(),
            event.severity.as_str(),
            serde_json::to_string(&event.fields)?,
            event.actor.as_deref().unwrap_or("system"),
            event.dismissed,
            fmt_ts(event.at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Audit trail of one conflict, oldest first.
pub fn for_conflict(conn: &Connection, conflict_id: &str) -> ConcordResult<Vec<AuditRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT conflict_id, status, strategy, fields, actor, dismissed, timestamp
             FROM conflict_audit_log WHERE conflict_id = ?1 ORDER BY id ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![conflict_id], |row| {
            Ok((
                AuditRow {
                    conflict_id: row.get(0)?,
                    status: row.get(1)?,
                    strategy: row.get(2)?,
                    fields: Vec::new(),
                    actor: row.get(4)?,
                    dismissed: row.get(5)?,
                    timestamp: row.get(6)?,
                },
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (mut audit, fields) = row.map_err(|e| to_storage_err(e.to_string()))?;
        audit.fields = serde_json::from_str(&fields)?;
        out.push(audit);
    }
    Ok(out)
}

/// Count of audit rows that reached a given status.
pub fn count_by_status(conn: &Connection, status: ConflictStatus) -> ConcordResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM conflict_audit_log WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}
