//! conflict_history rows. Append-only apart from the viewed/dismissed
//! flags and the one-shot resolution columns.

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{
    ConflictRecord, ConflictStatus, ConflictType, EntityType, HistoryQuery, RecordResolution,
    ResolutionStrategy, Severity,
};

use super::{fmt_ts, parse_opt_ts, parse_ts};
use crate::to_storage_err;

const COLUMNS: &str = "conflict_id, entity_type, entity_id, conflict_type, severity,
    conflicting_fields, local_snapshot, remote_snapshot, resolved_snapshot, proposed_snapshot,
    resolution_strategy, status, detected_at, resolved_at, resolved_by, violation, viewed, dismissed";

/// A history row as stored: enums as tags, snapshots as JSON.
struct HistoryRow {
    conflict_id: String,
    entity_type: String,
    entity_id: String,
    conflict_type: String,
    severity: String,
    conflicting_fields: String,
    local_snapshot: String,
    remote_snapshot: String,
    resolved_snapshot: Option<String>,
    proposed_snapshot: Option<String>,
    resolution_strategy: String,
    status: String,
    detected_at: String,
    resolved_at: Option<String>,
    resolved_by: Option<String>,
    violation: Option<String>,
    viewed: bool,
    dismissed: bool,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            conflict_id: row.get(0)?,
            entity_type: row.get(1)?,
            entity_id: row.get(2)?,
            conflict_type: row.get(3)?,
            severity: row.get(4)?,
            conflicting_fields: row.get(5)?,
            local_snapshot: row.get(6)?,
            remote_snapshot: row.get(7)?,
            resolved_snapshot: row.get(8)?,
            proposed_snapshot: row.get(9)?,
            resolution_strategy: row.get(10)?,
            status: row.get(11)?,
            detected_at: row.get(12)?,
            resolved_at: row.get(13)?,
            resolved_by: row.get(14)?,
            violation: row.get(15)?,
            viewed: row.get(16)?,
            dismissed: row.get(17)?,
        })
    }

    fn into_record(self) -> ConcordResult<ConflictRecord> {
        let conflict_type = ConflictType::parse(&self.conflict_type).ok_or_else(|| {
            to_storage_err(format!("unknown conflict type {:?}", self.conflict_type))
        })?;
        let severity = Severity::parse(&self.severity)
            .ok_or_else(|| to_storage_err(format!("unknown severity {:?}", self.severity)))?;
        let resolution_strategy = ResolutionStrategy::parse(&self.resolution_strategy)
            .ok_or_else(|| {
                to_storage_err(format!("unknown strategy {:?}", self.resolution_strategy))
            })?;
        let status = ConflictStatus::parse(&self.status)
            .ok_or_else(|| to_storage_err(format!("unknown status {:?}", self.status)))?;

        Ok(ConflictRecord {
            conflict_id: self.conflict_id,
            entity_type: EntityType::from(self.entity_type),
            entity_id: self.entity_id,
            conflict_type,
            severity,
            conflicting_fields: serde_json::from_str(&self.conflicting_fields)?,
            local_snapshot: serde_json::from_str(&self.local_snapshot)?,
            remote_snapshot: serde_json::from_str(&self.remote_snapshot)?,
            resolved_snapshot: self
                .resolved_snapshot
                .as_deref()
                .map(|json| serde_json::from_str(json))
                .transpose()?,
            proposed_snapshot: self
                .proposed_snapshot
                .as_deref()
                .map(|json| serde_json::from_str(json))
                .transpose()?,
            resolution_strategy,
            status,
            detected_at: parse_ts(&self.detected_at)?,
            resolved_at: parse_opt_ts(self.resolved_at)?,
            resolved_by: self.resolved_by,
            violation: self.violation,
            viewed: self.viewed,
            dismissed: self.dismissed,
        })
    }
}

fn opt_json<T: serde::Serialize>(value: Option<&T>) -> ConcordResult<Option<String>> {
    Ok(value.map(serde_json::to_string).transpose()?)
}

/// Append a record. An existing id fails with `DuplicateConflict`.
pub fn insert_record(conn: &Connection, record: &ConflictRecord) -> ConcordResult<()> {
    debug!(conflict_id = %record.conflict_id, status = %record.status, "inserting conflict record");
    let inserted = conn
        .execute(
            &format!(
                "INSERT OR IGNORE INTO conflict_history ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ),
            params![
                record.conflict_id,
                record.entity_type.as_str(),
                record.entity_id,
                record.conflict_type.as_str(),
                record.severity.as_str(),
                serde_json::to_string(&record.conflicting_fields)?,
                serde_json::to_string(&record.local_snapshot)?,
                serde_json::to_string(&record.remote_snapshot)?,
                opt_json(record.resolved_snapshot.as_ref())?,
                opt_json(record.proposed_snapshot.as_ref())?,
                record.resolution_strategy.as_str(),
                record.status.as_str(),
                fmt_ts(record.detected_at),
                record.resolved_at.map(fmt_ts),
                record.resolved_by,
                record.violation,
                record.viewed,
                record.dismissed,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if inserted == 0 {
        return Err(ConcordError::DuplicateConflict {
            id: record.conflict_id.clone(),
        });
    }
    Ok(())
}

pub fn get_record(conn: &Connection, conflict_id: &str) -> ConcordResult<Option<ConflictRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM conflict_history WHERE conflict_id = ?1"),
            params![conflict_id],
            HistoryRow::from_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(HistoryRow::into_record).transpose()
}

/// Records matching every set filter, oldest detection first.
pub fn query_records(conn: &Connection, query: &HistoryQuery) -> ConcordResult<Vec<ConflictRecord>> {
    debug!(
        entity_type = ?query.entity_type,
        status = ?query.status,
        limit = ?query.limit,
        "querying conflict history"
    );
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(t) = &query.entity_type {
        clauses.push("entity_type = ?");
        values.push(Box::new(t.as_str().to_string()));
    }
    if let Some(id) = &query.entity_id {
        clauses.push("entity_id = ?");
        values.push(Box::new(id.clone()));
    }
    if let Some(severity) = query.severity {
        clauses.push("severity = ?");
        values.push(Box::new(severity.as_str()));
    }
    if let Some(status) = query.status {
        clauses.push("status = ?");
        values.push(Box::new(status.as_str()));
    }
    if let Some(from) = query.from {
        clauses.push("detected_at >= ?");
        values.push(Box::new(fmt_ts(from)));
    }
    if let Some(to) = query.to {
        clauses.push("detected_at < ?");
        values.push(Box::new(fmt_ts(to)));
    }

    let mut sql = format!("SELECT {COLUMNS} FROM conflict_history");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY detected_at ASC, rowid ASC");
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let rows = stmt
        .query_map(refs.as_slice(), HistoryRow::from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(|e| to_storage_err(e.to_string()))?;
        records.push(row.into_record()?);
    }
    Ok(records)
}

fn set_flag(conn: &Connection, conflict_id: &str, column: &str) -> ConcordResult<()> {
    let changed = conn
        .execute(
            &format!("UPDATE conflict_history SET {column} = 1 WHERE conflict_id = ?1"),
            params![conflict_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(ConcordError::ConflictNotFound {
            id: conflict_id.to_string(),
        });
    }
    Ok(())
}

pub fn mark_viewed(conn: &Connection, conflict_id: &str) -> ConcordResult<()> {
    set_flag(conn, conflict_id, "viewed")
}

pub fn mark_dismissed(conn: &Connection, conflict_id: &str) -> ConcordResult<()> {
    set_flag(conn, conflict_id, "dismissed")
}

/// Write the one-shot resolution. A second attempt fails with
/// `AlreadyResolved`; the guard lives in the WHERE clause.
pub fn resolve_record(
    conn: &Connection,
    conflict_id: &str,
    resolution: &RecordResolution,
) -> ConcordResult<ConflictRecord> {
    debug!(conflict_id, strategy = %resolution.strategy, "resolving conflict record");
    let changed = conn
        .execute(
            "UPDATE conflict_history
             SET resolved_snapshot = ?2, resolution_strategy = ?3, status = ?4,
                 resolved_at = ?5, resolved_by = ?6
             WHERE conflict_id = ?1 AND resolved_snapshot IS NULL",
            params![
                conflict_id,
                serde_json::to_string(&resolution.snapshot)?,
                resolution.strategy.as_str(),
                resolution.status.as_str(),
                fmt_ts(resolution.resolved_at),
                resolution.resolved_by,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let record = get_record(conn, conflict_id)?.ok_or_else(|| ConcordError::ConflictNotFound {
        id: conflict_id.to_string(),
    })?;
    if changed == 0 {
        return Err(ConcordError::AlreadyResolved {
            id: conflict_id.to_string(),
        });
    }
    Ok(record)
}

/// Delete terminal records detected before `cutoff`.
pub fn purge_terminal_before(conn: &Connection, cutoff: DateTime<Utc>) -> ConcordResult<usize> {
    let removed = conn
        .execute(
            "DELETE FROM conflict_history WHERE status != ?1 AND detected_at < ?2",
            params![ConflictStatus::PendingManual.as_str(), fmt_ts(cutoff)],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    debug!(removed, "purged conflict history");
    Ok(removed)
}

pub fn count_records(conn: &Connection) -> ConcordResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM conflict_history", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}
