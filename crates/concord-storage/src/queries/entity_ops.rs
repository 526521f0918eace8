//! Entity rows: keyed snapshot storage with compare-and-set.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use concord_core::clock::VersionVector;
use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{EntitySnapshot, EntityType, FieldValue};
use concord_crdt::strategy::account::PARENT_FIELD;

use super::fmt_ts;
use crate::to_storage_err;

/// Load the stored snapshot of an entity.
pub fn get_entity(
    conn: &Connection,
    entity_type: &EntityType,
    entity_id: &str,
) -> ConcordResult<Option<EntitySnapshot>> {
    debug!(entity_type = %entity_type, entity_id, "getting entity");
    let raw: Option<String> = conn
        .query_row(
            "SELECT snapshot FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type.as_str(), entity_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|json| serde_json::from_str(&json).map_err(ConcordError::from))
        .transpose()
}

/// Load only the stored version vector.
pub fn get_version(
    conn: &Connection,
    entity_type: &EntityType,
    entity_id: &str,
) -> ConcordResult<Option<VersionVector>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT version FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type.as_str(), entity_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(|json| VersionVector::from_json(&json)).transpose()
}

/// Replace the entity if its stored vector equals `expected`. `None`
/// means the entity must not exist yet. Runs in one transaction.
pub fn compare_and_set(
    conn: &Connection,
    expected: Option<&VersionVector>,
    snapshot: &EntitySnapshot,
) -> ConcordResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("compare_and_set begin: {e}")))?;

    match compare_and_set_inner(&tx, expected, snapshot) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("compare_and_set commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn compare_and_set_inner(
    conn: &Connection,
    expected: Option<&VersionVector>,
    snapshot: &EntitySnapshot,
) -> ConcordResult<()> {
    let stored = get_version(conn, &snapshot.entity_type, &snapshot.id)?;
    if stored.as_ref() != expected {
        debug!(entity_id = %snapshot.id, "compare_and_set rejected");
        return Err(ConcordError::StaleWriteRejected {
            entity_id: snapshot.id.clone(),
        });
    }
    upsert(conn, snapshot)
}

fn upsert(conn: &Connection, snapshot: &EntitySnapshot) -> ConcordResult<()> {
    let version_json = serde_json::to_string(&snapshot.version)?;
    let snapshot_json = serde_json::to_string(snapshot)?;
    let parent = snapshot
        .field(PARENT_FIELD)
        .and_then(FieldValue::as_text)
        .filter(|p| !p.is_empty());

    conn.execute(
        "INSERT INTO entities (entity_type, entity_id, version, snapshot, parent_id, is_deleted, modified_at, modified_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(entity_type, entity_id) DO UPDATE SET
            version = excluded.version,
            snapshot = excluded.snapshot,
            parent_id = excluded.parent_id,
            is_deleted = excluded.is_deleted,
            modified_at = excluded.modified_at,
            modified_by = excluded.modified_by",
        params![
            snapshot.entity_type.as_str(),
            snapshot.id,
            version_json,
            snapshot_json,
            parent,
            snapshot.is_deleted() as i32,
            fmt_ts(snapshot.modified_at),
            snapshot.modified_by,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Stored parent pointer of an entity, if any.
pub fn parent_of(
    conn: &Connection,
    entity_type: &EntityType,
    entity_id: &str,
) -> ConcordResult<Option<String>> {
    let parent: Option<Option<String>> = conn
        .query_row(
            "SELECT parent_id FROM entities WHERE entity_type = ?1 AND entity_id = ?2",
            params![entity_type.as_str(), entity_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(parent.flatten())
}

/// Number of stored entities, tombstones included.
pub fn count_entities(conn: &Connection) -> ConcordResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM entities", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}
