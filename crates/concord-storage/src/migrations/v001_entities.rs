//! v001: entities keyed by (entity_type, entity_id).

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS entities (
    entity_type TEXT NOT NULL,
    entity_id   TEXT NOT NULL,
    version     TEXT NOT NULL,
    snapshot    TEXT NOT NULL,
    parent_id   TEXT,
    is_deleted  INTEGER NOT NULL DEFAULT 0,
    modified_at TEXT NOT NULL,
    modified_by TEXT NOT NULL,
    PRIMARY KEY (entity_type, entity_id)
);

CREATE INDEX IF NOT EXISTS idx_entities_parent ON entities(entity_type, parent_id);
";
