//! v002: conflict_history.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS conflict_history (
    conflict_id         TEXT PRIMARY KEY,
    entity_type         TEXT NOT NULL,
    entity_id           TEXT NOT NULL,
    conflict_type       TEXT NOT NULL,
    severity            TEXT NOT NULL,
    conflicting_fields  TEXT NOT NULL DEFAULT '[]',
    local_snapshot      TEXT NOT NULL,
    remote_snapshot     TEXT NOT NULL,
    resolved_snapshot   TEXT,
    proposed_snapshot   TEXT,
    resolution_strategy TEXT NOT NULL,
    status              TEXT NOT NULL,
    detected_at         TEXT NOT NULL,
    resolved_at         TEXT,
    resolved_by         TEXT,
    violation           TEXT,
    viewed              INTEGER NOT NULL DEFAULT 0,
    dismissed           INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_history_entity ON conflict_history(entity_type, entity_id);
CREATE INDEX IF NOT EXISTS idx_history_detected ON conflict_history(detected_at);
CREATE INDEX IF NOT EXISTS idx_history_status ON conflict_history(status);
";
