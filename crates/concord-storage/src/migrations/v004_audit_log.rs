//! v004: conflict_audit_log. Never touched by history retention.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS conflict_audit_log (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    conflict_id TEXT NOT NULL,
    entity_type TEXT NOT NULL,
    entity_id   TEXT NOT NULL,
    status      TEXT NOT NULL,
    strategy    TEXT NOT NULL,
    severity    TEXT NOT NULL,
    fields      TEXT NOT NULL DEFAULT '[]',
    actor       TEXT NOT NULL DEFAULT 'system',
    dismissed   INTEGER NOT NULL DEFAULT 0,
    timestamp   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_conflict ON conflict_audit_log(conflict_id);
CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON conflict_audit_log(timestamp);
";
