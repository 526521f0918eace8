//! v003: conflict_notifications outbox.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS conflict_notifications (
    seq          INTEGER PRIMARY KEY AUTOINCREMENT,
    id           TEXT NOT NULL UNIQUE,
    conflict_id  TEXT NOT NULL,
    entity_type  TEXT NOT NULL,
    entity_id    TEXT NOT NULL,
    severity     TEXT NOT NULL,
    title        TEXT NOT NULL,
    message      TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    actionable   INTEGER NOT NULL DEFAULT 0,
    delivered    INTEGER NOT NULL DEFAULT 0,
    viewed_at    TEXT,
    dismissed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_notifications_conflict ON conflict_notifications(conflict_id);
CREATE INDEX IF NOT EXISTS idx_notifications_delivered ON conflict_notifications(delivered);
CREATE INDEX IF NOT EXISTS idx_notifications_created ON conflict_notifications(created_at);
";
