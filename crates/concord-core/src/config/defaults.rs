// Single source of truth for all default values.

use crate::models::Severity;

// --- Detection ---
pub const DEFAULT_HIGH_SEVERITY_FIELD_THRESHOLD: usize = 3;

// --- Resolution ---
pub const DEFAULT_MAX_CAS_RETRIES: u32 = 3;

// --- Notifications ---
pub const DEFAULT_NOTIFY_THRESHOLD: Severity = Severity::High;
pub const DEFAULT_NOTIFICATION_RETENTION_DAYS: i64 = 30;

// --- History ---
pub const DEFAULT_HISTORY_RETENTION_DAYS: i64 = 90;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "concord.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
