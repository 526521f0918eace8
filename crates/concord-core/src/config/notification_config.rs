use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Severity;

/// Notification surfacing and expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Lowest severity that is surfaced to the user. Deletion conflicts and
    /// pending manual conflicts are surfaced regardless.
    pub notify_threshold: Severity,
    /// Days after which notifications expire.
    pub retention_days: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            notify_threshold: defaults::DEFAULT_NOTIFY_THRESHOLD,
            retention_days: defaults::DEFAULT_NOTIFICATION_RETENTION_DAYS,
        }
    }
}
