use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Days a conflict record is kept. The audit log is not affected.
    pub retention_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            retention_days: defaults::DEFAULT_HISTORY_RETENTION_DAYS,
        }
    }
}
