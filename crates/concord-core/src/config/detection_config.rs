use serde::{Deserialize, Serialize};

use super::defaults;

/// Severity classification knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// More conflicting fields than this escalates to `high`.
    pub high_severity_field_threshold: usize,
    /// Fields whose conflict blocks automatic resolution (`critical`).
    pub blocking_fields: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            high_severity_field_threshold: defaults::DEFAULT_HIGH_SEVERITY_FIELD_THRESHOLD,
            blocking_fields: Vec::new(),
        }
    }
}
