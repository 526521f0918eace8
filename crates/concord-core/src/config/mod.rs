//! Engine configuration, loadable from TOML.
//!
//! # Examples
//!
//! ```
//! use concord_core::config::ConcordConfig;
//! use concord_core::Severity;
//!
//! let config = ConcordConfig::from_toml("[history]\nretention_days = 30\n").unwrap();
//! assert_eq!(config.history.retention_days, 30);
//! assert_eq!(config.notification.notify_threshold, Severity::High);
//! ```

pub mod defaults;
mod detection_config;
mod history_config;
mod notification_config;
mod observability_config;
mod resolution_config;
mod storage_config;

pub use detection_config::DetectionConfig;
pub use history_config::HistoryConfig;
pub use notification_config::NotificationConfig;
pub use observability_config::ObservabilityConfig;
pub use resolution_config::ResolutionConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::errors::ConcordResult;

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcordConfig {
    pub detection: DetectionConfig,
    pub resolution: ResolutionConfig,
    pub notification: NotificationConfig,
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl ConcordConfig {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml(raw: &str) -> ConcordResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> ConcordResult<String> {
        toml::to_string(self).map_err(|e| crate::errors::ConcordError::ConfigError(e.to_string()))
    }
}
