use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Compare-and-set attempts before a stale write is reported to the caller.
    pub max_cas_retries: u32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_cas_retries: defaults::DEFAULT_MAX_CAS_RETRIES,
        }
    }
}
