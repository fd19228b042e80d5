//! Configuration for calls to the interpreter and generator

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Time limit and retry budget for NLU/NLG calls
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceConfig {
    /// Per-attempt time limit in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after a transient failure or timeout
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl InterfaceConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate interface configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_retries(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retries() -> u32 {
    2
}
