//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Rule iteration guard must be at least 1")]
    InvalidIterationGuard,

    #[error("Understanding threshold must be within [0, 1], got {0}")]
    ThresholdOutOfRange(f32),

    #[error("Escalation attempt count must be at least 1")]
    InvalidEscalationCount,

    #[error("Invalid interface timeout")]
    InvalidTimeout,

    #[error("Invalid log filter '{0}'")]
    InvalidLogFilter(String),
}
