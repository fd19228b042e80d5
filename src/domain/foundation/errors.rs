//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur while constructing semantic values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
        actual: String,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(
        field: impl Into<String>,
        min: impl fmt::Display,
        max: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min: min.to_string(),
            max: max.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Stable error codes, one per failure class a turn can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    InterpretationFailed,
    IntegrationFailed,
    RuleEngineDivergence,
    MissingBinding,
    DomainResourceFailed,
    GenerationFailed,
    Timeout,
    SessionClosed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InterpretationFailed => "INTERPRETATION_FAILED",
            ErrorCode::IntegrationFailed => "INTEGRATION_FAILED",
            ErrorCode::RuleEngineDivergence => "RULE_ENGINE_DIVERGENCE",
            ErrorCode::MissingBinding => "MISSING_BINDING",
            ErrorCode::DomainResourceFailed => "DOMAIN_RESOURCE_FAILED",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::SessionClosed => "SESSION_CLOSED",
        };
        write!(f, "{}", s)
    }
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ValidationFailed
    }
}
