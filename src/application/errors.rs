//! Turn-level error types.

use std::fmt;
use thiserror::Error;

use crate::domain::foundation::ErrorCode;
use crate::domain::rules::EngineError;
use crate::ports::{GenerationError, InterpretationFailure};

/// Boundary call that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Interpret,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Interpret => write!(f, "interpret"),
            Stage::Generate => write!(f, "generate"),
        }
    }
}

/// Errors that abort a turn. The information state is left as it was
/// before the turn started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TurnError {
    #[error("Interpretation failed: {0}")]
    Interpretation(#[from] InterpretationFailure),

    #[error("Rule engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("{stage} timed out after {millis}ms")]
    Timeout { stage: Stage, millis: u64 },

    #[error("Session is closed")]
    SessionClosed,
}

impl TurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TurnError::Interpretation(_) => ErrorCode::InterpretationFailed,
            TurnError::Engine(err) => err.code(),
            TurnError::Generation(_) => ErrorCode::GenerationFailed,
            TurnError::Timeout { .. } => ErrorCode::Timeout,
            TurnError::SessionClosed => ErrorCode::SessionClosed,
        }
    }
}

/// Boundary failures that may go away on retry.
pub(crate) trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for InterpretationFailure {
    fn is_transient(&self) -> bool {
        InterpretationFailure::is_transient(self)
    }
}

impl Transient for GenerationError {
    fn is_transient(&self) -> bool {
        GenerationError::is_transient(self)
    }
}
