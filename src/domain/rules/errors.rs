//! Error types for rule evaluation.

use thiserror::Error;

use super::Phase;
use crate::domain::foundation::ErrorCode;
use crate::ports::DomainResourceError;

/// Errors raised while applying update rules. All of them abort the turn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Rule engine diverged in phase {phase} after {iterations} firings (last rule: {last_rule})")]
    Divergence {
        phase: Phase,
        iterations: usize,
        last_rule: &'static str,
    },

    #[error("Domain resource failed: {0}")]
    Domain(#[from] DomainResourceError),

    #[error("Rule '{rule}' fired without binding '{binding}'")]
    MissingBinding {
        rule: &'static str,
        binding: &'static str,
    },
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Divergence { .. } => ErrorCode::RuleEngineDivergence,
            EngineError::Domain(_) => ErrorCode::DomainResourceFailed,
            EngineError::MissingBinding { .. } => ErrorCode::MissingBinding,
        }
    }
}
