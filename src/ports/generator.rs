//! Generator Port - Natural-language generation.
//!
//! Realizes a single system move as text. Generation has no access to the
//! information state: everything it needs is in the move.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::semantics::DialogueMove;

/// Port for move realization.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, dialogue_move: &DialogueMove) -> Result<String, GenerationError>;
}

/// Errors raised while realizing a move.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("No realization for move {0}")]
    NoRealization(String),

    #[error("Generator unavailable: {0}")]
    Unavailable(String),
}

impl GenerationError {
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Unavailable(_))
    }
}
