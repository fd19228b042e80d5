//! Interpreter Port - Natural-language understanding.
//!
//! Maps a raw utterance to the dialogue moves it performs. The interpreter
//! may look at a read-only view of the information state (for example to
//! decide which question a short answer is about) but never changes it.
//!
//! An interpreter that cannot make sense of an utterance must return
//! [`InterpretationFailure`] rather than guess a move.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::information_state::InformationState;
use crate::domain::semantics::{DialogueMove, Participant};

/// Port for utterance interpretation.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Returns the moves `utterance` performs, in utterance order.
    ///
    /// An empty vector means the utterance carried no moves (e.g. silence).
    async fn interpret(
        &self,
        utterance: &str,
        speaker: Participant,
        state: &InformationState,
    ) -> Result<Vec<DialogueMove>, InterpretationFailure>;
}

/// The interpreter produced nothing usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpretationFailure {
    #[error("Utterance not understood: '{utterance}'")]
    NotUnderstood { utterance: String },

    #[error("Interpreter unavailable: {0}")]
    Unavailable(String),
}

impl InterpretationFailure {
    pub fn not_understood(utterance: impl Into<String>) -> Self {
        InterpretationFailure::NotUnderstood {
            utterance: utterance.into(),
        }
    }

    /// Whether retrying the same utterance could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, InterpretationFailure::Unavailable(_))
    }
}
