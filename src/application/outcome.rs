//! What a processed turn reports back.

use serde::Serialize;

use crate::domain::foundation::ErrorCode;
use crate::domain::semantics::DialogueMove;

/// Non-fatal findings about a turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A move survived a full update cycle without any rule integrating it.
    /// It stays pending.
    IntegrationFailure {
        dialogue_move: DialogueMove,
        attempts: u32,
    },
    /// The interpreter could not make sense of the utterance; the turn was
    /// abandoned and a generic reprompt given.
    InterpretationFailure { utterance: String, reason: String },
}

impl Diagnostic {
    pub fn code(&self) -> ErrorCode {
        match self {
            Diagnostic::IntegrationFailure { .. } => ErrorCode::IntegrationFailed,
            Diagnostic::InterpretationFailure { .. } => ErrorCode::InterpretationFailed,
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnOutcome {
    /// Realized system response, absent when the system had nothing to say.
    pub response: Option<String>,
    /// System moves selected this turn, in utterance order.
    pub moves: Vec<DialogueMove>,
    /// Every rule that fired, in order.
    pub fired: Vec<&'static str>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TurnOutcome {
    pub fn has_integration_failures(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::IntegrationFailure { .. }))
    }
}
