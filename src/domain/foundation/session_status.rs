//! SessionStatus enum for tracking the lifecycle of a dialogue session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a dialogue session.
///
/// - `Ready`: created, no turn processed yet
/// - `Active`: at least one turn processed
/// - `Closed`: a quit move was exchanged; no further turns are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Ready,
    Active,
    Closed,
}

impl SessionStatus {
    /// Returns true if the session still accepts turns.
    pub fn accepts_turns(&self) -> bool {
        !matches!(self, SessionStatus::Closed)
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Ready, Active) | (Ready, Closed) | (Active, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Ready => vec![Active, Closed],
            Active => vec![Closed],
            Closed => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Ready => "Ready",
            SessionStatus::Active => "Active",
            SessionStatus::Closed => "Closed",
        };
        write!(f, "{}", s)
    }
}
