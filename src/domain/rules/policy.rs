//! Tunable behaviour the update rules consult.

use serde::{Deserialize, Serialize};

/// What to do with a move that no rule manages to integrate, including an
/// answer that resolves neither an open clarification nor the question it
/// suspends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Keep the move pending and keep re-raising any open clarification.
    Reprompt,
    /// Reject the move after it has failed this many update cycles,
    /// abandoning any open clarification.
    EscalateAfter { attempts: u32 },
}

impl UnresolvedPolicy {
    /// True if a move that failed `attempts` cycles must be rejected.
    pub fn exhausted(&self, attempts: u32) -> bool {
        match self {
            UnresolvedPolicy::Reprompt => false,
            UnresolvedPolicy::EscalateAfter { attempts: limit } => attempts >= *limit,
        }
    }
}

impl Default for UnresolvedPolicy {
    fn default() -> Self {
        UnresolvedPolicy::EscalateAfter { attempts: 3 }
    }
}

/// Policy knobs shared by all rules of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdatePolicy {
    /// User answers scored below this are checked before being committed.
    pub understanding_threshold: f32,
    pub unresolved: UnresolvedPolicy,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            understanding_threshold: 0.5,
            unresolved: UnresolvedPolicy::default(),
        }
    }
}
