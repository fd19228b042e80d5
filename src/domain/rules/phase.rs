//! Update phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The phase a rule belongs to.
///
/// Variant order is turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Hand the latest utterance's moves to integration.
    GroundingSetup,
    /// Fold pending moves into the information state.
    Integrate,
    /// Infer the issue or plan a move presupposes.
    Accommodate,
    /// Remove what has been resolved.
    Downdate,
    /// Load the plan for the issue in focus.
    LoadPlan,
    /// Carry out plan steps that need no interaction.
    ExecPlan,
    /// Decide what to do next.
    SelectAction,
    /// Decide which feedback to give.
    SelectIcm,
    /// Turn agenda actions into moves.
    SelectMove,
}

impl Phase {
    /// The phases repeated while moves are being integrated.
    pub const UPDATE: [Phase; 3] = [Phase::Integrate, Phase::Accommodate, Phase::Downdate];

    /// The phases repeated while the next system moves are selected.
    pub const SELECT: [Phase; 3] = [Phase::SelectAction, Phase::SelectIcm, Phase::SelectMove];

    pub fn label(&self) -> &'static str {
        match self {
            Phase::GroundingSetup => "grounding_setup",
            Phase::Integrate => "integrate",
            Phase::Accommodate => "accommodate",
            Phase::Downdate => "downdate",
            Phase::LoadPlan => "load_plan",
            Phase::ExecPlan => "exec_plan",
            Phase::SelectAction => "select_action",
            Phase::SelectIcm => "select_icm",
            Phase::SelectMove => "select_move",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_follows_turn_order() {
        assert!(Phase::GroundingSetup < Phase::Integrate);
        assert!(Phase::Downdate < Phase::LoadPlan);
        assert!(Phase::ExecPlan < Phase::SelectAction);
        assert!(Phase::SelectIcm < Phase::SelectMove);
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&Phase::SelectIcm).unwrap();
        assert_eq!(json, "\"select_icm\"");
        assert_eq!(Phase::LoadPlan.to_string(), "load_plan");
    }
}
