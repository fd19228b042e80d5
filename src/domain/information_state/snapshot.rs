//! Structural snapshot of an information state.

use serde::{Deserialize, Serialize};

use super::{AgendaAction, InformationState, OpenStack, OrderedSet, PendingMove};
use crate::domain::semantics::{DialogueMove, Plan, Proposition, Question};

/// Order-preserving copy of the persistent parts of an [`InformationState`].
///
/// Stacks are stored top first. The latest utterance and the selected-but-
/// not-yet-generated moves are turn-local and not captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub qud: Vec<Question>,
    pub issues: Vec<Question>,
    pub plans: Vec<Plan>,
    pub agenda: Vec<AgendaAction>,
    pub commitments: Vec<Proposition>,
    pub beliefs: Vec<Proposition>,
    pub pending: Vec<PendingMove>,
    pub clarifications: Vec<Question>,
    pub previous_moves: Vec<DialogueMove>,
}

impl InformationState {
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            qud: self.shared.qud.iter().cloned().collect(),
            issues: self.private.issues.iter().cloned().collect(),
            plans: self.private.plans.clone(),
            agenda: self.private.agenda.iter().cloned().collect(),
            commitments: self.shared.commitments.iter().cloned().collect(),
            beliefs: self.private.beliefs.iter().cloned().collect(),
            pending: self.private.pending.iter().cloned().collect(),
            clarifications: self.private.clarifications.iter().cloned().collect(),
            previous_moves: self.shared.previous_moves.clone(),
        }
    }

    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut state = InformationState::new();
        state.shared.qud = OpenStack::from_top_first(snapshot.qud);
        state.private.issues = OpenStack::from_top_first(snapshot.issues);
        state.private.plans = snapshot.plans;
        state.private.agenda = snapshot.agenda.into_iter().collect();
        state.shared.commitments = snapshot.commitments.into_iter().collect::<OrderedSet<_>>();
        state.private.beliefs = snapshot.beliefs.into_iter().collect::<OrderedSet<_>>();
        state.private.pending = snapshot.pending.into_iter().collect();
        state.private.clarifications = snapshot.clarifications.into_iter().collect::<OrderedSet<_>>();
        state.shared.previous_moves = snapshot.previous_moves;
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::semantics::{PlanGoal, Subplan};

    fn populated_state() -> InformationState {
        let mut state = InformationState::new();
        state.shared.qud.push(Question::wh("price"));
        state.shared.qud.push(Question::wh("mode"));
        state.private.issues.push(Question::wh("price"));
        state.private.plans.insert(
            0,
            Plan::new(
                PlanGoal::Resolve(Question::wh("price")),
                vec![Subplan::Findout(Question::wh("mode"))],
            ),
        );
        state.schedule(AgendaAction::Respond(Question::wh("price")));
        state.commit(Proposition::new("dest_city", "paris"));
        state.commit(Proposition::new("dept_city", "london"));
        state.private.beliefs.insert(Proposition::new("price", "500"));
        state
    }

    #[test]
    fn snapshot_keeps_stack_order_top_first() {
        let snapshot = populated_state().snapshot();
        assert_eq!(snapshot.qud, vec![Question::wh("mode"), Question::wh("price")]);
    }

    #[test]
    fn round_trips_through_json_without_loss() {
        let state = populated_state();
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        let restored = InformationState::from_snapshot(serde_json::from_str(&json).unwrap());
        assert_eq!(restored, state);
    }
}
