//! Grounding setup: hands the latest utterance to integration.

use crate::domain::information_state::{InformationState, PendingMove};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::Participant;

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![UpdateRule::new(
        "grounding_setup.latest_utterance",
        Phase::GroundingSetup,
        0,
        match_ungrounded_utterance,
        ground_utterance,
    )]
}

fn match_ungrounded_utterance(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state
        .last_utterance()
        .filter(|utterance| !utterance.grounded)
        .map(|_| Bindings::new()))
}

/// Queues the utterance's moves for integration. System moves also become
/// the moves a "pardon?" repeats.
fn ground_utterance(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    if let Some(utterance) = state.shared.last_utterance.as_mut() {
        utterance.grounded = true;
        for dialogue_move in &utterance.moves {
            state
                .private
                .pending
                .push_back(PendingMove::new(dialogue_move.clone()));
        }
        if utterance.speaker == Participant::System && !utterance.moves.is_empty() {
            state.shared.previous_moves = utterance.moves.clone();
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::update::fixtures::{run, travel_domain};
    use crate::domain::semantics::{DialogueMove, MoveKind, Question};

    #[test]
    fn moves_are_queued_in_utterance_order() {
        let moves = vec![
            DialogueMove::user(MoveKind::Greet),
            DialogueMove::user(MoveKind::Ask(Question::wh("price"))),
        ];
        let state = InformationState::new().with_utterance(Participant::User, moves.clone());

        let (state, fired) = run(&travel_domain(), Phase::GroundingSetup, state);

        assert_eq!(fired, vec!["grounding_setup.latest_utterance"]);
        let queued: Vec<_> = state.pending().iter().map(|p| p.dialogue_move.clone()).collect();
        assert_eq!(queued, moves);
        assert!(state.last_utterance().unwrap().grounded);
        assert!(state.previous_moves().is_empty());
    }

    #[test]
    fn system_moves_become_previous_moves() {
        let moves = vec![DialogueMove::system(MoveKind::Ask(Question::wh("how")))];
        let state = InformationState::new().with_utterance(Participant::System, moves.clone());

        let (state, _) = run(&travel_domain(), Phase::GroundingSetup, state);

        assert_eq!(state.previous_moves(), moves.as_slice());
    }

    #[test]
    fn grounded_utterance_is_not_queued_twice() {
        let state = InformationState::new()
            .with_utterance(Participant::User, vec![DialogueMove::user(MoveKind::Greet)]);
        let (state, _) = run(&travel_domain(), Phase::GroundingSetup, state);
        let (state, fired) = run(&travel_domain(), Phase::GroundingSetup, state);

        assert!(fired.is_empty());
        assert_eq!(state.pending().len(), 1);
    }
}
