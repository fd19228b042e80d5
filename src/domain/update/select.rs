//! Selection: decides what the system says next.
//!
//! Select-action fills the agenda, select-icm produces feedback moves and
//! select-move turns agenda actions into moves. At most one question is
//! asked per turn.

use tracing::warn;

use super::{consume, resolved, resolving_belief};
use crate::domain::information_state::{AgendaAction, InformationState};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::{
    Answer, DialogueMove, Icm, IcmLevel, MoveKind, Participant, Polarity, Question, Subplan,
};

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![
        UpdateRule::new(
            "select_action.respond",
            Phase::SelectAction,
            100,
            match_answerable_issue,
            schedule_respond,
        ),
        UpdateRule::new(
            "select_action.from_plan",
            Phase::SelectAction,
            90,
            match_plan_question,
            schedule_plan_question,
        ),
        UpdateRule::new(
            "select_icm.reject_unintegrated",
            Phase::SelectIcm,
            100,
            match_exhausted_move,
            reject_unintegrated,
        ),
        UpdateRule::new(
            "select_icm.not_understood",
            Phase::SelectIcm,
            90,
            match_unacknowledged_move,
            not_understood,
        ),
        UpdateRule::new(
            "select_icm.from_agenda",
            Phase::SelectIcm,
            80,
            match_agenda_icm,
            emit_agenda_icm,
        ),
        UpdateRule::new("select_move.greet", Phase::SelectMove, 100, match_greet, greet),
        UpdateRule::new("select_move.repeat", Phase::SelectMove, 90, match_repeat, repeat),
        UpdateRule::new("select_move.respond", Phase::SelectMove, 80, match_respond, respond),
        UpdateRule::new("select_move.report", Phase::SelectMove, 75, match_report, report),
        UpdateRule::new("select_move.ask", Phase::SelectMove, 70, match_ask, ask),
        UpdateRule::new("select_move.quit", Phase::SelectMove, 10, match_quit, quit),
    ]
}

fn asks_already(state: &InformationState) -> bool {
    state.next_moves().iter().any(DialogueMove::raises_question)
}

/// True if the next moves already give up on `question`.
fn rejecting(state: &InformationState, question: &Question) -> bool {
    let rejection = DialogueMove::system(MoveKind::Icm(Icm::issue_rejected(question.clone())));
    state.next_moves().contains(&rejection)
}

fn answers_already(state: &InformationState, question: &Question) -> bool {
    state.next_moves().iter().any(|m| {
        matches!(&m.kind, MoveKind::Answer(answer) if answer.question.as_ref() == Some(question))
    })
}

// =============================================================================
// SelectAction
// =============================================================================

/// An open issue the system can now answer from its own beliefs.
fn match_answerable_issue(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for issue in state.issues().iter() {
        let respond = AgendaAction::Respond(issue.clone());
        if state.agenda().contains(&respond)
            || answers_already(state, issue)
            || resolved(state, ctx, issue)?
        {
            continue;
        }
        if resolving_belief(state, ctx, issue)?.is_some() {
            return Ok(Some(Bindings::new().with_question(issue.clone())));
        }
    }
    Ok(None)
}

fn schedule_respond(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    state.schedule(AgendaAction::Respond(question));
    Ok(state)
}

/// The top plan waits on a question and nothing else is being asked.
fn match_plan_question(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    if state.agenda().iter().any(AgendaAction::raises_question) || asks_already(state) {
        return Ok(None);
    }
    if state
        .qud()
        .top()
        .is_some_and(|top| state.is_clarification(top) && !rejecting(state, top))
    {
        return Ok(None);
    }
    let Some(step) = state.plans().first().and_then(|plan| plan.first_step()) else {
        return Ok(None);
    };
    let Some(question) = step.asks() else {
        return Ok(None);
    };
    if resolved(state, ctx, question)? {
        return Ok(None);
    }
    Ok(Some(Bindings::new().with_question(question.clone())))
}

fn schedule_plan_question(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    let raise_step = matches!(
        state.plans().first().and_then(|plan| plan.first_step()),
        Some(Subplan::Raise(q)) if q == &question
    );
    if raise_step {
        state.schedule(AgendaAction::Raise(question));
    } else {
        state.schedule(AgendaAction::Findout(question));
    }
    Ok(state)
}

// =============================================================================
// SelectIcm
// =============================================================================

fn match_exhausted_move(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state
        .pending()
        .iter()
        .enumerate()
        .find(|(_, pending)| {
            pending.dialogue_move.is_from(Participant::User)
                && pending.attempts > 0
                && ctx.policy.unresolved.exhausted(pending.attempts)
        })
        .map(|(index, _)| Bindings::new().with_pending(index)))
}

/// Gives up on a move no rule could integrate. An open clarification is
/// rejected with it; downdate removes it once the rejection is said.
fn reject_unintegrated(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let rejected = consume(&mut state, bindings)?;
    warn!(
        dialogue_move = %rejected.dialogue_move,
        attempts = rejected.attempts,
        "Rejecting move that could not be integrated"
    );

    let clarification = state
        .qud()
        .top()
        .filter(|top| state.is_clarification(top))
        .cloned();
    let feedback = match clarification {
        Some(clarification) => {
            state.unschedule(&AgendaAction::Raise(clarification.clone()));
            Icm::issue_rejected(clarification)
        }
        None => Icm::new(IcmLevel::Acceptance, Polarity::Negative),
    };
    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Icm(feedback)));
    Ok(state)
}

fn match_unacknowledged_move(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state
        .pending()
        .iter()
        .enumerate()
        .find(|(_, pending)| {
            pending.dialogue_move.is_from(Participant::User)
                && pending.attempts > 0
                && !pending.feedback_given
        })
        .map(|(index, _)| Bindings::new().with_pending(index)))
}

/// "I don't quite understand", once per move and at most once per turn.
/// An open clarification is asked again.
fn not_understood(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let index = bindings.pending()?;
    let pending = state
        .private
        .pending
        .get_mut(index)
        .ok_or_else(|| bindings.missing("pending_index"))?;
    pending.feedback_given = true;

    let feedback = DialogueMove::system(MoveKind::Icm(Icm::not_understood()));
    if !state.next_moves().contains(&feedback) {
        state.private.next_moves.push(feedback);
    }
    if let Some(top) = state.qud().top().cloned() {
        if state.is_clarification(&top) {
            state.schedule(AgendaAction::Raise(top));
        }
    }
    Ok(state)
}

fn match_agenda_icm(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state
        .agenda()
        .iter()
        .any(|action| matches!(action, AgendaAction::Icm(_)))
        .then(Bindings::new))
}

/// Moves the first scheduled feedback into the next moves.
fn emit_agenda_icm(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let index = state
        .agenda()
        .iter()
        .position(|action| matches!(action, AgendaAction::Icm(_)))
        .ok_or_else(|| bindings.missing("icm"))?;
    if let Some(AgendaAction::Icm(icm)) = state.private.agenda.remove(index) {
        state
            .private
            .next_moves
            .push(DialogueMove::system(MoveKind::Icm(icm)));
    }
    Ok(state)
}

// =============================================================================
// SelectMove
// =============================================================================

fn match_scheduled(state: &InformationState, action: &AgendaAction) -> Option<Bindings> {
    state.agenda().contains(action).then(Bindings::new)
}

fn match_greet(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_scheduled(state, &AgendaAction::Greet))
}

fn greet(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    state.unschedule(&AgendaAction::Greet);
    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Greet));
    Ok(state)
}

fn match_repeat(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_scheduled(state, &AgendaAction::RepeatPrevious))
}

fn repeat(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    state.unschedule(&AgendaAction::RepeatPrevious);
    let previous = state.shared.previous_moves.clone();
    state.private.next_moves.extend(previous);
    Ok(state)
}

fn match_respond(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for action in state.agenda() {
        if let AgendaAction::Respond(question) = action {
            if let Some(belief) = resolving_belief(state, ctx, question)? {
                return Ok(Some(
                    Bindings::new()
                        .with_question(question.clone())
                        .with_proposition(belief.clone()),
                ));
            }
        }
    }
    Ok(None)
}

fn respond(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    let belief = bindings.proposition()?.clone();
    state.unschedule(&AgendaAction::Respond(question.clone()));
    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Answer(
            Answer::proposition(belief).to_question(question),
        )));
    Ok(state)
}

fn match_report(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state.agenda().iter().find_map(|action| match action {
        AgendaAction::Report(p) => Some(Bindings::new().with_proposition(p.clone())),
        _ => None,
    }))
}

fn report(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let outcome = bindings.proposition()?.clone();
    state.unschedule(&AgendaAction::Report(outcome.clone()));
    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Assert(outcome)));
    Ok(state)
}

fn match_ask(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    if asks_already(state) {
        return Ok(None);
    }
    Ok(state.agenda().iter().find_map(|action| match action {
        AgendaAction::Findout(q) | AgendaAction::Raise(q) => {
            Some(Bindings::new().with_question(q.clone()))
        }
        _ => None,
    }))
}

/// Asks the first scheduled question. A plan raise step is done once asked.
fn ask(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    state.unschedule(&AgendaAction::Findout(question.clone()));
    state.unschedule(&AgendaAction::Raise(question.clone()));

    let raise_step = matches!(
        state.plans().first().and_then(|plan| plan.first_step()),
        Some(Subplan::Raise(q)) if q == &question
    );
    if raise_step {
        let plan = state.private.plans.remove(0);
        state.private.plans.insert(0, plan.without_first_step());
    }

    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Ask(question)));
    Ok(state)
}

fn match_quit(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_scheduled(state, &AgendaAction::Quit))
}

fn quit(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    state.unschedule(&AgendaAction::Quit);
    state
        .private
        .next_moves
        .push(DialogueMove::system(MoveKind::Quit));
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::information_state::PendingMove;
    use crate::domain::rules::{UnresolvedPolicy, UpdatePolicy};
    use crate::domain::semantics::Proposition;
    use crate::domain::update::fixtures::*;

    fn select(state: InformationState) -> (InformationState, Vec<&'static str>) {
        run_cycle(&travel_domain(), &Phase::SELECT, state)
    }

    fn stuck(attempts: u32) -> PendingMove {
        let mut pending = PendingMove::new(DialogueMove::user(MoveKind::Answer(Answer::value(
            "purple",
        ))));
        pending.attempts = attempts;
        pending
    }

    mod questions {
        use super::*;

        #[test]
        fn plan_question_is_asked() {
            let mut state = InformationState::new();
            state.private.plans.push(price_plan());

            let (state, fired) = select(state);

            assert_eq!(fired, vec!["select_action.from_plan", "select_move.ask"]);
            assert_eq!(
                state.next_moves(),
                &[DialogueMove::system(MoveKind::Ask(mode()))]
            );
            assert!(state.agenda().is_empty());
        }

        #[test]
        fn only_one_question_per_turn() {
            let mut state = InformationState::new();
            state.schedule(AgendaAction::Findout(mode()));
            state.schedule(AgendaAction::Findout(dest_city()));

            let (state, _) = select(state);

            let asks = state.next_moves().iter().filter(|m| m.raises_question()).count();
            assert_eq!(asks, 1);
            assert_eq!(
                state.agenda().iter().collect::<Vec<_>>(),
                vec![&AgendaAction::Findout(dest_city())]
            );
        }

        #[test]
        fn raise_step_is_consumed_when_asked() {
            let mut state = InformationState::new();
            state.private.plans.push(crate::domain::semantics::Plan::new(
                crate::domain::semantics::PlanGoal::Resolve(price_question()),
                [Subplan::Raise(Question::wh("discount")), Subplan::Findout(mode())],
            ));

            let (state, _) = select(state);

            assert_eq!(
                state.next_moves(),
                &[DialogueMove::system(MoveKind::Ask(Question::wh("discount")))]
            );
            assert_eq!(state.plans()[0].first_step(), Some(&Subplan::Findout(mode())));
        }

        #[test]
        fn open_clarification_blocks_plan_questions() {
            let check = Question::yes_no(Proposition::new("mode", "plane"));
            let mut state = InformationState::new();
            state.private.plans.push(price_plan());
            state.shared.qud.push(check.clone());
            state.private.clarifications.insert(check);

            let (state, fired) = select(state);

            assert!(fired.is_empty());
            assert!(state.next_moves().is_empty());
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn known_answer_to_open_issue_is_given_with_acceptance_first() {
            let mut state = InformationState::new();
            state.private.issues.push(price_question());
            state.private.beliefs.insert(Proposition::new("price", "500"));
            state.schedule(AgendaAction::Icm(Icm::accepted(Proposition::new("mode", "plane"))));

            let (state, fired) = select(state);

            assert_eq!(
                fired,
                vec!["select_action.respond", "select_icm.from_agenda", "select_move.respond"]
            );
            assert_eq!(
                state.next_moves(),
                &[
                    DialogueMove::system(MoveKind::Icm(Icm::accepted(Proposition::new(
                        "mode", "plane"
                    )))),
                    DialogueMove::system(MoveKind::Answer(
                        Answer::proposition(Proposition::new("price", "500"))
                            .to_question(price_question())
                    )),
                ]
            );
        }

        #[test]
        fn respond_waits_for_an_answer() {
            let mut state = InformationState::new();
            state.schedule(AgendaAction::Respond(price_question()));

            let (state, fired) = select(state);

            assert!(fired.is_empty());
            assert_eq!(state.agenda().len(), 1);
        }

        #[test]
        fn report_greet_repeat_and_quit() {
            let mut state = InformationState::new();
            state.shared.previous_moves = vec![DialogueMove::system(MoveKind::Ask(mode()))];
            state.schedule(AgendaAction::Quit);
            state.schedule(AgendaAction::Report(Proposition::nullary("booked")));
            state.schedule(AgendaAction::RepeatPrevious);
            state.schedule(AgendaAction::Greet);

            let (state, _) = select(state);

            assert_eq!(
                state.next_moves(),
                &[
                    DialogueMove::system(MoveKind::Greet),
                    DialogueMove::system(MoveKind::Ask(mode())),
                    DialogueMove::system(MoveKind::Assert(Proposition::nullary("booked"))),
                    DialogueMove::system(MoveKind::Quit),
                ]
            );
        }
    }

    mod feedback {
        use super::*;

        #[test]
        fn unintegrated_move_gets_one_not_understood() {
            let mut state = InformationState::new();
            state.private.pending.push_back(stuck(1));
            state.private.pending.push_back(stuck(1));

            let (state, fired) = select(state);

            assert_eq!(
                fired,
                vec!["select_icm.not_understood", "select_icm.not_understood"]
            );
            assert_eq!(
                state.next_moves(),
                &[DialogueMove::system(MoveKind::Icm(Icm::not_understood()))]
            );
            assert!(state.pending().iter().all(|p| p.feedback_given));
        }

        #[test]
        fn open_clarification_is_asked_again() {
            let check = Question::yes_no(Proposition::new("mode", "plane"));
            let mut state = InformationState::new();
            state.shared.qud.push(check.clone());
            state.private.clarifications.insert(check.clone());
            state.private.pending.push_back(stuck(1));

            let (state, _) = select(state);

            assert_eq!(
                state.next_moves(),
                &[
                    DialogueMove::system(MoveKind::Icm(Icm::not_understood())),
                    DialogueMove::system(MoveKind::Ask(check)),
                ]
            );
        }

        #[test]
        fn exhausted_move_is_rejected_with_the_open_clarification() {
            let check = Question::yes_no(Proposition::new("mode", "plane"));
            let mut state = InformationState::new();
            state.private.plans.push(price_plan());
            state.shared.qud.push(mode());
            state.shared.qud.push(check.clone());
            state.private.clarifications.insert(check.clone());
            state.schedule(AgendaAction::Raise(check.clone()));
            state.private.pending.push_back(stuck(3));

            let (state, fired) = select(state);

            assert_eq!(fired[0], "select_icm.reject_unintegrated");
            assert!(state.pending().is_empty());
            // Leaving QUD is downdate's job once the rejection has been said.
            assert_eq!(state.qud().top(), Some(&check));
            assert!(state.is_clarification(&check));
            assert!(!state.agenda().contains(&AgendaAction::Raise(check.clone())));
            assert_eq!(
                state.next_moves(),
                &[
                    DialogueMove::system(MoveKind::Icm(Icm::issue_rejected(check))),
                    DialogueMove::system(MoveKind::Ask(mode())),
                ]
            );
        }

        #[test]
        fn reprompt_policy_never_rejects() {
            let policy = UpdatePolicy {
                unresolved: UnresolvedPolicy::Reprompt,
                ..UpdatePolicy::default()
            };
            let mut state = InformationState::new();
            let mut old = stuck(40);
            old.feedback_given = true;
            state.private.pending.push_back(old);

            let (state, fired) =
                run_cycle_with_policy(&travel_domain(), &policy, &Phase::SELECT, state);

            assert!(fired.is_empty());
            assert_eq!(state.pending().len(), 1);
        }
    }
}
