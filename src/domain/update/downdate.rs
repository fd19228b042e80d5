//! Downdate: removes what shared commitments have resolved.
//!
//! This is the only place questions leave QUD in the normal course of a
//! dialogue: a top once a commitment resolves it, a clarification once it
//! is superseded or the system has said it gives up on it.

use super::resolved;
use crate::domain::information_state::{AgendaAction, InformationState};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::{DialogueMove, Icm, MoveKind, Participant, PlanGoal, Question};

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![
        UpdateRule::new("downdate.qud", Phase::Downdate, 100, match_resolved_qud_top, pop_qud),
        UpdateRule::new(
            "downdate.rejected_clarification",
            Phase::Downdate,
            97,
            match_rejected_clarification,
            drop_clarification,
        ),
        UpdateRule::new(
            "downdate.superseded_clarification",
            Phase::Downdate,
            95,
            match_superseded_clarification,
            drop_clarification,
        ),
        UpdateRule::new(
            "downdate.issues",
            Phase::Downdate,
            90,
            match_resolved_issue,
            remove_issue,
        ),
        UpdateRule::new(
            "downdate.plans",
            Phase::Downdate,
            80,
            match_resolved_plan,
            remove_plan,
        ),
        UpdateRule::new(
            "downdate.agenda",
            Phase::Downdate,
            70,
            match_settled_agenda_action,
            remove_agenda_action,
        ),
    ]
}

fn match_resolved_qud_top(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(top) = state.qud().top() else {
        return Ok(None);
    };
    Ok(resolved(state, ctx, top)?.then(|| Bindings::new().with_question(top.clone())))
}

fn pop_qud(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    if state.qud().top() == Some(&question) {
        state.shared.qud.pop();
    }
    state.private.clarifications.remove(&question);
    Ok(state)
}

/// A clarification the system's last utterance gave up on.
fn match_rejected_clarification(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(utterance) = state
        .last_utterance()
        .filter(|utterance| utterance.speaker == Participant::System)
    else {
        return Ok(None);
    };
    Ok(state
        .clarifications()
        .iter()
        .find(|clarification| {
            let rejection =
                DialogueMove::system(MoveKind::Icm(Icm::issue_rejected((*clarification).clone())));
            utterance.moves.contains(&rejection)
        })
        .map(|clarification| Bindings::new().with_question(clarification.clone())))
}

/// A clarification that something else was raised above, or whose marker
/// outlived it on QUD.
fn match_superseded_clarification(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let top = state.qud().top();
    Ok(state
        .clarifications()
        .iter()
        .find(|clarification| top != Some(*clarification))
        .map(|clarification| Bindings::new().with_question(clarification.clone())))
}

fn drop_clarification(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    state.shared.qud.remove(&question);
    state.private.clarifications.remove(&question);
    state.unschedule(&AgendaAction::Raise(question));
    Ok(state)
}

fn match_resolved_issue(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for issue in state.issues().iter() {
        if resolved(state, ctx, issue)? {
            return Ok(Some(Bindings::new().with_question(issue.clone())));
        }
    }
    Ok(None)
}

fn remove_issue(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?;
    state.private.issues.remove(question);
    Ok(state)
}

fn match_resolved_plan(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for plan in state.plans() {
        if let Some(question) = plan.goal.question() {
            if resolved(state, ctx, question)? {
                return Ok(Some(Bindings::new().with_question(question.clone())));
            }
        }
    }
    Ok(None)
}

fn remove_plan(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let goal = PlanGoal::Resolve(bindings.question()?.clone());
    state.private.plans.retain(|plan| plan.goal != goal);
    Ok(state)
}

fn agenda_question(action: &AgendaAction) -> Option<&Question> {
    match action {
        AgendaAction::Respond(q) | AgendaAction::Findout(q) | AgendaAction::Raise(q) => Some(q),
        _ => None,
    }
}

/// Questions the agenda still means to ask or answer that are settled.
fn match_settled_agenda_action(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for action in state.agenda() {
        if let Some(question) = agenda_question(action) {
            if resolved(state, ctx, question)? {
                return Ok(Some(Bindings::new().with_question(question.clone())));
            }
        }
    }
    Ok(None)
}

fn remove_agenda_action(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?;
    state
        .private
        .agenda
        .retain(|action| agenda_question(action) != Some(question));
    Ok(state)
}
