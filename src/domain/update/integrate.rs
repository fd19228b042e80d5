//! Integration: folds pending moves into the information state.
//!
//! Rules scan the pending queue front to back and consume at most one move
//! per firing. A move no rule matches stays queued for accommodation or the
//! next update cycle.

use tracing::debug;

use super::{
    consume, fits_open_question, pending_from, pending_user_answers, raise_issue, raise_on_qud,
    resolved, resolving_belief,
};
use crate::domain::information_state::{AgendaAction, InformationState};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::{
    Answer, AnswerContent, Icm, IcmContent, IcmLevel, MoveKind, Participant, PlanGoal, Polarity,
    Proposition, Question,
};

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![
        UpdateRule::new("integrate.system_ask", Phase::Integrate, 100, match_system_ask, system_ask),
        UpdateRule::new(
            "integrate.system_answer",
            Phase::Integrate,
            95,
            match_system_answer,
            system_answer,
        ),
        UpdateRule::new(
            "integrate.system_other",
            Phase::Integrate,
            94,
            match_system_other,
            system_other,
        ),
        UpdateRule::new(
            "integrate.clarification_bypass",
            Phase::Integrate,
            90,
            match_clarification_bypass,
            clarification_bypass,
        ),
        UpdateRule::new(
            "integrate.low_confidence_answer",
            Phase::Integrate,
            85,
            match_low_confidence_answer,
            low_confidence_answer,
        ),
        UpdateRule::new(
            "integrate.revise_commitment",
            Phase::Integrate,
            80,
            match_revise_commitment,
            revise_commitment,
        ),
        UpdateRule::new("integrate.answer", Phase::Integrate, 70, match_answer, answer),
        UpdateRule::new(
            "integrate.repeated_answer",
            Phase::Integrate,
            65,
            match_repeated_answer,
            repeated_answer,
        ),
        UpdateRule::new("integrate.user_ask", Phase::Integrate, 60, match_user_ask, user_ask),
        UpdateRule::new(
            "integrate.reject_user_ask",
            Phase::Integrate,
            55,
            match_unanswerable_ask,
            reject_user_ask,
        ),
        UpdateRule::new(
            "integrate.user_request",
            Phase::Integrate,
            50,
            match_user_request,
            user_request,
        ),
        UpdateRule::new(
            "integrate.reject_user_request",
            Phase::Integrate,
            45,
            match_unsupported_request,
            reject_user_request,
        ),
        UpdateRule::new("integrate.user_greet", Phase::Integrate, 30, match_user_greet, user_greet),
        UpdateRule::new("integrate.user_quit", Phase::Integrate, 30, match_user_quit, user_quit),
        UpdateRule::new(
            "integrate.user_feedback",
            Phase::Integrate,
            20,
            match_user_feedback,
            user_feedback,
        ),
    ]
}

// =============================================================================
// System moves
// =============================================================================

fn match_system_ask(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(pending_from(state, Participant::System).find_map(|(index, m)| match &m.kind {
        MoveKind::Ask(q) => Some(Bindings::new().with_pending(index).with_question(q.clone())),
        _ => None,
    }))
}

/// A question the system asked becomes the topic. Clarifications stay off
/// the issue stack.
fn system_ask(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    consume(&mut state, bindings)?;
    if !state.is_clarification(&question) {
        raise_issue(&mut state, ctx, question.clone());
    }
    raise_on_qud(&mut state, ctx, question);
    Ok(state)
}

fn match_system_answer(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(pending_from(state, Participant::System).find_map(|(index, m)| {
        let proposition = match &m.kind {
            MoveKind::Assert(p) => Some(p.clone()),
            _ => m.as_answer().and_then(|a| a.as_proposition().cloned()),
        };
        proposition.map(|p| Bindings::new().with_pending(index).with_proposition(p))
    }))
}

/// What the system answers or reports becomes shared.
fn system_answer(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;
    state.commit(proposition);
    Ok(state)
}

fn match_system_other(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(pending_from(state, Participant::System)
        .find(|(_, m)| {
            !m.raises_question()
                && m.as_answer().is_none()
                && !matches!(m.kind, MoveKind::Assert(_))
        })
        .map(|(index, _)| Bindings::new().with_pending(index)))
}

/// Greetings, goodbyes and feedback from the system change nothing shared.
fn system_other(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    consume(&mut state, bindings)?;
    Ok(state)
}

// =============================================================================
// User answers
// =============================================================================

/// An answer that misses the clarification on top of QUD but resolves the
/// question the clarification suspended.
fn match_clarification_bypass(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let (Some(clarification), Some(suspended)) = (state.qud().top(), state.qud().second()) else {
        return Ok(None);
    };
    if !state.is_clarification(clarification) {
        return Ok(None);
    }
    for (index, answer) in pending_user_answers(state) {
        if ctx.domain.relevant(&answer.content, clarification)?
            || !ctx.domain.relevant(&answer.content, suspended)?
        {
            continue;
        }
        let proposition = ctx.domain.combine(suspended, &answer.content)?;
        if ctx.domain.resolves(&proposition, suspended)? {
            return Ok(Some(
                Bindings::new()
                    .with_pending(index)
                    .with_question(clarification.clone())
                    .with_proposition(proposition),
            ));
        }
    }
    Ok(None)
}

/// Pops the clarification and commits the answer once. The suspended
/// question is left for downdate, which now finds it resolved.
fn clarification_bypass(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let clarification = bindings.question()?.clone();
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;

    if state.qud().top() == Some(&clarification) {
        state.shared.qud.pop();
    }
    state.private.clarifications.remove(&clarification);
    state.unschedule(&AgendaAction::Raise(clarification));
    state.schedule(AgendaAction::Icm(Icm::accepted(proposition.clone())));
    state.commit(proposition);
    Ok(state)
}

fn match_low_confidence_answer(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(top) = state.qud().top() else {
        return Ok(None);
    };
    if state.is_clarification(top) {
        return Ok(None);
    }
    for (index, m) in pending_from(state, Participant::User) {
        if m.score >= ctx.policy.understanding_threshold {
            continue;
        }
        let Some(answer) = m.as_answer() else {
            continue;
        };
        if ctx.domain.relevant(&answer.content, top)? {
            let proposition = ctx.domain.combine(top, &answer.content)?;
            return Ok(Some(
                Bindings::new().with_pending(index).with_proposition(proposition),
            ));
        }
    }
    Ok(None)
}

/// Checks a poorly understood answer with "P, is that correct?" instead of
/// committing it.
fn low_confidence_answer(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;

    let check = Question::yes_no(proposition.clone());
    raise_on_qud(&mut state, ctx, check.clone());
    state.private.clarifications.insert(check);
    state.schedule(AgendaAction::Icm(
        Icm::new(IcmLevel::Understanding, Polarity::Interrogative)
            .with_content(IcmContent::Proposition(proposition)),
    ));
    Ok(state)
}

fn match_revise_commitment(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, answer) in pending_user_answers(state) {
        let Some((question, proposition)) = revision_target(state, ctx, &answer)? else {
            continue;
        };
        if !stale_commitments(state, ctx, &question, &proposition)?.is_empty() {
            return Ok(Some(
                Bindings::new()
                    .with_pending(index)
                    .with_question(question)
                    .with_proposition(proposition),
            ));
        }
    }
    Ok(None)
}

/// The question an answer addresses and the proposition it amounts to:
/// the explicit question, else the QUD top, else whatever question the
/// domain says a full proposition answers.
fn revision_target(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    answer: &Answer,
) -> Result<Option<(Question, Proposition)>, EngineError> {
    for question in answer.question.iter().chain(state.qud().top()) {
        if ctx.domain.relevant(&answer.content, question)? {
            let proposition = ctx.domain.combine(question, &answer.content)?;
            return Ok(Some((question.clone(), proposition)));
        }
    }
    if let Some(proposition) = answer.as_proposition() {
        if let Some(question) = ctx.domain.question_for(proposition)? {
            return Ok(Some((question, proposition.clone())));
        }
    }
    Ok(None)
}

/// Commitments about `question` that cannot hold alongside `proposition`.
fn stale_commitments(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    question: &Question,
    proposition: &Proposition,
) -> Result<Vec<Proposition>, EngineError> {
    let mut stale = Vec::new();
    for commitment in state.commitments().iter() {
        if commitment == proposition || !ctx.domain.incompatible(commitment, proposition)? {
            continue;
        }
        let about_question = ctx.domain.resolves(commitment, question)?
            || ctx
                .domain
                .relevant(&AnswerContent::Proposition(commitment.clone()), question)?;
        if about_question {
            stale.push(commitment.clone());
        }
    }
    Ok(stale)
}

/// Retracts what the new answer contradicts, reopens everything that
/// depended on it, then commits the new answer.
fn revise_commitment(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;

    for stale in stale_commitments(&state, ctx, &question, &proposition)? {
        debug!(retracted = %stale, replacement = %proposition, "Commitment revised");
        state.shared.commitments.remove(&stale);
    }
    let mut contradicted = Vec::new();
    for belief in state.beliefs().iter() {
        if ctx.domain.incompatible(belief, &proposition)? {
            contradicted.push(belief.clone());
        }
    }
    for belief in &contradicted {
        state.private.beliefs.remove(belief);
    }

    reopen_dependents(&mut state, ctx, &question)?;

    state.commit(proposition.clone());
    state.schedule(AgendaAction::Icm(Icm::accepted(proposition)));
    Ok(state)
}

/// Worklist over `depends`: every plan-library issue that presupposes a
/// changed question loses its answers and goes back on the issue stack.
fn reopen_dependents(
    state: &mut InformationState,
    ctx: &RuleContext<'_>,
    changed: &Question,
) -> Result<(), EngineError> {
    let goals = ctx.domain.plan_goals()?;
    let mut worklist = vec![changed.clone()];
    let mut visited: Vec<Question> = Vec::new();

    while let Some(question) = worklist.pop() {
        if visited.contains(&question) {
            continue;
        }
        visited.push(question.clone());

        for goal in &goals {
            let Some(dependent) = goal.question() else {
                continue;
            };
            if dependent == &question || !ctx.domain.depends(dependent, &question)? {
                continue;
            }

            let mut retracted = Vec::new();
            for fact in state.commitments().iter().chain(state.beliefs().iter()) {
                if ctx.domain.resolves(fact, dependent)? {
                    retracted.push(fact.clone());
                }
            }
            if !retracted.is_empty() {
                for fact in &retracted {
                    state.shared.commitments.remove(fact);
                    state.private.beliefs.remove(fact);
                }
                debug!(issue = %dependent, "Dependent issue reopened");
                raise_issue(state, ctx, dependent.clone());
            }
            worklist.push(dependent.clone());
        }
    }
    Ok(())
}

fn match_answer(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(top) = state.qud().top() else {
        return Ok(None);
    };
    for (index, answer) in pending_user_answers(state) {
        if ctx.domain.relevant(&answer.content, top)? {
            let proposition = ctx.domain.combine(top, &answer.content)?;
            return Ok(Some(
                Bindings::new()
                    .with_pending(index)
                    .with_question(top.clone())
                    .with_proposition(proposition),
            ));
        }
    }
    Ok(None)
}

/// Commits an answer to the question in focus. Downdate pops it once the
/// commitment resolves it.
fn answer(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;

    if state.is_clarification(&question) {
        state.unschedule(&AgendaAction::Raise(question));
    }
    state.schedule(AgendaAction::Icm(Icm::accepted(proposition.clone())));
    state.commit(proposition);
    Ok(state)
}

/// An answer restating a commitment while nothing open or planned still
/// waits for it.
fn match_repeated_answer(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, answer) in pending_user_answers(state) {
        if fits_open_question(state, ctx, &answer.content)?
            || fits_unresolved_plan_question(state, ctx, &answer.content)?
        {
            continue;
        }
        for commitment in state.commitments().iter() {
            let Some(question) = ctx.domain.question_for(commitment)? else {
                continue;
            };
            if !ctx.domain.relevant(&answer.content, &question)? {
                continue;
            }
            if &ctx.domain.combine(&question, &answer.content)? == commitment {
                return Ok(Some(
                    Bindings::new()
                        .with_pending(index)
                        .with_proposition(commitment.clone()),
                ));
            }
        }
    }
    Ok(None)
}

fn fits_unresolved_plan_question(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    content: &AnswerContent,
) -> Result<bool, EngineError> {
    for plan in state.plans() {
        for question in plan.findout_questions() {
            if !resolved(state, ctx, question)? && ctx.domain.relevant(content, question)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Acknowledges the restated answer. Nothing shared changes.
fn repeated_answer(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let proposition = bindings.proposition()?.clone();
    consume(&mut state, bindings)?;
    state.schedule(AgendaAction::Icm(Icm::accepted(proposition)));
    Ok(state)
}

// =============================================================================
// User questions and requests
// =============================================================================

fn answerable(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    question: &Question,
) -> Result<bool, EngineError> {
    Ok(ctx
        .domain
        .plan(&PlanGoal::Resolve(question.clone()))?
        .is_some()
        || resolving_belief(state, ctx, question)?.is_some()
        || resolved(state, ctx, question)?)
}

fn match_user_ask(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, m) in pending_from(state, Participant::User) {
        if let MoveKind::Ask(question) = &m.kind {
            if answerable(state, ctx, question)? {
                return Ok(Some(
                    Bindings::new()
                        .with_pending(index)
                        .with_question(question.clone()),
                ));
            }
        }
    }
    Ok(None)
}

fn user_ask(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    consume(&mut state, bindings)?;
    raise_issue(&mut state, ctx, question.clone());
    raise_on_qud(&mut state, ctx, question.clone());
    state.schedule(AgendaAction::Respond(question));
    Ok(state)
}

fn match_unanswerable_ask(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, m) in pending_from(state, Participant::User) {
        if let MoveKind::Ask(question) = &m.kind {
            if !answerable(state, ctx, question)? {
                return Ok(Some(
                    Bindings::new()
                        .with_pending(index)
                        .with_question(question.clone()),
                ));
            }
        }
    }
    Ok(None)
}

/// Rejects the issue without putting it on QUD.
fn reject_user_ask(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    consume(&mut state, bindings)?;
    state.schedule(AgendaAction::Icm(Icm::issue_rejected(question)));
    Ok(state)
}

fn match_request(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    supported: bool,
) -> Result<Option<Bindings>, EngineError> {
    for (index, m) in pending_from(state, Participant::User) {
        if let MoveKind::Request(action) = &m.kind {
            let plan = ctx.domain.plan(&PlanGoal::Perform(action.clone()))?;
            match (plan, supported) {
                (Some(plan), true) => {
                    return Ok(Some(
                        Bindings::new()
                            .with_pending(index)
                            .with_action(action.clone())
                            .with_plan(plan),
                    ))
                }
                (None, false) => {
                    return Ok(Some(
                        Bindings::new()
                            .with_pending(index)
                            .with_action(action.clone()),
                    ))
                }
                _ => {}
            }
        }
    }
    Ok(None)
}

fn match_user_request(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    match_request(state, ctx, true)
}

fn match_unsupported_request(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    match_request(state, ctx, false)
}

/// Loads the action's plan on top of the plan stack.
fn user_request(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let plan = bindings.plan()?.clone();
    consume(&mut state, bindings)?;
    state.private.plans.retain(|loaded| loaded.goal != plan.goal);
    state.private.plans.insert(0, plan);
    Ok(state)
}

fn reject_user_request(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let action = bindings.action()?.clone();
    consume(&mut state, bindings)?;
    state.schedule(AgendaAction::Icm(Icm::action_rejected(action)));
    Ok(state)
}

// =============================================================================
// Social moves and feedback
// =============================================================================

fn match_user_kind(
    state: &InformationState,
    wanted: fn(&MoveKind) -> bool,
) -> Option<Bindings> {
    pending_from(state, Participant::User)
        .find(|(_, m)| wanted(&m.kind))
        .map(|(index, _)| Bindings::new().with_pending(index))
}

fn match_user_greet(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_user_kind(state, |kind| matches!(kind, MoveKind::Greet)))
}

fn user_greet(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    consume(&mut state, bindings)?;
    state.schedule(AgendaAction::Greet);
    Ok(state)
}

fn match_user_quit(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_user_kind(state, |kind| matches!(kind, MoveKind::Quit)))
}

fn user_quit(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    consume(&mut state, bindings)?;
    state.schedule(AgendaAction::Quit);
    Ok(state)
}

fn match_user_feedback(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match_user_kind(state, |kind| matches!(kind, MoveKind::Icm(_))))
}

/// "Pardon?" makes the system repeat itself. Other user feedback is noted
/// and dropped.
fn user_feedback(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let pending = consume(&mut state, bindings)?;
    if let MoveKind::Icm(icm) = &pending.dialogue_move.kind {
        if icm.level == IcmLevel::Perception && icm.is_negative() {
            state.schedule(AgendaAction::RepeatPrevious);
        }
    }
    Ok(state)
}
