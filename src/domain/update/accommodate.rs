//! Accommodation: infers the issues and plans an answer presupposes.
//!
//! These rules only see answers integration could not place. Issue-to-QUD
//! brings the one open issue an answer fits into local focus. Plan-to-issues
//! opens the one plan question an answer fits. An answer fitting several
//! questions is clarified instead of guessed. An answer fitting only an
//! unloaded plan for an unresolved goal loads it together with its
//! unresolved prerequisites.

use super::{
    consume, fits_open_question, pending_user_answers, raise_issue, raise_on_qud, resolved,
};
use crate::domain::information_state::{AgendaAction, InformationState};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::{AnswerContent, Plan, Proposition, Question};

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![
        UpdateRule::new(
            "accommodate.issue_to_qud",
            Phase::Accommodate,
            100,
            match_issue_to_qud,
            issue_to_qud,
        ),
        UpdateRule::new(
            "accommodate.plan_to_issues",
            Phase::Accommodate,
            90,
            match_plan_to_issues,
            plan_to_issues,
        ),
        UpdateRule::new(
            "accommodate.clarify_ambiguity",
            Phase::Accommodate,
            80,
            match_ambiguous_answer,
            clarify_ambiguity,
        ),
        UpdateRule::new(
            "accommodate.dependent_issue",
            Phase::Accommodate,
            70,
            match_dependent_issue,
            dependent_issue,
        ),
    ]
}

/// Open issues `content` is relevant to that are not on QUD yet.
fn issue_candidates(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    content: &AnswerContent,
) -> Result<Vec<Question>, EngineError> {
    let mut candidates = Vec::new();
    for issue in state.issues().iter() {
        if !state.qud().contains(issue) && ctx.domain.relevant(content, issue)? {
            candidates.push(issue.clone());
        }
    }
    Ok(candidates)
}

/// The one question among `candidates`: the only one, or the single default.
fn single_reading(
    ctx: &RuleContext<'_>,
    mut candidates: Vec<Question>,
) -> Result<Option<Question>, EngineError> {
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop()),
        _ => default_among(ctx, &candidates),
    }
}

fn match_issue_to_qud(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, answer) in pending_user_answers(state) {
        let candidates = issue_candidates(state, ctx, &answer.content)?;
        if let Some(issue) = single_reading(ctx, candidates)? {
            return Ok(Some(Bindings::new().with_pending(index).with_question(issue)));
        }
    }
    Ok(None)
}

fn issue_to_qud(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let issue = bindings.question()?.clone();
    raise_issue(&mut state, ctx, issue.clone());
    raise_on_qud(&mut state, ctx, issue);
    Ok(state)
}

/// Findout questions of every loaded plan, top plan first, without repeats.
fn loaded_findouts(state: &InformationState) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    for plan in state.plans() {
        for question in plan.findout_questions() {
            if !questions.contains(question) {
                questions.push(question.clone());
            }
        }
    }
    questions
}

/// Unresolved plan questions `content` is relevant to that are not yet open
/// issues.
fn plan_candidates(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    content: &AnswerContent,
) -> Result<Vec<Question>, EngineError> {
    let mut candidates = Vec::new();
    for question in loaded_findouts(state) {
        if state.issues().contains(&question) || resolved(state, ctx, &question)? {
            continue;
        }
        if ctx.domain.relevant(content, &question)? {
            candidates.push(question);
        }
    }
    Ok(candidates)
}

/// The single default question among `candidates`, if there is exactly one.
fn default_among(
    ctx: &RuleContext<'_>,
    candidates: &[Question],
) -> Result<Option<Question>, EngineError> {
    let mut defaults = Vec::new();
    for question in candidates {
        if ctx.domain.default_question(question)? {
            defaults.push(question.clone());
        }
    }
    Ok(if defaults.len() == 1 { defaults.pop() } else { None })
}

fn match_plan_to_issues(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, answer) in pending_user_answers(state) {
        if fits_open_question(state, ctx, &answer.content)? {
            continue;
        }
        let candidates = plan_candidates(state, ctx, &answer.content)?;
        if let Some(question) = single_reading(ctx, candidates)? {
            return Ok(Some(Bindings::new().with_pending(index).with_question(question)));
        }
    }
    Ok(None)
}

/// Opens the plan question; issue-to-QUD then brings it into focus.
fn plan_to_issues(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?.clone();
    raise_issue(&mut state, ctx, question);
    Ok(state)
}

/// Questions an answer could be meant for: open issues off QUD first, else
/// plan questions when nothing open fits.
fn ambiguity_candidates(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    content: &AnswerContent,
) -> Result<Vec<Question>, EngineError> {
    let candidates = issue_candidates(state, ctx, content)?;
    if !candidates.is_empty() || fits_open_question(state, ctx, content)? {
        return Ok(candidates);
    }
    plan_candidates(state, ctx, content)
}

/// An answer with several readings and no default among them. While the
/// clarification it would raise is already open the answer is left pending,
/// so repeating it counts towards the unresolved-move policy.
fn match_ambiguous_answer(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    for (index, answer) in pending_user_answers(state) {
        let candidates = ambiguity_candidates(state, ctx, &answer.content)?;
        if candidates.len() < 2 || default_among(ctx, &candidates)?.is_some() {
            continue;
        }
        let mut readings: Vec<Proposition> = Vec::new();
        for candidate in &candidates {
            let reading = ctx.domain.combine(candidate, &answer.content)?;
            if !readings.contains(&reading) {
                readings.push(reading);
            }
        }
        let clarification = Question::alternative(readings);
        if state
            .clarifications()
            .iter()
            .any(|open| ctx.domain.same_question(open, &clarification))
        {
            continue;
        }
        return Ok(Some(
            Bindings::new()
                .with_pending(index)
                .with_question(clarification),
        ));
    }
    Ok(None)
}

/// Asks which reading was meant: an alternative question over what the
/// answer would mean for each candidate, pushed above the current topic.
fn clarify_ambiguity(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let clarification = bindings.question()?.clone();
    consume(&mut state, bindings)?;

    raise_on_qud(&mut state, ctx, clarification.clone());
    state.private.clarifications.insert(clarification.clone());
    state.schedule(AgendaAction::Raise(clarification));
    Ok(state)
}

fn match_dependent_issue(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let answers: Vec<_> = pending_user_answers(state).collect();
    if answers.is_empty() {
        return Ok(None);
    }
    let goals = ctx.domain.plan_goals()?;

    for (index, answer) in answers {
        if fits_open_question(state, ctx, &answer.content)? {
            continue;
        }
        let mut matches: Vec<(Question, Plan)> = Vec::new();
        for goal in &goals {
            let Some(issue) = goal.question() else {
                continue;
            };
            if state.issues().contains(issue) || state.plan_for(goal).is_some() {
                continue;
            }
            // Settled goals stay unloaded.
            if resolved(state, ctx, issue)? {
                continue;
            }
            let Some(plan) = ctx.domain.plan(goal)? else {
                continue;
            };
            let mut fits = false;
            for question in plan.findout_questions() {
                if ctx.domain.relevant(&answer.content, question)? {
                    fits = true;
                    break;
                }
            }
            if fits {
                matches.push((issue.clone(), plan));
            }
        }
        if matches.len() == 1 {
            if let Some((issue, plan)) = matches.pop() {
                return Ok(Some(
                    Bindings::new()
                        .with_pending(index)
                        .with_question(issue)
                        .with_plan(plan),
                ));
            }
        }
    }
    Ok(None)
}

/// Opens the issue and loads its plan. Unresolved prerequisites are opened
/// and loaded above it so they are dealt with first; plan-to-issues then
/// places the answer itself.
fn dependent_issue(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let issue = bindings.question()?.clone();
    let plan = bindings.plan()?.clone();
    raise_issue(&mut state, ctx, issue.clone());
    state.private.plans.insert(0, plan);

    for goal in ctx.domain.plan_goals()? {
        let Some(prerequisite) = goal.question() else {
            continue;
        };
        if prerequisite == &issue
            || state.issues().contains(prerequisite)
            || state.plan_for(&goal).is_some()
        {
            continue;
        }
        if !ctx.domain.depends(&issue, prerequisite)? || resolved(&state, ctx, prerequisite)? {
            continue;
        }
        if let Some(prerequisite_plan) = ctx.domain.plan(&goal)? {
            raise_issue(&mut state, ctx, prerequisite.clone());
            state.private.plans.insert(0, prerequisite_plan);
        }
    }
    Ok(state)
}
