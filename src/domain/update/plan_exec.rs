//! Plan loading and execution.
//!
//! Only the first step of the topmost plan is ever executed or removed.
//! Steps that need the user (findout, raise) are left for selection.

use tracing::debug;

use super::{resolved, resolving_belief};
use crate::domain::information_state::{AgendaAction, InformationState};
use crate::domain::rules::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::semantics::{PlanGoal, Subplan};

pub(crate) fn rules() -> Vec<UpdateRule> {
    vec![
        UpdateRule::new(
            "load_plan.top_issue",
            Phase::LoadPlan,
            0,
            match_unplanned_issue,
            load_plan,
        ),
        UpdateRule::new(
            "exec_plan.remove_exhausted",
            Phase::ExecPlan,
            100,
            match_exhausted_plan,
            remove_exhausted_plan,
        ),
        UpdateRule::new(
            "exec_plan.skip_resolved",
            Phase::ExecPlan,
            90,
            match_resolved_step,
            drop_first_step,
        ),
        UpdateRule::new("exec_plan.consult", Phase::ExecPlan, 80, match_consult, consult),
        UpdateRule::new("exec_plan.execute", Phase::ExecPlan, 70, match_execute, execute),
        UpdateRule::new(
            "exec_plan.expand_conditional",
            Phase::ExecPlan,
            60,
            match_conditional,
            expand_conditional,
        ),
    ]
}

// =============================================================================
// LoadPlan
// =============================================================================

/// The top issue has no plan loaded, no known answer, and the library has
/// a plan for it.
fn match_unplanned_issue(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(issue) = state.issues().top() else {
        return Ok(None);
    };
    let goal = PlanGoal::Resolve(issue.clone());
    if state.plan_for(&goal).is_some()
        || resolved(state, ctx, issue)?
        || resolving_belief(state, ctx, issue)?.is_some()
    {
        return Ok(None);
    }
    Ok(ctx.domain.plan(&goal)?.map(|plan| Bindings::new().with_plan(plan)))
}

fn load_plan(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let plan = bindings.plan()?.clone();
    debug!(goal = %plan.goal, steps = plan.steps.len(), "Plan loaded");
    state.private.plans.insert(0, plan);
    Ok(state)
}

// =============================================================================
// ExecPlan
// =============================================================================

fn first_step(state: &InformationState) -> Option<&Subplan> {
    state.plans().first().and_then(|plan| plan.first_step())
}

fn pop_first_step(state: &mut InformationState) {
    if !state.private.plans.is_empty() {
        let plan = state.private.plans.remove(0);
        state.private.plans.insert(0, plan.without_first_step());
    }
}

fn match_exhausted_plan(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(state
        .plans()
        .first()
        .filter(|plan| plan.is_exhausted())
        .map(|plan| Bindings::new().with_plan(plan.clone())))
}

fn remove_exhausted_plan(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    if !state.private.plans.is_empty() {
        let plan = state.private.plans.remove(0);
        debug!(goal = %plan.goal, "Plan completed");
    }
    Ok(state)
}

fn match_resolved_step(
    state: &InformationState,
    ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    let Some(question) = first_step(state).and_then(Subplan::asks) else {
        return Ok(None);
    };
    Ok(resolved(state, ctx, question)?.then(|| Bindings::new().with_question(question.clone())))
}

fn drop_first_step(
    mut state: InformationState,
    _bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    pop_first_step(&mut state);
    Ok(state)
}

fn match_consult(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match first_step(state) {
        Some(Subplan::Consult(question)) => Some(Bindings::new().with_question(question.clone())),
        _ => None,
    })
}

/// Looks the answer up and keeps it as a private belief until the system
/// chooses to share it.
fn consult(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let question = bindings.question()?;
    let belief = ctx.domain.consult(question, &state.facts())?;
    debug!(question = %question, belief = %belief, "Consulted domain");
    state.private.beliefs.insert(belief);
    pop_first_step(&mut state);
    Ok(state)
}

fn match_execute(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match first_step(state) {
        Some(Subplan::Execute(action)) => Some(Bindings::new().with_action(action.clone())),
        _ => None,
    })
}

fn execute(
    mut state: InformationState,
    bindings: &Bindings,
    ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let action = bindings.action()?;
    let outcome = ctx.domain.perform(action, &state.facts())?;
    debug!(action = %action, outcome = %outcome, "Action performed");
    state.private.beliefs.insert(outcome.clone());
    state.schedule(AgendaAction::Report(outcome));
    pop_first_step(&mut state);
    Ok(state)
}

fn match_conditional(
    state: &InformationState,
    _ctx: &RuleContext<'_>,
) -> Result<Option<Bindings>, EngineError> {
    Ok(match first_step(state) {
        Some(Subplan::If { condition, .. }) => {
            Some(Bindings::new().with_proposition(condition.clone()))
        }
        _ => None,
    })
}

/// Replaces the conditional with the branch the established facts select.
fn expand_conditional(
    mut state: InformationState,
    bindings: &Bindings,
    _ctx: &RuleContext<'_>,
) -> Result<InformationState, EngineError> {
    let condition = bindings.proposition()?;
    let holds = state.facts().contains(condition);
    if !state.private.plans.is_empty() {
        let plan = state.private.plans.remove(0);
        let branch = match plan.first_step() {
            Some(Subplan::If {
                then, otherwise, ..
            }) => {
                if holds {
                    then.clone()
                } else {
                    otherwise.clone()
                }
            }
            _ => Vec::new(),
        };
        state.private.plans.insert(0, plan.expand_first_step(branch));
    }
    Ok(state)
}
