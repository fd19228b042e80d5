//! Update rule families.
//!
//! Each submodule contributes the rules of one or more phases. Together they
//! implement issue-based dialogue management: integration of user and system
//! moves, accommodation of implicit issues and plans, clarification, belief
//! revision, plan execution and selection of the next system moves.

mod accommodate;
mod downdate;
mod grounding;
mod integrate;
mod plan_exec;
mod select;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::domain::information_state::{InformationState, PendingMove};
use crate::domain::rules::{Bindings, EngineError, RuleContext, RuleSet, UpdateRule};
use crate::domain::semantics::{
    Answer, AnswerContent, DialogueMove, Participant, Proposition, Question,
};

/// The complete rule library, in registration order.
pub fn standard_rules() -> Vec<UpdateRule> {
    let mut rules = Vec::new();
    rules.extend(grounding::rules());
    rules.extend(integrate::rules());
    rules.extend(accommodate::rules());
    rules.extend(downdate::rules());
    rules.extend(plan_exec::rules());
    rules.extend(select::rules());
    rules
}

/// The complete rule library, indexed by phase.
pub fn standard_rule_set() -> RuleSet {
    RuleSet::new(standard_rules())
}

/// True if some shared commitment resolves `question`.
pub(crate) fn resolved(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    question: &Question,
) -> Result<bool, EngineError> {
    for commitment in state.commitments().iter() {
        if ctx.domain.resolves(commitment, question)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The first private belief that resolves `question`.
pub(crate) fn resolving_belief<'s>(
    state: &'s InformationState,
    ctx: &RuleContext<'_>,
    question: &Question,
) -> Result<Option<&'s Proposition>, EngineError> {
    for belief in state.beliefs().iter() {
        if ctx.domain.resolves(belief, question)? {
            return Ok(Some(belief));
        }
    }
    Ok(None)
}

/// True if `content` answers something already on QUD or the issue stack.
pub(crate) fn fits_open_question(
    state: &InformationState,
    ctx: &RuleContext<'_>,
    content: &AnswerContent,
) -> Result<bool, EngineError> {
    for question in state.qud().iter().chain(state.issues().iter()) {
        if ctx.domain.relevant(content, question)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Puts `question` on top of QUD, replacing whatever the domain takes to be
/// the same question.
pub(crate) fn raise_on_qud(state: &mut InformationState, ctx: &RuleContext<'_>, question: Question) {
    state
        .shared
        .qud
        .raise_by(question, |a, b| ctx.domain.same_question(a, b));
}

/// Puts `question` on top of the issue stack, replacing whatever the domain
/// takes to be the same question.
pub(crate) fn raise_issue(state: &mut InformationState, ctx: &RuleContext<'_>, question: Question) {
    state
        .private
        .issues
        .raise_by(question, |a, b| ctx.domain.same_question(a, b));
}

/// Pending moves from `speaker`, with their queue positions.
pub(crate) fn pending_from(
    state: &InformationState,
    speaker: Participant,
) -> impl Iterator<Item = (usize, &DialogueMove)> {
    state
        .pending()
        .iter()
        .enumerate()
        .filter(move |(_, pending)| pending.dialogue_move.is_from(speaker))
        .map(|(index, pending)| (index, &pending.dialogue_move))
}

/// Pending user answers (and assertions), with their queue positions.
pub(crate) fn pending_user_answers(
    state: &InformationState,
) -> impl Iterator<Item = (usize, Answer)> + '_ {
    pending_from(state, Participant::User)
        .filter_map(|(index, dialogue_move)| dialogue_move.as_answer().map(|a| (index, a)))
}

/// Removes the pending move a rule matched.
pub(crate) fn consume(
    state: &mut InformationState,
    bindings: &Bindings,
) -> Result<PendingMove, EngineError> {
    let index = bindings.pending()?;
    state
        .take_pending(index)
        .ok_or_else(|| bindings.missing("pending_index"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::Phase;

    #[test]
    fn rule_names_are_unique() {
        let rules = standard_rules();
        let mut names: Vec<_> = rules.iter().map(|r| r.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn rule_names_carry_their_phase() {
        for rule in standard_rules() {
            assert!(
                rule.name.starts_with(rule.phase.label()),
                "{} is registered in {}",
                rule.name,
                rule.phase
            );
        }
    }

    #[test]
    fn every_phase_has_rules() {
        let set = standard_rule_set();
        for phase in [
            Phase::GroundingSetup,
            Phase::Integrate,
            Phase::Accommodate,
            Phase::Downdate,
            Phase::LoadPlan,
            Phase::ExecPlan,
            Phase::SelectAction,
            Phase::SelectIcm,
            Phase::SelectMove,
        ] {
            assert!(!set.rules_for(phase).is_empty(), "no rules for {}", phase);
        }
    }
}
