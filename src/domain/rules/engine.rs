//! Rule engine - applies update rules phase by phase.
//!
//! Within a phase exactly one rule fires per scan: the applicable rule with
//! the highest priority, ties broken by registration order. After a firing
//! the scan restarts from the top against the new state. The phase ends when
//! a scan finds nothing applicable.

use std::collections::BTreeMap;
use tracing::{debug, error};

use super::{Bindings, EngineError, Phase, RuleContext, UpdateRule};
use crate::domain::information_state::InformationState;

/// Rules indexed by phase, each list in firing order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    by_phase: BTreeMap<Phase, Vec<UpdateRule>>,
}

impl RuleSet {
    /// Builds the set. Rule lists are stably sorted by descending priority,
    /// so equal priorities keep the order given here.
    pub fn new(rules: impl IntoIterator<Item = UpdateRule>) -> Self {
        let mut by_phase: BTreeMap<Phase, Vec<UpdateRule>> = BTreeMap::new();
        for rule in rules {
            by_phase.entry(rule.phase).or_default().push(rule);
        }
        for list in by_phase.values_mut() {
            list.sort_by(|a, b| b.priority.cmp(&a.priority));
        }
        Self { by_phase }
    }

    pub fn rules_for(&self, phase: Phase) -> &[UpdateRule] {
        self.by_phase.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_phase.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of running one phase or cycle.
#[derive(Debug, Clone)]
pub struct PhaseOutcome {
    pub state: InformationState,
    /// Names of the rules that fired, in firing order.
    pub fired: Vec<&'static str>,
}

/// Applies a rule set to information states.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: RuleSet,
    max_iterations: usize,
}

impl RuleEngine {
    pub fn new(rules: RuleSet, max_iterations: usize) -> Self {
        Self {
            rules,
            max_iterations,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The first applicable rule of `phase` and its bindings.
    pub fn select(
        &self,
        phase: Phase,
        state: &InformationState,
        ctx: &RuleContext<'_>,
    ) -> Result<Option<(&UpdateRule, Bindings)>, EngineError> {
        for rule in self.rules.rules_for(phase) {
            if let Some(bindings) = (rule.precondition)(state, ctx)? {
                return Ok(Some((rule, bindings.matched_by(rule.name))));
            }
        }
        Ok(None)
    }

    /// Fires rules of `phase` until none applies.
    ///
    /// Fails with `EngineError::Divergence` once the phase fires more than
    /// the configured number of rules.
    pub fn apply_phase(
        &self,
        phase: Phase,
        state: InformationState,
        ctx: &RuleContext<'_>,
    ) -> Result<PhaseOutcome, EngineError> {
        let mut state = state;
        let mut fired = Vec::new();

        while let Some((rule, bindings)) = self.select(phase, &state, ctx)? {
            if fired.len() >= self.max_iterations {
                error!(
                    phase = %phase,
                    iterations = fired.len(),
                    last_rule = rule.name,
                    "Rule engine diverged"
                );
                return Err(EngineError::Divergence {
                    phase,
                    iterations: fired.len(),
                    last_rule: rule.name,
                });
            }

            debug!(
                phase = %phase,
                rule = rule.name,
                iteration = fired.len() + 1,
                "Rule fired"
            );
            state = (rule.effect)(state, &bindings, ctx)?;
            fired.push(rule.name);
        }

        Ok(PhaseOutcome { state, fired })
    }

    /// Runs `phases` in order, repeating the sequence until a full pass
    /// fires nothing.
    pub fn apply_cycle(
        &self,
        phases: &[Phase],
        state: InformationState,
        ctx: &RuleContext<'_>,
    ) -> Result<PhaseOutcome, EngineError> {
        let mut state = state;
        let mut fired = Vec::new();

        loop {
            let mut progressed = false;
            for &phase in phases {
                let outcome = self.apply_phase(phase, state, ctx)?;
                state = outcome.state;
                if !outcome.fired.is_empty() {
                    progressed = true;
                    fired.extend(outcome.fired);
                }
                if fired.len() > self.max_iterations {
                    let last_rule = fired.last().copied().unwrap_or("none");
                    error!(
                        phase = %phase,
                        iterations = fired.len(),
                        last_rule,
                        "Rule cycle diverged"
                    );
                    return Err(EngineError::Divergence {
                        phase,
                        iterations: fired.len(),
                        last_rule,
                    });
                }
            }
            if !progressed {
                return Ok(PhaseOutcome { state, fired });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticDomain;
    use crate::domain::information_state::AgendaAction;
    use crate::domain::rules::UpdatePolicy;
    use crate::domain::semantics::Question;
    use proptest::prelude::*;

    // =========================================================================
    // Toy rules
    // =========================================================================

    fn agenda_empty(
        state: &InformationState,
        _: &RuleContext<'_>,
    ) -> Result<Option<Bindings>, EngineError> {
        Ok(state.agenda().is_empty().then(Bindings::new))
    }

    fn no_greet(
        state: &InformationState,
        _: &RuleContext<'_>,
    ) -> Result<Option<Bindings>, EngineError> {
        Ok((!state.agenda().contains(&AgendaAction::Greet)).then(Bindings::new))
    }

    fn always(
        _: &InformationState,
        _: &RuleContext<'_>,
    ) -> Result<Option<Bindings>, EngineError> {
        Ok(Some(Bindings::new()))
    }

    fn schedule_greet(
        mut state: InformationState,
        _: &Bindings,
        _: &RuleContext<'_>,
    ) -> Result<InformationState, EngineError> {
        state.schedule(AgendaAction::Greet);
        Ok(state)
    }

    fn schedule_quit(
        mut state: InformationState,
        _: &Bindings,
        _: &RuleContext<'_>,
    ) -> Result<InformationState, EngineError> {
        state.schedule(AgendaAction::Quit);
        Ok(state)
    }

    fn push_issue(
        mut state: InformationState,
        _: &Bindings,
        _: &RuleContext<'_>,
    ) -> Result<InformationState, EngineError> {
        let n = state.issues().len();
        state.private.issues.push(Question::wh(format!("q{}", n)));
        Ok(state)
    }

    fn needs_question(
        _: InformationState,
        bindings: &Bindings,
        _: &RuleContext<'_>,
    ) -> Result<InformationState, EngineError> {
        bindings.question()?;
        unreachable!("binding is never set")
    }

    fn domain() -> StaticDomain {
        StaticDomain::builder().build().unwrap()
    }

    // =========================================================================
    // RuleSet
    // =========================================================================

    mod rule_set {
        use super::*;

        #[test]
        fn sorts_by_priority_keeping_registration_order_for_ties() {
            let set = RuleSet::new([
                UpdateRule::new("low", Phase::Integrate, 1, always, schedule_greet),
                UpdateRule::new("high_a", Phase::Integrate, 5, always, schedule_greet),
                UpdateRule::new("high_b", Phase::Integrate, 5, always, schedule_greet),
                UpdateRule::new("other", Phase::Downdate, 9, always, schedule_greet),
            ]);
            let names: Vec<_> = set
                .rules_for(Phase::Integrate)
                .iter()
                .map(|r| r.name)
                .collect();
            assert_eq!(names, vec!["high_a", "high_b", "low"]);
            assert_eq!(set.len(), 4);
            assert!(set.rules_for(Phase::SelectMove).is_empty());
        }
    }

    // =========================================================================
    // apply_phase
    // =========================================================================

    mod apply_phase {
        use super::*;

        #[test]
        fn fires_highest_priority_rule_and_rescans() {
            let engine = RuleEngine::new(
                RuleSet::new([
                    UpdateRule::new("quit", Phase::SelectMove, 1, agenda_empty, schedule_quit),
                    UpdateRule::new("greet", Phase::SelectMove, 2, agenda_empty, schedule_greet),
                ]),
                10,
            );
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let outcome = engine
                .apply_phase(Phase::SelectMove, InformationState::new(), &ctx)
                .unwrap();

            assert_eq!(outcome.fired, vec!["greet"]);
            assert_eq!(
                outcome.state.agenda().iter().collect::<Vec<_>>(),
                vec![&AgendaAction::Greet]
            );
        }

        #[test]
        fn quiet_phase_returns_state_unchanged() {
            let engine = RuleEngine::new(RuleSet::default(), 10);
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let outcome = engine
                .apply_phase(Phase::Integrate, InformationState::new(), &ctx)
                .unwrap();

            assert!(outcome.fired.is_empty());
            assert_eq!(outcome.state, InformationState::new());
        }

        #[test]
        fn rule_that_never_falsifies_itself_diverges() {
            let engine = RuleEngine::new(
                RuleSet::new([UpdateRule::new(
                    "loop",
                    Phase::ExecPlan,
                    0,
                    always,
                    push_issue,
                )]),
                25,
            );
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let err = engine
                .apply_phase(Phase::ExecPlan, InformationState::new(), &ctx)
                .unwrap_err();

            assert_eq!(
                err,
                EngineError::Divergence {
                    phase: Phase::ExecPlan,
                    iterations: 25,
                    last_rule: "loop",
                }
            );
        }

        #[test]
        fn missing_binding_aborts_with_rule_name() {
            let engine = RuleEngine::new(
                RuleSet::new([UpdateRule::new(
                    "broken",
                    Phase::Integrate,
                    0,
                    always,
                    needs_question,
                )]),
                10,
            );
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let err = engine
                .apply_phase(Phase::Integrate, InformationState::new(), &ctx)
                .unwrap_err();

            assert_eq!(
                err,
                EngineError::MissingBinding {
                    rule: "broken",
                    binding: "question",
                }
            );
        }
    }

    // =========================================================================
    // apply_cycle
    // =========================================================================

    mod apply_cycle {
        use super::*;

        #[test]
        fn repeats_until_full_pass_is_quiet() {
            let engine = RuleEngine::new(
                RuleSet::new([
                    UpdateRule::new("greet", Phase::Integrate, 0, no_greet, schedule_greet),
                    UpdateRule::new("quit", Phase::Downdate, 0, agenda_empty, schedule_quit),
                ]),
                10,
            );
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let outcome = engine
                .apply_cycle(&Phase::UPDATE, InformationState::new(), &ctx)
                .unwrap();

            assert_eq!(outcome.fired, vec!["greet"]);
        }
    }

    proptest! {
        #[test]
        fn same_state_and_rules_fire_the_same_sequence(priorities in proptest::collection::vec(-5i32..5, 1..6)) {
            let rules: Vec<UpdateRule> = priorities
                .iter()
                .map(|&p| UpdateRule::new("r", Phase::SelectMove, p, agenda_empty, schedule_greet))
                .collect();
            let engine = RuleEngine::new(RuleSet::new(rules), 50);
            let domain = domain();
            let policy = UpdatePolicy::default();
            let ctx = RuleContext::new(&domain, &policy);

            let first = engine.apply_phase(Phase::SelectMove, InformationState::new(), &ctx).unwrap();
            let second = engine.apply_phase(Phase::SelectMove, InformationState::new(), &ctx).unwrap();

            prop_assert_eq!(first.fired, second.fired);
            prop_assert_eq!(first.state, second.state);
        }
    }
}
