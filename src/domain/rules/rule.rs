//! Update rules as data.
//!
//! A rule is a named `(precondition, effect)` pair. The precondition inspects
//! a state and, when the rule applies, returns the bindings the effect needs.
//! The effect consumes the state and returns its replacement.

use std::fmt;

use super::{EngineError, Phase, UpdatePolicy};
use crate::domain::information_state::InformationState;
use crate::domain::semantics::{Action, Plan, Proposition, Question};
use crate::ports::DomainResource;

/// Everything a rule may consult besides the state itself.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub domain: &'a dyn DomainResource,
    pub policy: &'a UpdatePolicy,
}

impl<'a> RuleContext<'a> {
    pub fn new(domain: &'a dyn DomainResource, policy: &'a UpdatePolicy) -> Self {
        Self { domain, policy }
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("policy", self.policy)
            .finish_non_exhaustive()
    }
}

pub type Precondition =
    fn(&InformationState, &RuleContext<'_>) -> Result<Option<Bindings>, EngineError>;

pub type Effect =
    fn(InformationState, &Bindings, &RuleContext<'_>) -> Result<InformationState, EngineError>;

/// A single update rule.
#[derive(Clone, Copy)]
pub struct UpdateRule {
    pub name: &'static str,
    pub phase: Phase,
    /// Higher fires first. Ties go to the rule registered first.
    pub priority: i32,
    pub precondition: Precondition,
    pub effect: Effect,
}

impl UpdateRule {
    pub const fn new(
        name: &'static str,
        phase: Phase,
        priority: i32,
        precondition: Precondition,
        effect: Effect,
    ) -> Self {
        Self {
            name,
            phase,
            priority,
            precondition,
            effect,
        }
    }
}

impl fmt::Debug for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRule")
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Values a precondition matched, handed to the effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    rule: &'static str,
    pub pending_index: Option<usize>,
    pub question: Option<Question>,
    pub proposition: Option<Proposition>,
    pub plan: Option<Plan>,
    pub action: Option<Action>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pending(mut self, index: usize) -> Self {
        self.pending_index = Some(index);
        self
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.question = Some(question);
        self
    }

    pub fn with_proposition(mut self, proposition: Proposition) -> Self {
        self.proposition = Some(proposition);
        self
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Records which rule matched, for error reporting.
    pub(crate) fn matched_by(mut self, rule: &'static str) -> Self {
        self.rule = rule;
        self
    }

    pub fn pending(&self) -> Result<usize, EngineError> {
        self.pending_index.ok_or_else(|| self.missing("pending_index"))
    }

    pub fn question(&self) -> Result<&Question, EngineError> {
        self.question.as_ref().ok_or_else(|| self.missing("question"))
    }

    pub fn proposition(&self) -> Result<&Proposition, EngineError> {
        self.proposition.as_ref().ok_or_else(|| self.missing("proposition"))
    }

    pub fn plan(&self) -> Result<&Plan, EngineError> {
        self.plan.as_ref().ok_or_else(|| self.missing("plan"))
    }

    pub fn action(&self) -> Result<&Action, EngineError> {
        self.action.as_ref().ok_or_else(|| self.missing("action"))
    }

    pub(crate) fn missing(&self, binding: &'static str) -> EngineError {
        EngineError::MissingBinding {
            rule: self.rule,
            binding,
        }
    }
}
