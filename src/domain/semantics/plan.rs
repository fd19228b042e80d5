//! Dialogue plans: ordered subplans the system follows to resolve an issue
//! or carry out an action.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::{Action, Proposition, Question};

/// What a plan is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanGoal {
    /// Resolve an issue, e.g. `?x.price(x)`.
    Resolve(Question),
    /// Perform an action, e.g. `book_ticket`.
    Perform(Action),
}

impl PlanGoal {
    pub fn question(&self) -> Option<&Question> {
        match self {
            PlanGoal::Resolve(q) => Some(q),
            PlanGoal::Perform(_) => None,
        }
    }
}

impl fmt::Display for PlanGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanGoal::Resolve(q) => write!(f, "resolve({})", q),
            PlanGoal::Perform(a) => write!(f, "perform({})", a),
        }
    }
}

/// A single plan construct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subplan {
    /// Ask until the question is resolved.
    Findout(Question),
    /// Ask once, then move on whatever the reply.
    Raise(Question),
    /// Look the answer up in the domain database.
    Consult(Question),
    /// Carry out a device action.
    Execute(Action),
    /// Expand to `then` if `condition` is established, `otherwise` if not.
    If {
        condition: Proposition,
        then: Vec<Subplan>,
        otherwise: Vec<Subplan>,
    },
}

impl Subplan {
    /// The question a findout/raise step is waiting on.
    pub fn asks(&self) -> Option<&Question> {
        match self {
            Subplan::Findout(q) | Subplan::Raise(q) => Some(q),
            _ => None,
        }
    }
}

impl fmt::Display for Subplan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subplan::Findout(q) => write!(f, "findout({})", q),
            Subplan::Raise(q) => write!(f, "raise({})", q),
            Subplan::Consult(q) => write!(f, "consult({})", q),
            Subplan::Execute(a) => write!(f, "execute({})", a),
            Subplan::If { condition, .. } => write!(f, "if({}, ..)", condition),
        }
    }
}

/// A goal plus the subplans still to be carried out for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Plan {
    pub goal: PlanGoal,
    pub steps: VecDeque<Subplan>,
}

impl Plan {
    pub fn new(goal: PlanGoal, steps: impl IntoIterator<Item = Subplan>) -> Self {
        Self {
            goal,
            steps: steps.into_iter().collect(),
        }
    }

    /// The only step eligible for execution or removal.
    pub fn first_step(&self) -> Option<&Subplan> {
        self.steps.front()
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn without_first_step(mut self) -> Self {
        self.steps.pop_front();
        self
    }

    /// Replaces the first step with `expansion`, keeping order.
    pub fn expand_first_step(mut self, expansion: Vec<Subplan>) -> Self {
        self.steps.pop_front();
        for step in expansion.into_iter().rev() {
            self.steps.push_front(step);
        }
        self
    }

    /// Questions of every pending findout step, in plan order.
    pub fn findout_questions(&self) -> impl Iterator<Item = &Question> {
        self.steps.iter().filter_map(|step| match step {
            Subplan::Findout(q) => Some(q),
            _ => None,
        })
    }

    /// True if any pending step (including inside conditionals) mentions `question`.
    pub fn mentions(&self, question: &Question) -> bool {
        fn walk<'a>(steps: impl IntoIterator<Item = &'a Subplan>, question: &Question) -> bool {
            for step in steps {
                let found = match step {
                    Subplan::Findout(q) | Subplan::Raise(q) | Subplan::Consult(q) => q == question,
                    Subplan::Execute(_) => false,
                    Subplan::If { then, otherwise, .. } => {
                        walk(then, question) || walk(otherwise, question)
                    }
                };
                if found {
                    return true;
                }
            }
            false
        }
        walk(&self.steps, question)
    }
}
