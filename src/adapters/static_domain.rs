//! In-memory domain resource.
//!
//! Holds everything a small application needs to describe itself: which
//! sort each predicate ranges over, the individuals of each sort, the plan
//! library, explicit question dependencies, default questions, a lookup
//! table for `consult` steps, and the actions the device can perform.
//!
//! # Example
//!
//! ```ignore
//! let domain = StaticDomain::builder()
//!     .predicate("mode", "means")
//!     .individuals("means", ["plane", "train"])
//!     .plan(price_plan)
//!     .database_entry(price_question, vec![Proposition::new("mode", "train")],
//!         Proposition::new("price", "200"))
//!     .build()?;
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::foundation::ValidationError;
use crate::domain::semantics::{
    Action, AnswerContent, Individual, Plan, PlanGoal, Proposition, Question, Subplan,
};
use crate::ports::{DomainResource, DomainResourceError};

/// A row of the consult table: `answer` holds when every condition is established.
#[derive(Debug, Clone, PartialEq)]
struct DatabaseEntry {
    question: Question,
    conditions: Vec<Proposition>,
    answer: Proposition,
}

/// Domain resource backed by in-memory tables. Immutable once built.
#[derive(Debug, Clone)]
pub struct StaticDomain {
    sorts: HashMap<String, String>,
    individuals: HashMap<String, BTreeSet<Individual>>,
    plans: Vec<Plan>,
    dependencies: Vec<(Question, Question)>,
    default_questions: HashSet<Question>,
    database: Vec<DatabaseEntry>,
    actions: HashSet<Action>,
}

impl StaticDomain {
    pub fn builder() -> StaticDomainBuilder {
        StaticDomainBuilder::default()
    }

    /// The sort a wh-question ranges over: its own restriction, else the
    /// sort registered for its predicate.
    fn sort_of<'a>(&'a self, question: &'a Question) -> Option<&'a str> {
        match question {
            Question::Wh {
                sort: Some(sort), ..
            } => Some(sort.as_str()),
            Question::Wh { predicate, .. } => self.sorts.get(predicate).map(String::as_str),
            _ => None,
        }
    }

    fn has_individual(&self, sort: &str, value: &Individual) -> bool {
        self.individuals
            .get(sort)
            .is_some_and(|members| members.contains(value))
    }

    /// The single option of an alternative question whose argument is `value`.
    fn option_for<'a>(options: &'a [Proposition], value: &Individual) -> Option<&'a Proposition> {
        let mut matching = options.iter().filter(|p| p.value.as_ref() == Some(value));
        match (matching.next(), matching.next()) {
            (Some(option), None) => Some(option),
            _ => None,
        }
    }

    fn plan_questions(&self) -> impl Iterator<Item = &Question> {
        self.plans.iter().flat_map(|plan| {
            plan.goal.question().into_iter().chain(plan.steps.iter().filter_map(
                |step| match step {
                    Subplan::Findout(q) | Subplan::Raise(q) | Subplan::Consult(q) => Some(q),
                    _ => None,
                },
            ))
        })
    }
}

impl DomainResource for StaticDomain {
    fn relevant(
        &self,
        content: &AnswerContent,
        question: &Question,
    ) -> Result<bool, DomainResourceError> {
        Ok(match (question, content) {
            (Question::Wh { predicate, .. }, AnswerContent::Proposition(p)) => {
                &p.predicate == predicate
            }
            (Question::Wh { .. }, AnswerContent::Value(value)) => self
                .sort_of(question)
                .is_some_and(|sort| self.has_individual(sort, value)),
            (Question::Wh { .. }, AnswerContent::Yes | AnswerContent::No) => false,
            (Question::YesNo(_), AnswerContent::Yes | AnswerContent::No) => true,
            (Question::YesNo(asked), AnswerContent::Proposition(p)) => p.same_content(asked),
            (Question::YesNo(asked), AnswerContent::Value(value)) => {
                asked.value.as_ref() == Some(value)
            }
            (Question::Alternative(options), AnswerContent::Proposition(p)) => {
                options.contains(p)
            }
            (Question::Alternative(options), AnswerContent::Value(value)) => {
                Self::option_for(options, value).is_some()
            }
            (Question::Alternative(_), AnswerContent::Yes | AnswerContent::No) => false,
        })
    }

    fn resolves(
        &self,
        proposition: &Proposition,
        question: &Question,
    ) -> Result<bool, DomainResourceError> {
        Ok(match question {
            Question::Wh { predicate, .. } => {
                proposition.positive
                    && &proposition.predicate == predicate
                    && proposition.value.is_some()
            }
            Question::YesNo(asked) => proposition.same_content(asked),
            Question::Alternative(options) => options.contains(proposition),
        })
    }

    fn combine(
        &self,
        question: &Question,
        answer: &AnswerContent,
    ) -> Result<Proposition, DomainResourceError> {
        if !self.relevant(answer, question)? {
            return Err(DomainResourceError::uncombinable(question, answer));
        }
        let combined = match (question, answer) {
            (_, AnswerContent::Proposition(p)) => Some(p.clone()),
            (Question::Wh { predicate, .. }, AnswerContent::Value(value)) => {
                Some(Proposition::new(predicate.clone(), value.clone()))
            }
            (Question::YesNo(asked), AnswerContent::Yes | AnswerContent::Value(_)) => {
                Some(asked.clone())
            }
            (Question::YesNo(asked), AnswerContent::No) => Some(asked.negated()),
            (Question::Alternative(options), AnswerContent::Value(value)) => {
                Self::option_for(options, value).cloned()
            }
            _ => None,
        };
        combined.ok_or_else(|| DomainResourceError::uncombinable(question, answer))
    }

    fn depends(
        &self,
        dependent: &Question,
        prerequisite: &Question,
    ) -> Result<bool, DomainResourceError> {
        if dependent == prerequisite {
            return Ok(false);
        }
        let explicit = self
            .dependencies
            .iter()
            .any(|(d, p)| d == dependent && p == prerequisite);
        let through_plan = self
            .plans
            .iter()
            .any(|plan| plan.goal.question() == Some(dependent) && plan.mentions(prerequisite));
        Ok(explicit || through_plan)
    }

    fn incompatible(
        &self,
        first: &Proposition,
        second: &Proposition,
    ) -> Result<bool, DomainResourceError> {
        if first.predicate != second.predicate {
            return Ok(false);
        }
        let rival_values = first.positive && second.positive && first.value != second.value;
        let contradiction = first.value == second.value && first.positive != second.positive;
        Ok(rival_values || contradiction)
    }

    /// Wh-questions are the same if they share a predicate, whatever their
    /// variable or sort restriction. Alternatives ignore option order.
    fn same_question(&self, first: &Question, second: &Question) -> bool {
        match (first, second) {
            (Question::Wh { predicate: a, .. }, Question::Wh { predicate: b, .. }) => a == b,
            (Question::YesNo(a), Question::YesNo(b)) => a.same_content(b),
            (Question::Alternative(a), Question::Alternative(b)) => {
                a.len() == b.len() && a.iter().all(|option| b.contains(option))
            }
            _ => false,
        }
    }

    fn plan(&self, goal: &PlanGoal) -> Result<Option<Plan>, DomainResourceError> {
        Ok(self.plans.iter().find(|plan| &plan.goal == goal).cloned())
    }

    fn plan_goals(&self) -> Result<Vec<PlanGoal>, DomainResourceError> {
        Ok(self.plans.iter().map(|plan| plan.goal.clone()).collect())
    }

    fn default_question(&self, question: &Question) -> Result<bool, DomainResourceError> {
        Ok(self.default_questions.contains(question))
    }

    fn question_for(
        &self,
        proposition: &Proposition,
    ) -> Result<Option<Question>, DomainResourceError> {
        let from_plans = self
            .plan_questions()
            .find(|q| q.predicate() == Some(proposition.predicate.as_str()))
            .cloned();
        Ok(from_plans.or_else(|| {
            self.sorts
                .contains_key(&proposition.predicate)
                .then(|| Question::wh(proposition.predicate.clone()))
        }))
    }

    fn consult(
        &self,
        question: &Question,
        facts: &[Proposition],
    ) -> Result<Proposition, DomainResourceError> {
        self.database
            .iter()
            .find(|entry| {
                &entry.question == question
                    && entry.conditions.iter().all(|c| facts.contains(c))
            })
            .map(|entry| entry.answer.clone())
            .ok_or_else(|| DomainResourceError::NoDatabaseEntry {
                question: question.to_string(),
            })
    }

    fn perform(
        &self,
        action: &Action,
        _facts: &[Proposition],
    ) -> Result<Proposition, DomainResourceError> {
        if self.actions.contains(action) {
            Ok(Proposition::done(action))
        } else {
            Err(DomainResourceError::UnsupportedAction {
                action: action.to_string(),
            })
        }
    }
}

/// Builder for [`StaticDomain`]. Entries are checked by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct StaticDomainBuilder {
    sorts: Vec<(String, String)>,
    individuals: Vec<(String, Individual)>,
    plans: Vec<Plan>,
    dependencies: Vec<(Question, Question)>,
    default_questions: Vec<Question>,
    database: Vec<DatabaseEntry>,
    actions: Vec<Action>,
}

impl StaticDomainBuilder {
    /// Declares that `predicate` takes individuals of `sort`.
    pub fn predicate(mut self, predicate: impl Into<String>, sort: impl Into<String>) -> Self {
        self.sorts.push((predicate.into(), sort.into()));
        self
    }

    pub fn individuals<I, V>(mut self, sort: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Individual>,
    {
        let sort = sort.into();
        self.individuals
            .extend(members.into_iter().map(|m| (sort.clone(), m.into())));
        self
    }

    pub fn plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    /// Declares that resolving `dependent` presupposes `prerequisite`.
    pub fn depends(mut self, dependent: Question, prerequisite: Question) -> Self {
        self.dependencies.push((dependent, prerequisite));
        self
    }

    pub fn default_question(mut self, question: Question) -> Self {
        self.default_questions.push(question);
        self
    }

    /// Adds a consult row. Rows are tried in insertion order.
    pub fn database_entry(
        mut self,
        question: Question,
        conditions: Vec<Proposition>,
        answer: Proposition,
    ) -> Self {
        self.database.push(DatabaseEntry {
            question,
            conditions,
            answer,
        });
        self
    }

    pub fn action(mut self, action: impl Into<Action>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn build(self) -> Result<StaticDomain, ValidationError> {
        let mut sorts = HashMap::new();
        for (predicate, sort) in self.sorts {
            if predicate.trim().is_empty() {
                return Err(ValidationError::empty_field("predicate"));
            }
            if sort.trim().is_empty() {
                return Err(ValidationError::empty_field("sort"));
            }
            sorts.insert(predicate, sort);
        }

        let mut individuals: HashMap<String, BTreeSet<Individual>> = HashMap::new();
        for (sort, individual) in self.individuals {
            if individual.as_str().trim().is_empty() {
                return Err(ValidationError::empty_field("individual"));
            }
            individuals.entry(sort).or_default().insert(individual);
        }

        let mut goals = HashSet::new();
        for plan in &self.plans {
            if let Some(question) = plan.goal.question() {
                question.validate()?;
            }
            if !goals.insert(plan.goal.clone()) {
                return Err(ValidationError::invalid_format(
                    "plans",
                    format!("more than one plan for {}", plan.goal),
                ));
            }
        }

        for (dependent, prerequisite) in &self.dependencies {
            if dependent == prerequisite {
                return Err(ValidationError::invalid_format(
                    "dependencies",
                    format!("{} cannot depend on itself", dependent),
                ));
            }
        }

        for entry in &self.database {
            entry.question.validate()?;
            entry.answer.validate()?;
            entry
                .conditions
                .iter()
                .try_for_each(Proposition::validate)?;
        }

        Ok(StaticDomain {
            sorts,
            individuals,
            plans: self.plans,
            dependencies: self.dependencies,
            default_questions: self.default_questions.into_iter().collect(),
            database: self.database,
            actions: self.actions.into_iter().collect(),
        })
    }
}
