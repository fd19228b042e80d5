//! Domain Resource Port - Application knowledge the update rules consult.
//!
//! Every method is a pure function of its arguments. Implementations must not
//! keep per-dialogue state: the same resource may serve many sessions.
//!
//! # Example
//!
//! ```ignore
//! let domain = StaticDomain::builder()
//!     .predicate("dest_city", "city")
//!     .individuals("city", ["paris", "london"])
//!     .plan(price_plan)
//!     .build()?;
//!
//! assert!(domain.relevant(&AnswerContent::Value("paris".into()), &Question::wh("dest_city"))?);
//! ```

use thiserror::Error;

use crate::domain::semantics::{Action, AnswerContent, Plan, PlanGoal, Proposition, Question};

/// Port for application-specific semantics and plans.
pub trait DomainResource: Send + Sync {
    /// True if `content` is about `question` (it need not resolve it).
    fn relevant(&self, content: &AnswerContent, question: &Question)
        -> Result<bool, DomainResourceError>;

    /// True if `proposition` settles `question`.
    fn resolves(&self, proposition: &Proposition, question: &Question)
        -> Result<bool, DomainResourceError>;

    /// Builds the proposition `answer` expresses as a reply to `question`.
    fn combine(&self, question: &Question, answer: &AnswerContent)
        -> Result<Proposition, DomainResourceError>;

    /// True if resolving `dependent` presupposes an answer to `prerequisite`.
    fn depends(&self, dependent: &Question, prerequisite: &Question)
        -> Result<bool, DomainResourceError>;

    /// True if `first` and `second` cannot both hold.
    fn incompatible(&self, first: &Proposition, second: &Proposition)
        -> Result<bool, DomainResourceError>;

    /// True if `first` and `second` ask the same thing. Raising a question
    /// onto QUD or the issue stack replaces every entry this holds for.
    fn same_question(&self, first: &Question, second: &Question) -> bool {
        first == second
    }

    /// The plan for `goal`, if the library has one.
    fn plan(&self, goal: &PlanGoal) -> Result<Option<Plan>, DomainResourceError>;

    /// Every goal the plan library covers, in library order.
    fn plan_goals(&self) -> Result<Vec<PlanGoal>, DomainResourceError>;

    /// True if `question` is the question a bare answer defaults to.
    fn default_question(&self, question: &Question) -> Result<bool, DomainResourceError>;

    /// The question `proposition` answers, if the domain knows it.
    fn question_for(&self, proposition: &Proposition)
        -> Result<Option<Question>, DomainResourceError>;

    /// Looks up the answer to `question` given the established `facts`.
    fn consult(&self, question: &Question, facts: &[Proposition])
        -> Result<Proposition, DomainResourceError>;

    /// Carries out `action` and returns the proposition reporting it.
    fn perform(&self, action: &Action, facts: &[Proposition])
        -> Result<Proposition, DomainResourceError>;
}

/// Errors raised by domain predicates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainResourceError {
    #[error("Cannot combine {question} with answer '{answer}'")]
    Uncombinable { question: String, answer: String },

    #[error("No database entry resolves {question}")]
    NoDatabaseEntry { question: String },

    #[error("Action not supported: {action}")]
    UnsupportedAction { action: String },

    #[error("Domain resource unavailable: {0}")]
    Unavailable(String),
}

impl DomainResourceError {
    pub fn uncombinable(question: &Question, answer: &AnswerContent) -> Self {
        DomainResourceError::Uncombinable {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}
