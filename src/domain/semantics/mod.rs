//! Semantic data model.
//!
//! The vocabulary the update rules manipulate: questions, answers,
//! propositions, dialogue moves and plans. All values are immutable and
//! compared structurally.

mod answer;
mod dialogue_move;
mod plan;
mod proposition;
mod question;

pub use answer::{Answer, AnswerContent};
pub use dialogue_move::{
    DialogueMove, Icm, IcmContent, IcmLevel, MoveKind, Participant, Polarity,
};
pub use plan::{Plan, PlanGoal, Subplan};
pub use proposition::{Action, Individual, Proposition};
pub use question::Question;
