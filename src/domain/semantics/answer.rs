//! Answers: full propositions or elliptical short answers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Individual, Proposition, Question};

/// What an answer says, before it is combined with a question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerContent {
    /// A full proposition, e.g. "I want to go to Paris" → `dest_city(paris)`.
    Proposition(Proposition),
    /// An elliptical answer, e.g. "Paris" → `paris`.
    Value(Individual),
    Yes,
    No,
}

impl fmt::Display for AnswerContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerContent::Proposition(p) => write!(f, "{}", p),
            AnswerContent::Value(v) => write!(f, "{}", v),
            AnswerContent::Yes => write!(f, "yes"),
            AnswerContent::No => write!(f, "no"),
        }
    }
}

/// An answer, optionally tied explicitly to the question it addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Answer {
    pub content: AnswerContent,
    pub question: Option<Question>,
}

impl Answer {
    pub fn proposition(proposition: Proposition) -> Self {
        Self {
            content: AnswerContent::Proposition(proposition),
            question: None,
        }
    }

    pub fn value(value: impl Into<Individual>) -> Self {
        Self {
            content: AnswerContent::Value(value.into()),
            question: None,
        }
    }

    pub fn yes() -> Self {
        Self {
            content: AnswerContent::Yes,
            question: None,
        }
    }

    pub fn no() -> Self {
        Self {
            content: AnswerContent::No,
            question: None,
        }
    }

    /// Ties the answer to an explicit question.
    pub fn to_question(mut self, question: Question) -> Self {
        self.question = Some(question);
        self
    }

    /// The proposition carried by a non-elliptical answer.
    pub fn as_proposition(&self) -> Option<&Proposition> {
        match &self.content {
            AnswerContent::Proposition(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_answer_has_no_proposition() {
        assert!(Answer::value("plane").as_proposition().is_none());
        assert!(Answer::yes().as_proposition().is_none());
    }

    #[test]
    fn explicit_question_is_kept() {
        let q = Question::wh("mode");
        let a = Answer::value("plane").to_question(q.clone());
        assert_eq!(a.question, Some(q));
    }

    #[test]
    fn displays_content() {
        assert_eq!(Answer::value("plane").to_string(), "plane");
        assert_eq!(
            Answer::proposition(Proposition::new("mode", "plane")).to_string(),
            "mode(plane)"
        );
        assert_eq!(Answer::no().to_string(), "no");
    }
}
