//! Dialogue moves and interactive communication management (ICM) feedback.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Action, Answer, Proposition, Question};
use crate::domain::foundation::ValidationError;

/// Who performed a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    User,
    System,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::User => write!(f, "usr"),
            Participant::System => write!(f, "sys"),
        }
    }
}

/// Grounding level an ICM move gives feedback on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcmLevel {
    Perception,
    Understanding,
    Acceptance,
}

/// Polarity of an ICM move: confirming, signalling failure, or checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Interrogative,
}

/// What an ICM move refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IcmContent {
    Proposition(Proposition),
    Issue(Question),
    Action(Action),
}

/// Explicit feedback about perception, understanding or acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Icm {
    pub level: IcmLevel,
    pub polarity: Polarity,
    pub content: Option<IcmContent>,
}

impl Icm {
    pub fn new(level: IcmLevel, polarity: Polarity) -> Self {
        Self {
            level,
            polarity,
            content: None,
        }
    }

    pub fn with_content(mut self, content: IcmContent) -> Self {
        self.content = Some(content);
        self
    }

    /// "Okay." after accepting `proposition`.
    pub fn accepted(proposition: Proposition) -> Self {
        Self::new(IcmLevel::Acceptance, Polarity::Positive)
            .with_content(IcmContent::Proposition(proposition))
    }

    /// "Sorry, I can't answer that." for an issue the system rejects.
    pub fn issue_rejected(question: Question) -> Self {
        Self::new(IcmLevel::Acceptance, Polarity::Negative).with_content(IcmContent::Issue(question))
    }

    /// "Sorry, I can't do that." for an unsupported request.
    pub fn action_rejected(action: Action) -> Self {
        Self::new(IcmLevel::Acceptance, Polarity::Negative).with_content(IcmContent::Action(action))
    }

    /// "I don't quite understand."
    pub fn not_understood() -> Self {
        Self::new(IcmLevel::Understanding, Polarity::Negative)
    }

    /// "Pardon?"
    pub fn not_perceived() -> Self {
        Self::new(IcmLevel::Perception, Polarity::Negative)
    }

    pub fn is_negative(&self) -> bool {
        self.polarity == Polarity::Negative
    }
}

impl fmt::Display for Icm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IcmLevel::Perception => "per",
            IcmLevel::Understanding => "und",
            IcmLevel::Acceptance => "acc",
        };
        let polarity = match self.polarity {
            Polarity::Positive => "pos",
            Polarity::Negative => "neg",
            Polarity::Interrogative => "int",
        };
        write!(f, "icm:{}*{}", level, polarity)?;
        match &self.content {
            Some(IcmContent::Proposition(p)) => write!(f, ":{}", p),
            Some(IcmContent::Issue(q)) => write!(f, ":issue({})", q),
            Some(IcmContent::Action(a)) => write!(f, ":action({})", a),
            None => Ok(()),
        }
    }
}

/// The communicative content of a move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Ask(Question),
    Answer(Answer),
    Request(Action),
    Assert(Proposition),
    Greet,
    Quit,
    Icm(Icm),
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Ask(q) => write!(f, "ask({})", q),
            MoveKind::Answer(a) => write!(f, "answer({})", a),
            MoveKind::Request(a) => write!(f, "request({})", a),
            MoveKind::Assert(p) => write!(f, "assert({})", p),
            MoveKind::Greet => write!(f, "greet"),
            MoveKind::Quit => write!(f, "quit"),
            MoveKind::Icm(icm) => write!(f, "{}", icm),
        }
    }
}

/// A move performed by a participant.
///
/// `score` is the interpreter's confidence in the move, in `[0, 1]`.
/// System moves always carry `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueMove {
    pub speaker: Participant,
    pub kind: MoveKind,
    pub score: f32,
}

impl DialogueMove {
    pub fn new(speaker: Participant, kind: MoveKind) -> Self {
        Self {
            speaker,
            kind,
            score: 1.0,
        }
    }

    pub fn user(kind: MoveKind) -> Self {
        Self::new(Participant::User, kind)
    }

    pub fn system(kind: MoveKind) -> Self {
        Self::new(Participant::System, kind)
    }

    /// Sets the interpretation confidence.
    pub fn with_score(mut self, score: f32) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(ValidationError::out_of_range("score", 0.0, 1.0, score));
        }
        self.score = score;
        Ok(self)
    }

    pub fn is_from(&self, speaker: Participant) -> bool {
        self.speaker == speaker
    }

    /// True for moves that put a question on the table.
    pub fn raises_question(&self) -> bool {
        matches!(self.kind, MoveKind::Ask(_))
    }

    /// The answer carried by an answer move.
    ///
    /// Assertions count as propositional answers.
    pub fn as_answer(&self) -> Option<Answer> {
        match &self.kind {
            MoveKind::Answer(a) => Some(a.clone()),
            MoveKind::Assert(p) => Some(Answer::proposition(p.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for DialogueMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.speaker, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_speaker_prefix() {
        let m = DialogueMove::user(MoveKind::Ask(Question::wh("price")));
        assert_eq!(m.to_string(), "usr:ask(?x.price(x))");
    }

    #[test]
    fn icm_display_includes_content() {
        let icm = Icm::accepted(Proposition::new("mode", "plane"));
        assert_eq!(icm.to_string(), "icm:acc*pos:mode(plane)");
        assert_eq!(Icm::not_understood().to_string(), "icm:und*neg");
    }

    #[test]
    fn score_outside_unit_interval_is_rejected() {
        let m = DialogueMove::user(MoveKind::Greet);
        assert!(m.clone().with_score(1.2).is_err());
        assert!(m.clone().with_score(-0.1).is_err());
        assert_eq!(m.with_score(0.3).unwrap().score, 0.3);
    }

    #[test]
    fn assert_counts_as_propositional_answer() {
        let p = Proposition::new("dest_city", "paris");
        let m = DialogueMove::user(MoveKind::Assert(p.clone()));
        assert_eq!(m.as_answer(), Some(Answer::proposition(p)));
        assert!(DialogueMove::user(MoveKind::Greet).as_answer().is_none());
    }

    #[test]
    fn only_ask_raises_a_question() {
        assert!(DialogueMove::system(MoveKind::Ask(Question::wh("x"))).raises_question());
        assert!(!DialogueMove::system(MoveKind::Icm(Icm::not_perceived())).raises_question());
    }
}
