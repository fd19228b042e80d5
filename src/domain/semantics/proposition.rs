//! Propositions and the individuals they talk about.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// A domain individual, e.g. `paris` or `plane`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Individual(String);

impl Individual {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Individual {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An action the system can be asked to perform, e.g. `book_ticket`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Action {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An atomic proposition: a predicate, an optional argument, and a polarity.
///
/// `mode(plane)` is a positive unary proposition, `-visa_needed` a negative
/// nullary one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proposition {
    pub predicate: String,
    pub value: Option<Individual>,
    pub positive: bool,
}

impl Proposition {
    /// Creates a positive unary proposition `predicate(value)`.
    pub fn new(predicate: impl Into<String>, value: impl Into<Individual>) -> Self {
        Self {
            predicate: predicate.into(),
            value: Some(value.into()),
            positive: true,
        }
    }

    /// Creates a positive nullary proposition such as `visa_needed`.
    pub fn nullary(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            value: None,
            positive: true,
        }
    }

    /// The proposition reporting that `action` has been carried out.
    pub fn done(action: &Action) -> Self {
        Self::new("done", Individual::new(action.as_str()))
    }

    /// Returns the same proposition with flipped polarity.
    pub fn negated(&self) -> Self {
        Self {
            positive: !self.positive,
            ..self.clone()
        }
    }

    /// True if both propositions say something about the same predicate
    /// and argument, regardless of polarity.
    pub fn same_content(&self, other: &Proposition) -> bool {
        self.predicate == other.predicate && self.value == other.value
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.predicate.trim().is_empty() {
            return Err(ValidationError::empty_field("predicate"));
        }
        if let Some(value) = &self.value {
            if value.as_str().trim().is_empty() {
                return Err(ValidationError::empty_field("value"));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            write!(f, "-")?;
        }
        match &self.value {
            Some(value) => write!(f, "{}({})", self.predicate, value),
            None => write!(f, "{}", self.predicate),
        }
    }
}
