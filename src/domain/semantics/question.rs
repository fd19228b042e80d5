//! Questions: wh-, yes/no- and alternative questions.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Proposition;
use crate::domain::foundation::ValidationError;

/// A question under discussion.
///
/// - `Wh`: `?x.price(x)`, answered by an individual of the given sort
/// - `YesNo`: `?visa_needed`, answered by yes/no or the (negated) proposition
/// - `Alternative`: `?{mode(plane), mode(train)}`, answered by picking one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    Wh {
        predicate: String,
        variable: String,
        sort: Option<String>,
    },
    YesNo(Proposition),
    Alternative(Vec<Proposition>),
}

impl Question {
    /// Creates `?x.predicate(x)` with no sort restriction.
    pub fn wh(predicate: impl Into<String>) -> Self {
        Question::Wh {
            predicate: predicate.into(),
            variable: "x".to_string(),
            sort: None,
        }
    }

    /// Creates `?x.predicate(x)` restricted to individuals of `sort`.
    pub fn wh_sorted(predicate: impl Into<String>, sort: impl Into<String>) -> Self {
        Question::Wh {
            predicate: predicate.into(),
            variable: "x".to_string(),
            sort: Some(sort.into()),
        }
    }

    pub fn yes_no(proposition: Proposition) -> Self {
        Question::YesNo(proposition)
    }

    pub fn alternative(options: Vec<Proposition>) -> Self {
        Question::Alternative(options)
    }

    /// The predicate a wh- or yes/no-question is about.
    pub fn predicate(&self) -> Option<&str> {
        match self {
            Question::Wh { predicate, .. } => Some(predicate),
            Question::YesNo(p) => Some(&p.predicate),
            Question::Alternative(_) => None,
        }
    }

    pub fn is_alternative(&self) -> bool {
        matches!(self, Question::Alternative(_))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Question::Wh {
                predicate,
                variable,
                ..
            } => {
                if predicate.trim().is_empty() {
                    return Err(ValidationError::empty_field("predicate"));
                }
                if variable.trim().is_empty() {
                    return Err(ValidationError::empty_field("variable"));
                }
                Ok(())
            }
            Question::YesNo(p) => p.validate(),
            Question::Alternative(options) => {
                if options.len() < 2 {
                    return Err(ValidationError::invalid_format(
                        "alternatives",
                        "needs at least two options",
                    ));
                }
                options.iter().try_for_each(Proposition::validate)
            }
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Question::Wh {
                predicate,
                variable,
                ..
            } => write!(f, "?{v}.{p}({v})", v = variable, p = predicate),
            Question::YesNo(p) => write!(f, "?{}", p),
            Question::Alternative(options) => {
                write!(f, "?{{")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", option)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_in_lambda_notation() {
        assert_eq!(Question::wh("price").to_string(), "?x.price(x)");
        assert_eq!(
            Question::yes_no(Proposition::nullary("visa_needed")).to_string(),
            "?visa_needed"
        );
        let alt = Question::alternative(vec![
            Proposition::new("dest_city", "paris"),
            Proposition::new("dept_city", "paris"),
        ]);
        assert_eq!(alt.to_string(), "?{dest_city(paris), dept_city(paris)}");
    }

    #[test]
    fn sort_participates_in_equality() {
        assert_ne!(Question::wh("dest_city"), Question::wh_sorted("dest_city", "city"));
    }

    #[test]
    fn predicate_is_absent_for_alternatives() {
        let alt = Question::alternative(vec![
            Proposition::new("a", "1"),
            Proposition::new("b", "1"),
        ]);
        assert_eq!(alt.predicate(), None);
        assert_eq!(Question::wh("price").predicate(), Some("price"));
    }

    #[test]
    fn single_option_alternative_is_invalid() {
        let alt = Question::alternative(vec![Proposition::new("a", "1")]);
        assert!(alt.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let q = Question::wh_sorted("dest_city", "city");
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }
}
