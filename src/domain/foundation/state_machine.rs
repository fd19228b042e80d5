//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating and performing state
//! transitions on lifecycle enums such as [`super::SessionStatus`].

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SessionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Ready, Active) | (Active, Closed))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Ready => vec![Active],
///             Active => vec![Closed],
///             Closed => vec![],
///         }
///     }
/// }
///
/// let status = SessionStatus::Ready.transition_to(SessionStatus::Active)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TurnStage {
        Interpret,
        Integrate,
        Select,
        Generate,
    }

    impl StateMachine for TurnStage {
        fn can_transition_to(&self, target: &Self) -> bool {
            use TurnStage::*;
            matches!(
                (self, target),
                (Interpret, Integrate) | (Integrate, Select) | (Select, Generate)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use TurnStage::*;
            match self {
                Interpret => vec![Integrate],
                Integrate => vec![Select],
                Select => vec![Generate],
                Generate => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        let result = TurnStage::Interpret.transition_to(TurnStage::Integrate);
        assert_eq!(result, Ok(TurnStage::Integrate));
    }

    #[test]
    fn transition_to_fails_for_skipped_stage() {
        let result = TurnStage::Interpret.transition_to(TurnStage::Select);
        assert!(result.is_err());
    }

    #[test]
    fn is_terminal_only_for_last_stage() {
        assert!(TurnStage::Generate.is_terminal());
        assert!(!TurnStage::Interpret.is_terminal());
        assert!(!TurnStage::Select.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for stage in [
            TurnStage::Interpret,
            TurnStage::Integrate,
            TurnStage::Select,
            TurnStage::Generate,
        ] {
            for target in stage.valid_transitions() {
                assert!(
                    stage.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    stage,
                    target
                );
            }
        }
    }
}
