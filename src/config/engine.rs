//! Rule engine configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::rules::{UnresolvedPolicy, UpdatePolicy};

/// Rule engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum rule firings per phase before the turn is aborted
    #[serde(default = "default_max_rule_iterations")]
    pub max_rule_iterations: usize,

    /// User answers scored below this are checked before being committed
    #[serde(default = "default_understanding_threshold")]
    pub understanding_threshold: f32,

    /// What happens to moves no rule can integrate
    #[serde(default)]
    pub unresolved_policy: UnresolvedPolicyMode,

    /// Failed update cycles before a move is rejected (escalate mode only)
    #[serde(default = "default_escalate_after")]
    pub escalate_after: u32,
}

/// Flat, environment-friendly form of [`UnresolvedPolicy`].
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicyMode {
    Reprompt,
    #[default]
    Escalate,
}

impl EngineConfig {
    pub fn unresolved_policy(&self) -> UnresolvedPolicy {
        match self.unresolved_policy {
            UnresolvedPolicyMode::Reprompt => UnresolvedPolicy::Reprompt,
            UnresolvedPolicyMode::Escalate => UnresolvedPolicy::EscalateAfter {
                attempts: self.escalate_after,
            },
        }
    }

    /// The policy handed to the update rules.
    pub fn update_policy(&self) -> UpdatePolicy {
        UpdatePolicy {
            understanding_threshold: self.understanding_threshold,
            unresolved: self.unresolved_policy(),
        }
    }

    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_rule_iterations == 0 {
            return Err(ValidationError::InvalidIterationGuard);
        }
        if !(0.0..=1.0).contains(&self.understanding_threshold) {
            return Err(ValidationError::ThresholdOutOfRange(
                self.understanding_threshold,
            ));
        }
        if self.unresolved_policy == UnresolvedPolicyMode::Escalate && self.escalate_after == 0 {
            return Err(ValidationError::InvalidEscalationCount);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rule_iterations: default_max_rule_iterations(),
            understanding_threshold: default_understanding_threshold(),
            unresolved_policy: UnresolvedPolicyMode::default(),
            escalate_after: default_escalate_after(),
        }
    }
}

fn default_max_rule_iterations() -> usize {
    500
}

fn default_understanding_threshold() -> f32 {
    0.5
}

fn default_escalate_after() -> u32 {
    3
}
