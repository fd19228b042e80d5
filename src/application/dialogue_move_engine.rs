//! Dialogue Move Engine - runs one session turn by turn.
//!
//! A turn goes through four stages:
//!
//! 1. INTERPRET: the interpreter maps the utterance to moves
//! 2. INTEGRATE: grounding setup, then integrate/accommodate/downdate until quiet
//! 3. SELECT: load plan, execute plan, then select action/ICM/move until quiet
//! 4. GENERATE: the generator realizes the selected moves, which are then
//!    integrated as the system's own utterance
//!
//! All rule work happens on a copy of the information state. The copy
//! replaces the session state only when every stage succeeded, so a failed
//! turn leaves the session exactly as it was.

use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, warn};

use super::errors::{Stage, Transient, TurnError};
use super::outcome::{Diagnostic, TurnOutcome};
use crate::config::{AppConfig, InterfaceConfig};
use crate::domain::foundation::{SessionId, SessionStatus, StateMachine, Timestamp};
use crate::domain::information_state::{InformationState, StateSnapshot};
use crate::domain::rules::{EngineError, Phase, RuleContext, RuleEngine, RuleSet, UpdatePolicy};
use crate::domain::semantics::{DialogueMove, Icm, MoveKind, Participant};
use crate::domain::update::standard_rule_set;
use crate::ports::{DomainResource, Generator, InterpretationFailure, Interpreter};

const DEFAULT_MAX_RULE_ITERATIONS: usize = 500;

/// Orchestrates one dialogue session.
pub struct DialogueMoveEngine {
    session_id: SessionId,
    status: SessionStatus,
    started_at: Timestamp,
    last_turn_at: Option<Timestamp>,
    state: InformationState,
    domain: Arc<dyn DomainResource>,
    interpreter: Arc<dyn Interpreter>,
    generator: Arc<dyn Generator>,
    engine: RuleEngine,
    policy: UpdatePolicy,
    interface: InterfaceConfig,
}

impl DialogueMoveEngine {
    /// Creates a session with the standard rule library and default limits.
    pub fn new(
        domain: Arc<dyn DomainResource>,
        interpreter: Arc<dyn Interpreter>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            status: SessionStatus::default(),
            started_at: Timestamp::now(),
            last_turn_at: None,
            state: InformationState::new(),
            domain,
            interpreter,
            generator,
            engine: RuleEngine::new(standard_rule_set(), DEFAULT_MAX_RULE_ITERATIONS),
            policy: UpdatePolicy::default(),
            interface: InterfaceConfig::default(),
        }
    }

    /// Applies engine limits, update policy and boundary timeouts from `config`.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.engine = RuleEngine::new(
            self.engine.rules().clone(),
            config.engine.max_rule_iterations,
        );
        self.policy = config.engine.update_policy();
        self.interface = config.interface.clone();
        self
    }

    /// Replaces the rule library.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.engine = RuleEngine::new(rules, self.engine.max_iterations());
        self
    }

    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resumes from a saved snapshot.
    pub fn with_snapshot(mut self, snapshot: StateSnapshot) -> Self {
        self.state = InformationState::from_snapshot(snapshot);
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// When the last turn that changed the state completed.
    pub fn last_turn_at(&self) -> Option<Timestamp> {
        self.last_turn_at
    }

    pub fn state(&self) -> &InformationState {
        &self.state
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Swaps in a different domain resource. Takes effect from the next turn.
    pub fn load_plan_library(&mut self, domain: Arc<dyn DomainResource>) {
        info!(session_id = %self.session_id, "Plan library loaded");
        self.domain = domain;
    }

    /// Processes one utterance and returns the system's reply, if any.
    pub async fn process_turn(
        &mut self,
        utterance: &str,
        speaker: Participant,
    ) -> Result<Option<String>, TurnError> {
        Ok(self.run_turn(utterance, speaker).await?.response)
    }

    /// Processes one utterance and reports everything the turn did.
    pub async fn run_turn(
        &mut self,
        utterance: &str,
        speaker: Participant,
    ) -> Result<TurnOutcome, TurnError> {
        if !self.status.accepts_turns() {
            warn!(session_id = %self.session_id, "Turn rejected: session closed");
            return Err(TurnError::SessionClosed);
        }
        info!(session_id = %self.session_id, speaker = %speaker, "Turn started");
        let turn_started = Timestamp::now();

        let interpreted = self
            .call_with_retries(Stage::Interpret, || {
                self.interpreter.interpret(utterance, speaker, &self.state)
            })
            .await;
        let input = match interpreted {
            Ok(moves) => moves,
            Err(TurnError::Interpretation(failure @ InterpretationFailure::NotUnderstood { .. })) => {
                return self.reprompt(utterance, failure).await;
            }
            Err(err) => return Err(err),
        };

        let ctx = RuleContext::new(self.domain.as_ref(), &self.policy);
        let mut fired = Vec::new();
        let mut diagnostics = Vec::new();

        let state = self.state.clone().with_utterance(speaker, input.clone());
        let mut state = self.integrate(state, &ctx, &mut fired)?;
        if !state.pending().is_empty() {
            state = state.with_attempts_recorded();
            for pending in state.pending() {
                warn!(
                    session_id = %self.session_id,
                    dialogue_move = %pending.dialogue_move,
                    attempts = pending.attempts,
                    "Move could not be integrated"
                );
                diagnostics.push(Diagnostic::IntegrationFailure {
                    dialogue_move: pending.dialogue_move.clone(),
                    attempts: pending.attempts,
                });
            }
        }

        let state = self.select(state, &ctx, &mut fired)?;
        let (state, output) = state.take_next_moves();
        let response = self.realize(&output).await?;
        let state = if output.is_empty() {
            state
        } else {
            let state = state.with_utterance(Participant::System, output.clone());
            self.integrate(state, &ctx, &mut fired)?
        };

        let closed = input
            .iter()
            .chain(&output)
            .any(|m| matches!(m.kind, MoveKind::Quit));
        self.state = state;
        self.advance_status(closed);
        let finished = Timestamp::now();
        self.last_turn_at = Some(finished);

        info!(
            session_id = %self.session_id,
            speaker = %speaker,
            moves_in = input.len(),
            moves_out = output.len(),
            rules_fired = fired.len(),
            status = %self.status,
            elapsed_ms = finished.duration_since(&turn_started).num_milliseconds(),
            "Turn completed"
        );

        Ok(TurnOutcome {
            response,
            moves: output,
            fired,
            diagnostics,
        })
    }

    /// Grounding setup followed by the update cycle.
    fn integrate(
        &self,
        state: InformationState,
        ctx: &RuleContext<'_>,
        fired: &mut Vec<&'static str>,
    ) -> Result<InformationState, EngineError> {
        let grounded = self.engine.apply_phase(Phase::GroundingSetup, state, ctx)?;
        fired.extend(grounded.fired);
        let updated = self.engine.apply_cycle(&Phase::UPDATE, grounded.state, ctx)?;
        fired.extend(updated.fired);
        Ok(updated.state)
    }

    /// Plan loading and execution followed by the selection cycle.
    fn select(
        &self,
        state: InformationState,
        ctx: &RuleContext<'_>,
        fired: &mut Vec<&'static str>,
    ) -> Result<InformationState, EngineError> {
        let mut state = state;
        for phase in [Phase::LoadPlan, Phase::ExecPlan] {
            let outcome = self.engine.apply_phase(phase, state, ctx)?;
            fired.extend(outcome.fired);
            state = outcome.state;
        }
        let selected = self.engine.apply_cycle(&Phase::SELECT, state, ctx)?;
        fired.extend(selected.fired);
        Ok(selected.state)
    }

    /// Realizes `moves` as one response; `None` when there is nothing to say.
    async fn realize(&self, moves: &[DialogueMove]) -> Result<Option<String>, TurnError> {
        if moves.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(moves.len());
        for dialogue_move in moves {
            let text = self
                .call_with_retries(Stage::Generate, || self.generator.generate(dialogue_move))
                .await?;
            parts.push(text);
        }
        Ok(Some(parts.join(" ")))
    }

    /// Abandons the turn after an interpretation failure with a generic
    /// reprompt. Nothing is integrated.
    async fn reprompt(
        &self,
        utterance: &str,
        failure: InterpretationFailure,
    ) -> Result<TurnOutcome, TurnError> {
        warn!(
            session_id = %self.session_id,
            error = %failure,
            "Utterance not understood, turn abandoned"
        );
        let feedback = DialogueMove::system(MoveKind::Icm(Icm::not_understood()));
        let response = self.realize(std::slice::from_ref(&feedback)).await?;
        Ok(TurnOutcome {
            response,
            moves: vec![feedback],
            fired: Vec::new(),
            diagnostics: vec![Diagnostic::InterpretationFailure {
                utterance: utterance.to_string(),
                reason: failure.to_string(),
            }],
        })
    }

    /// Runs a boundary call under the configured time limit, retrying
    /// transient failures and timeouts.
    async fn call_with_retries<T, E, F, Fut>(&self, stage: Stage, mut call: F) -> Result<T, TurnError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Transient + Into<TurnError> + std::fmt::Display,
    {
        let limit = self.interface.timeout();
        let mut attempt: u32 = 0;
        loop {
            let failure = match timeout(limit, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) if err.is_transient() => {
                    warn!(stage = %stage, attempt, error = %err, "Transient boundary failure");
                    err.into()
                }
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => {
                    warn!(stage = %stage, attempt, millis = self.interface.timeout_ms, "Boundary call timed out");
                    TurnError::Timeout {
                        stage,
                        millis: self.interface.timeout_ms,
                    }
                }
            };
            if attempt >= self.interface.max_retries {
                return Err(failure);
            }
            attempt += 1;
        }
    }

    fn advance_status(&mut self, closed: bool) {
        let target = if closed {
            SessionStatus::Closed
        } else {
            SessionStatus::Active
        };
        if self.status.can_transition_to(&target) {
            self.status = target;
        }
    }
}

impl std::fmt::Debug for DialogueMoveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueMoveEngine")
            .field("session_id", &self.session_id)
            .field("status", &self.status)
            .field("rules", &self.engine.rules().len())
            .field("policy", &self.policy)
            .finish()
    }
}
