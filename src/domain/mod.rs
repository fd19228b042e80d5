//! Domain layer containing the dialogue model and update rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, session status, errors)
//! - `semantics` - Questions, answers, propositions, moves and plans
//! - `information_state` - The state the update rules read and replace
//! - `rules` - Update rules as data and the engine that fires them
//! - `update` - The rule library: integration, accommodation, downdate,
//!   plan execution and selection

pub mod foundation;
pub mod information_state;
pub mod rules;
pub mod semantics;
pub mod update;
