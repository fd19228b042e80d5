//! Application layer - the Dialogue Move Engine.
//!
//! Drives a session turn by turn, calling the interpreter and generator at
//! the boundaries and the rule engine in between.

mod dialogue_move_engine;
mod errors;
mod outcome;

pub use dialogue_move_engine::DialogueMoveEngine;
pub use errors::{Stage, TurnError};
pub use outcome::{Diagnostic, TurnOutcome};
