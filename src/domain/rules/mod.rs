//! Rule engine module.
//!
//! Update rules are plain data: a name, a phase, a priority and a
//! precondition/effect pair. The engine fires them one at a time until a
//! phase is quiet.

mod engine;
mod errors;
mod phase;
mod policy;
mod rule;

pub use engine::{PhaseOutcome, RuleEngine, RuleSet};
pub use errors::EngineError;
pub use phase::Phase;
pub use policy::{UnresolvedPolicy, UpdatePolicy};
pub use rule::{Bindings, Effect, Precondition, RuleContext, UpdateRule};
