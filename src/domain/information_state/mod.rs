//! Information state module.
//!
//! The mutable store the update rules read and replace: private fields
//! (agenda, plan stack, issues, beliefs, pending moves) and shared fields
//! (QUD, commitments, latest utterance, previous system moves).

mod open_stack;
mod snapshot;
mod state;

pub use open_stack::{OpenStack, OrderedSet};
pub use snapshot::StateSnapshot;
pub use state::{
    AgendaAction, InformationState, PendingMove, PrivateState, SharedState, Utterance,
};
