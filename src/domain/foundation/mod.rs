//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, lifecycle enums and error types
//! used throughout the dialogue manager.

mod errors;
mod ids;
mod session_status;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::SessionId;
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
