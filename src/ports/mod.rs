//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! dialogue engine and the outside world. Adapters implement these ports.
//!
//! - `DomainResource` - Application semantics and plan library (synchronous, pure)
//! - `Interpreter` - Natural-language understanding (async, may be remote)
//! - `Generator` - Natural-language generation (async, may be remote)

mod domain_resource;
mod generator;
mod interpreter;

pub use domain_resource::{DomainResource, DomainResourceError};
pub use generator::{GenerationError, Generator};
pub use interpreter::{InterpretationFailure, Interpreter};
