//! Adapters - Implementations of port interfaces.
//!
//! - `static_domain` - In-memory domain resource (sorts, plans, consult table)
//! - `template_generator` - Template-based natural-language generation

mod static_domain;
mod template_generator;

pub use static_domain::{StaticDomain, StaticDomainBuilder};
pub use template_generator::TemplateGenerator;
