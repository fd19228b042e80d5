//! Dialogue Manager - Issue-based dialogue management
//!
//! This crate tracks a task-oriented conversation as an information state
//! (questions under discussion, issues, plans, commitments) and updates it
//! with prioritized, phase-tagged update rules. Understanding and generation
//! are external collaborators reached through ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
