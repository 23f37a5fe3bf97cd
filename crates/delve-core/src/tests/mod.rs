//! Scenario tests for the full combat tick.
//!
//! - **Determinism tests**: same seed and inputs give the same events
//! - **Integration tests**: AI, collision, projectiles and the resolver together
//! - **Helper functions**: simulation setup and scene recording
//!
//! # Test Structure
//!
//! - `determinism.rs`: Replays and property checks
//! - `integration.rs`: End-to-end fights
//! - `helpers.rs`: Test setup utilities and factory functions

mod determinism;
mod helpers;

// Re-export for convenience
pub use helpers::*;
