//! Cross-module tests and shared test doubles.
//!
//! - `helpers.rs`: [`ScriptedHost`] and scenario builders
//! - `integration.rs`: full scenarios driven through [`Simulation`](crate::simulation::Simulation)
//! - `determinism.rs`: same seed and inputs give the same run

mod helpers;
mod integration;

pub use helpers::*;
