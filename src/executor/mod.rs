//! Scenario execution engine
//!
//! Serial runner with retry budget, exception draining and failure screenshots.

mod runner;

pub use runner::{ScenarioFilter, ScenarioRunner};
