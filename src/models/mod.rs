//! Data models
//!
//! Scenario identifiers, results and run summaries.

mod result;
mod scenario;

pub use result::{RunSummary, ScenarioResult, ScenarioStatus};
pub use scenario::{Scenario, Suite};
