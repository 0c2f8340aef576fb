//! Run artifacts
//!
//! Stored run records, CSV export and failure screenshots.

mod screenshots;
mod storage;

pub use screenshots::ScreenshotStore;
pub use storage::{generate_run_id, EnvironmentInfo, ExportFormat, ResultsStore, RunInfo, StoredRun};
