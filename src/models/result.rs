//! Scenario result models
//!
//! Status of each scenario and the summary of a whole run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Scenario;

/// Scenario execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

impl ScenarioStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ScenarioStatus::Pass => "✓",
            ScenarioStatus::Fail => "✗",
            ScenarioStatus::Skip => "○",
            ScenarioStatus::Error => "!",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScenarioStatus::Pass)
    }
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioStatus::Pass => write!(f, "PASS"),
            ScenarioStatus::Fail => write!(f, "FAIL"),
            ScenarioStatus::Skip => write!(f, "SKIP"),
            ScenarioStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Result of one scenario, after retries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub attempts: u32,
    pub message: Option<String>,
    /// Uncaught exceptions that matched a benign pattern
    #[serde(default)]
    pub suppressed_exceptions: Vec<String>,
    pub screenshot: Option<String>,
}

impl ScenarioResult {
    fn new(scenario: Scenario, status: ScenarioStatus, duration_ms: u64) -> Self {
        Self {
            scenario,
            status,
            duration_ms,
            attempts: 1,
            message: None,
            suppressed_exceptions: Vec::new(),
            screenshot: None,
        }
    }

    pub fn pass(scenario: Scenario, duration_ms: u64) -> Self {
        Self::new(scenario, ScenarioStatus::Pass, duration_ms)
    }

    pub fn fail(scenario: Scenario, duration_ms: u64, message: impl Into<String>) -> Self {
        Self::new(scenario, ScenarioStatus::Fail, duration_ms).with_message(message)
    }

    pub fn skip(scenario: Scenario, reason: impl Into<String>) -> Self {
        Self::new(scenario, ScenarioStatus::Skip, 0).with_message(reason)
    }

    pub fn error(scenario: Scenario, duration_ms: u64, error: impl Into<String>) -> Self {
        Self::new(scenario, ScenarioStatus::Error, duration_ms).with_message(error)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_suppressed(mut self, messages: Vec<String>) -> Self {
        self.suppressed_exceptions = messages;
        self
    }

    pub fn with_screenshot(mut self, path: impl Into<String>) -> Self {
        self.screenshot = Some(path.into());
        self
    }
}

impl fmt::Display for ScenarioResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.status.symbol(),
            self.scenario,
            self.duration_ms
        )?;
        if self.attempts > 1 {
            write!(f, " (attempt {})", self.attempts)?;
        }
        if let Some(msg) = &self.message {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

/// Summary of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl RunSummary {
    pub fn new(
        run_id: impl Into<String>,
        base_url: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<ScenarioResult>,
    ) -> Self {
        let count = |status: ScenarioStatus| results.iter().filter(|r| r.status == status).count();
        let passed = results.iter().filter(|r| r.status.is_success()).count();
        let failed = count(ScenarioStatus::Fail);
        let skipped = count(ScenarioStatus::Skip);
        let errors = count(ScenarioStatus::Error);
        let total_duration_ms = results.iter().map(|r| r.duration_ms).sum();

        Self {
            run_id: run_id.into(),
            base_url: base_url.into(),
            started_at,
            completed_at: Utc::now(),
            total: results.len(),
            passed,
            failed,
            skipped,
            errors,
            total_duration_ms,
            results,
        }
    }

    /// Pass rate over scenarios that actually ran
    pub fn pass_rate(&self) -> f64 {
        let ran = self.total - self.skipped;
        if ran == 0 {
            0.0
        } else {
            (self.passed as f64 / ran as f64) * 100.0
        }
    }

    /// No failures or errors (skips are fine)
    pub fn is_green(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} - {}", self.run_id, self.base_url)?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}",
            self.total, self.passed, self.failed, self.skipped, self.errors
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
