//! Scenario runner
//!
//! Runs scenarios one at a time against a single browser session. Each
//! attempt starts from a cleared session; uncaught page errors are drained
//! and classified after every attempt.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::artifacts::{generate_run_id, ScreenshotStore};
use crate::browser::Browser;
use crate::config::ScenarioProfile;
use crate::exceptions::{ExceptionFilter, ExceptionVerdict};
use crate::models::{RunSummary, Scenario, ScenarioResult, ScenarioStatus, Suite};
use crate::scenarios::{run_scenario, ScenarioContext, ScenarioError};
use crate::utils::timer::Timer;

/// Which scenarios to run
#[derive(Clone, Debug, Default)]
pub struct ScenarioFilter {
    pub suites: Vec<Suite>,
    pub numbers: Vec<u8>,
    pub skip: Vec<u8>,
}

impl ScenarioFilter {
    pub fn suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    pub fn number(mut self, number: u8) -> Self {
        self.numbers.push(number);
        self
    }

    pub fn skip(mut self, number: u8) -> Self {
        self.skip.push(number);
        self
    }

    pub fn from_profile(profile: &ScenarioProfile) -> Self {
        Self {
            suites: profile.suites.clone(),
            numbers: profile.scenarios.clone(),
            skip: Vec::new(),
        }
    }

    pub fn is_skipped(&self, scenario: Scenario) -> bool {
        self.skip.contains(&scenario.number())
    }

    /// Selected scenarios in catalogue order; no suites or numbers means all
    pub fn select(&self) -> Vec<Scenario> {
        let everything = self.suites.is_empty() && self.numbers.is_empty();
        Scenario::all()
            .into_iter()
            .filter(|s| {
                everything
                    || self.suites.contains(&s.suite())
                    || self.numbers.contains(&s.number())
            })
            .collect()
    }
}

/// How one attempt ended
struct Attempt {
    outcome: Result<(), ScenarioError>,
    suppressed: Vec<String>,
}

/// Serial scenario runner
pub struct ScenarioRunner<'a, B: Browser> {
    browser: &'a B,
    ctx: ScenarioContext,
    exceptions: ExceptionFilter,
    retry_budget: u32,
    screenshots: Option<ScreenshotStore>,
    run_id: String,
}

impl<'a, B: Browser> ScenarioRunner<'a, B> {
    pub fn new(browser: &'a B, ctx: ScenarioContext) -> Self {
        Self {
            browser,
            ctx,
            exceptions: ExceptionFilter::default(),
            retry_budget: 0,
            screenshots: None,
            run_id: generate_run_id(),
        }
    }

    pub fn exceptions(mut self, filter: ExceptionFilter) -> Self {
        self.exceptions = filter;
        self
    }

    /// Extra attempts after the first failure
    pub fn retries(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Save a screenshot when a scenario fails for good
    pub fn screenshots(mut self, store: ScreenshotStore) -> Self {
        self.screenshots = Some(store);
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    async fn attempt(&self, scenario: Scenario) -> Attempt {
        let outcome = match self.browser.reset_session(&self.ctx.base_url).await {
            Ok(()) => run_scenario(scenario, self.browser, &self.ctx).await,
            Err(e) => Err(e.into()),
        };

        let drained = match self.browser.drain_uncaught_errors().await {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Could not read uncaught page errors: {}", e);
                Vec::new()
            }
        };

        let mut suppressed = Vec::new();
        let mut propagated = None;
        for message in drained {
            match self.exceptions.classify(&message) {
                ExceptionVerdict::Suppress { pattern } => {
                    debug!("Ignoring uncaught exception ({}): {}", pattern, message);
                    suppressed.push(message);
                }
                ExceptionVerdict::Propagate => {
                    if propagated.is_none() {
                        propagated = Some(message);
                    }
                }
            }
        }

        let outcome = match (outcome, propagated) {
            (Err(ScenarioError::Skipped(reason)), _) => Err(ScenarioError::Skipped(reason)),
            (_, Some(message)) => Err(ScenarioError::Failed(format!(
                "Uncaught exception: {message}"
            ))),
            (outcome, None) => outcome,
        };

        Attempt {
            outcome,
            suppressed,
        }
    }

    /// Run one scenario, re-running it within the retry budget
    pub async fn run_one(&self, scenario: Scenario) -> ScenarioResult {
        let timer = Timer::start(scenario.to_string());
        let mut suppressed = Vec::new();
        let max_attempts = self.retry_budget + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let Attempt {
                outcome,
                suppressed: ignored,
            } = self.attempt(scenario).await;
            suppressed.extend(ignored);

            let err = match outcome {
                Ok(()) => {
                    return ScenarioResult::pass(scenario, timer.elapsed_ms())
                        .with_attempts(attempt)
                        .with_suppressed(suppressed);
                }
                Err(ScenarioError::Skipped(reason)) => {
                    info!("{} skipped: {}", scenario, reason);
                    return ScenarioResult::skip(scenario, reason)
                        .with_attempts(attempt)
                        .with_suppressed(suppressed);
                }
                Err(e) => e,
            };

            if attempt < max_attempts {
                warn!(
                    "{} attempt {}/{} failed: {}",
                    scenario, attempt, max_attempts, err
                );
                continue;
            }

            error!("{} failed: {}", scenario, err);
            let result = match err.status() {
                ScenarioStatus::Error => {
                    ScenarioResult::error(scenario, timer.elapsed_ms(), err.to_string())
                }
                _ => ScenarioResult::fail(scenario, timer.elapsed_ms(), err.to_string()),
            }
            .with_attempts(attempt)
            .with_suppressed(suppressed);
            return self.capture_failure(result, attempt).await;
        }
    }

    async fn capture_failure(&self, result: ScenarioResult, attempt: u32) -> ScenarioResult {
        let Some(store) = &self.screenshots else {
            return result;
        };
        let png = match self.browser.screenshot_png().await {
            Ok(png) => png,
            Err(e) => {
                warn!("Could not take screenshot: {}", e);
                return result;
            }
        };
        match store.save(&self.run_id, result.scenario, attempt, &png) {
            Ok(path) => result.with_screenshot(path.display().to_string()),
            Err(e) => {
                warn!("{:#}", e);
                result
            }
        }
    }

    /// Run the selected scenarios in catalogue order
    pub async fn run(&self, filter: &ScenarioFilter) -> RunSummary {
        let started_at = Utc::now();
        let scenarios = filter.select();
        info!(
            "Starting run {} against {} ({} scenarios, {} retries)",
            self.run_id,
            self.ctx.base_url,
            scenarios.len(),
            self.retry_budget
        );

        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let result = if filter.is_skipped(scenario) {
                ScenarioResult::skip(scenario, "Skipped by configuration")
            } else {
                self.run_one(scenario).await
            };
            info!("  {}", result);
            results.push(result);
        }

        let summary = RunSummary::new(&self.run_id, &self.ctx.base_url, started_at, results);
        info!(
            "Run {} completed in {}ms - Pass: {}/{} ({:.1}%)",
            summary.run_id,
            summary.total_duration_ms,
            summary.passed,
            summary.total,
            summary.pass_rate()
        );
        summary
    }
}
