//! Sequential command pipeline
//!
//! A [`CommandQueue`] is an explicit list of browser steps executed strictly
//! in order. Step N+1 starts only after step N has resolved; the first
//! failing step aborts the queue.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use super::{Browser, BrowserError, LocatorChain, TextPattern, POLL_INTERVAL};

/// Join a path onto a base URL; absolute URLs and empty paths pass through
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.is_empty() {
        base.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Predicate over the current URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UrlCondition {
    Includes(String),
    Excludes(String),
}

impl UrlCondition {
    pub fn holds(&self, url: &str) -> bool {
        match self {
            UrlCondition::Includes(fragment) => url.contains(fragment.as_str()),
            UrlCondition::Excludes(fragment) => !url.contains(fragment.as_str()),
        }
    }
}

impl fmt::Display for UrlCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlCondition::Includes(fragment) => write!(f, "include '{fragment}'"),
            UrlCondition::Excludes(fragment) => write!(f, "not include '{fragment}'"),
        }
    }
}

/// One queued browser step
#[derive(Clone, Debug)]
pub enum Step {
    Visit(String),
    WaitForBody(Duration),
    Type { target: LocatorChain, text: String },
    Click(LocatorChain),
    WaitUrl {
        condition: UrlCondition,
        timeout: Duration,
    },
    AssertVisible(LocatorChain),
    AssertBodyContains(TextPattern),
    AssertBodyNotEmpty,
    AssertAttribute { target: LocatorChain, name: String },
    Pause(Duration),
    Log(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Visit(url) => write!(f, "visit {url}"),
            Step::WaitForBody(_) => write!(f, "wait for body"),
            // Typed text is omitted so passwords stay out of logs
            Step::Type { target, .. } => write!(f, "type into {}", target.name()),
            Step::Click(target) => write!(f, "click {}", target.name()),
            Step::WaitUrl { condition, .. } => write!(f, "wait for URL to {condition}"),
            Step::AssertVisible(target) => write!(f, "assert {} visible", target.name()),
            Step::AssertBodyContains(pattern) => write!(f, "assert body contains {pattern}"),
            Step::AssertBodyNotEmpty => write!(f, "assert body not empty"),
            Step::AssertAttribute { target, name } => {
                write!(f, "assert {} has attribute {name}", target.name())
            }
            Step::Pause(duration) => write!(f, "pause {}ms", duration.as_millis()),
            Step::Log(message) => write!(f, "log '{message}'"),
        }
    }
}

/// Failure of one step, with its position in the queue
#[derive(Error, Debug)]
#[error("step {index} ({step}) failed: {source}")]
pub struct QueueError {
    pub index: usize,
    pub step: String,
    #[source]
    pub source: BrowserError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueReport {
    pub steps_run: usize,
    pub final_url: String,
}

/// Ordered list of steps against one base URL
#[derive(Clone, Debug, Default)]
pub struct CommandQueue {
    base_url: String,
    steps: Vec<Step>,
}

impl CommandQueue {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            steps: Vec::new(),
        }
    }

    pub fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn visit(self, path: &str) -> Self {
        let url = join_url(&self.base_url, path);
        self.push(Step::Visit(url))
    }

    pub fn wait_for_body(self, timeout: Duration) -> Self {
        self.push(Step::WaitForBody(timeout))
    }

    pub fn type_into(self, target: LocatorChain, text: impl Into<String>) -> Self {
        self.push(Step::Type {
            target,
            text: text.into(),
        })
    }

    pub fn click(self, target: LocatorChain) -> Self {
        self.push(Step::Click(target))
    }

    pub fn wait_url(self, condition: UrlCondition, timeout: Duration) -> Self {
        self.push(Step::WaitUrl { condition, timeout })
    }

    pub fn assert_visible(self, target: LocatorChain) -> Self {
        self.push(Step::AssertVisible(target))
    }

    pub fn assert_body_contains(self, pattern: TextPattern) -> Self {
        self.push(Step::AssertBodyContains(pattern))
    }

    pub fn assert_body_not_empty(self) -> Self {
        self.push(Step::AssertBodyNotEmpty)
    }

    pub fn assert_attribute(self, target: LocatorChain, name: impl Into<String>) -> Self {
        self.push(Step::AssertAttribute {
            target,
            name: name.into(),
        })
    }

    pub fn pause(self, duration: Duration) -> Self {
        self.push(Step::Pause(duration))
    }

    pub fn log(self, message: impl Into<String>) -> Self {
        self.push(Step::Log(message.into()))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order
    pub async fn run<B: Browser>(&self, browser: &B) -> Result<QueueReport, QueueError> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!("step {}: {}", index, step);
            execute(browser, step).await.map_err(|source| QueueError {
                index,
                step: step.to_string(),
                source,
            })?;
        }

        let final_url = browser.current_url().await.map_err(|source| QueueError {
            index: self.steps.len(),
            step: "read current URL".to_string(),
            source,
        })?;

        Ok(QueueReport {
            steps_run: self.steps.len(),
            final_url,
        })
    }
}

async fn execute<B: Browser>(browser: &B, step: &Step) -> Result<(), BrowserError> {
    match step {
        Step::Visit(url) => browser.goto(url).await,
        Step::WaitForBody(timeout) => {
            LocatorChain::css("body")
                .allow_hidden()
                .timeout(*timeout)
                .resolve(browser)
                .await?;
            Ok(())
        }
        Step::Type { target, text } => {
            let element = target.resolve(browser).await?;
            browser.clear(&element).await?;
            browser.send_keys(&element, text).await
        }
        Step::Click(target) => {
            let element = target.resolve(browser).await?;
            browser.click(&element).await
        }
        Step::WaitUrl { condition, timeout } => wait_for_url(browser, condition, *timeout)
            .await
            .map(|_| ()),
        Step::AssertVisible(target) => target.resolve(browser).await.map(|_| ()),
        Step::AssertBodyContains(pattern) => {
            let body = browser.body_text().await?;
            if pattern.matches(&body) {
                Ok(())
            } else {
                Err(BrowserError::AssertionFailed(format!(
                    "body does not contain {pattern}"
                )))
            }
        }
        Step::AssertBodyNotEmpty => {
            if browser.body_text().await?.trim().is_empty() {
                Err(BrowserError::AssertionFailed("body is empty".to_string()))
            } else {
                Ok(())
            }
        }
        Step::AssertAttribute { target, name } => {
            let element = target.resolve(browser).await?;
            match browser.attribute(&element, name).await? {
                Some(_) => Ok(()),
                None => Err(BrowserError::AssertionFailed(format!(
                    "{} has no '{name}' attribute",
                    target.name()
                ))),
            }
        }
        Step::Pause(duration) => {
            sleep(*duration).await;
            Ok(())
        }
        Step::Log(message) => {
            info!("{}", message);
            Ok(())
        }
    }
}

/// Poll the current URL until the condition holds
pub async fn wait_for_url<B: Browser>(
    browser: &B,
    condition: &UrlCondition,
    timeout: Duration,
) -> Result<String, BrowserError> {
    let start = Instant::now();
    loop {
        let url = browser.current_url().await?;
        if condition.holds(&url) {
            return Ok(url);
        }
        if start.elapsed() >= timeout {
            return Err(BrowserError::NavigationTimeout {
                expectation: condition.to_string(),
                url,
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }
        sleep(POLL_INTERVAL.min(timeout)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::FakeDashboard;

    const ORIGIN: &str = "http://localhost:9000";

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(ORIGIN, "/"), "http://localhost:9000/");
        assert_eq!(
            join_url("http://localhost:9000/", "/dashboard/"),
            "http://localhost:9000/dashboard/"
        );
        assert_eq!(
            join_url(ORIGIN, "http://localhost:8000/graphql/"),
            "http://localhost:8000/graphql/"
        );
        assert_eq!(join_url("http://localhost:9000/dashboard/", ""), "http://localhost:9000/dashboard/");
    }

    #[test]
    fn test_url_condition() {
        let excludes = UrlCondition::Excludes("/login".into());
        assert!(excludes.holds("http://localhost:9000/dashboard/"));
        assert!(!excludes.holds("http://localhost:9000/dashboard/login/"));
        assert!(UrlCondition::Includes("product".into()).holds("/dashboard/products/"));
    }

    #[test]
    fn test_step_display_hides_typed_text() {
        let step = Step::Type {
            target: LocatorChain::css("input[name=\"password\"]"),
            text: "admin123".into(),
        };
        assert!(!step.to_string().contains("admin123"));
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let browser = FakeDashboard::new();
        let queue = CommandQueue::new(ORIGIN)
            .visit("/")
            .wait_for_body(Duration::from_millis(50))
            .type_into(LocatorChain::css("input[name=\"email\"]"), "admin@example.com")
            .type_into(LocatorChain::css("input[name=\"password\"]"), "admin123")
            .click(LocatorChain::css("button[type=\"submit\"]"))
            .wait_url(UrlCondition::Excludes("/login".into()), Duration::from_millis(100))
            .log("logged in");

        let report = queue.run(&browser).await.unwrap();
        assert_eq!(report.steps_run, 7);
        assert_eq!(report.final_url, "http://localhost:9000/dashboard/");
        assert_eq!(
            browser.visits(),
            vec!["http://localhost:9000/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_first_failure_aborts_queue() {
        let browser = FakeDashboard::new();
        let queue = CommandQueue::new(ORIGIN)
            .visit("/")
            .click(LocatorChain::css("button[data-test-id=\"nope\"]").timeout(Duration::from_millis(20)))
            .visit("/dashboard/orders/");

        let err = queue.run(&browser).await.unwrap_err();
        assert_eq!(err.index, 1);
        assert!(matches!(err.source, BrowserError::LocatorTimeout { .. }));
        assert_eq!(browser.visits().len(), 1);
    }

    #[tokio::test]
    async fn test_assertions() {
        let browser = FakeDashboard::new();
        let queue = CommandQueue::new(ORIGIN)
            .visit("/")
            .assert_body_not_empty()
            .assert_attribute(LocatorChain::css("input[name=\"email\"]"), "required")
            .assert_body_contains(TextPattern::literal("sign in"));
        assert!(queue.run(&browser).await.is_ok());

        let failing = CommandQueue::new(ORIGIN)
            .visit("/")
            .assert_body_contains(TextPattern::literal("Saleor Dashboard"));
        let err = failing.run(&browser).await.unwrap_err();
        assert!(matches!(err.source, BrowserError::AssertionFailed(_)));
    }
}
