//! Element lookup with fallback chains
//!
//! The dashboard markup is not ours, so every lookup is an ordered list of
//! strategies: the first strategy that yields a (visible) element wins.

use std::fmt;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::{Browser, BrowserError};

/// Delay between lookup attempts while polling
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Case-insensitive "contains any of" text match, e.g. `/sign|login|submit/i`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPattern {
    alternatives: Vec<String>,
}

impl TextPattern {
    pub fn any_of<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            alternatives: alternatives
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn literal(text: &str) -> Self {
        Self::any_of([text])
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.alternatives.iter().any(|alt| text.contains(alt.as_str()))
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/i", self.alternatives.join("|"))
    }
}

/// A single lookup strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    /// CSS match narrowed to elements whose text matches the pattern
    CssWithText { selector: String, pattern: TextPattern },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn css_with_text(selector: impl Into<String>, pattern: TextPattern) -> Self {
        Locator::CssWithText {
            selector: selector.into(),
            pattern,
        }
    }

    fn selector(&self) -> &str {
        match self {
            Locator::Css(selector) | Locator::CssWithText { selector, .. } => selector,
        }
    }

    /// First matching element, or `None`
    pub async fn find_first<B: Browser>(
        &self,
        browser: &B,
        require_visible: bool,
    ) -> Result<Option<B::Element>, BrowserError> {
        for element in browser.find_all(self.selector()).await? {
            if require_visible && !browser.is_displayed(&element).await? {
                continue;
            }
            if let Locator::CssWithText { pattern, .. } = self {
                if !pattern.matches(&browser.text(&element).await?) {
                    continue;
                }
            }
            return Ok(Some(element));
        }
        Ok(None)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "{selector}"),
            Locator::CssWithText { selector, pattern } => write!(f, "{selector} ~ {pattern}"),
        }
    }
}

/// Prioritized list of strategies with a polling timeout
#[derive(Clone, Debug)]
pub struct LocatorChain {
    name: String,
    strategies: Vec<Locator>,
    timeout: Duration,
    require_visible: bool,
}

impl LocatorChain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategies: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            require_visible: true,
        }
    }

    /// Chain with a single CSS strategy, named after the selector
    pub fn css(selector: &str) -> Self {
        Self::new(selector).then(Locator::css(selector))
    }

    pub fn then(mut self, locator: Locator) -> Self {
        self.strategies.push(locator);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept elements that are present but not displayed
    pub fn allow_hidden(mut self) -> Self {
        self.require_visible = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategies(&self) -> &[Locator] {
        &self.strategies
    }

    /// One pass over the strategies without waiting
    pub async fn try_once<B: Browser>(
        &self,
        browser: &B,
    ) -> Result<Option<B::Element>, BrowserError> {
        for (rank, locator) in self.strategies.iter().enumerate() {
            if let Some(element) = locator.find_first(browser, self.require_visible).await? {
                debug!("{} resolved by strategy {} ({})", self.name, rank, locator);
                return Ok(Some(element));
            }
        }
        Ok(None)
    }

    pub async fn is_present<B: Browser>(&self, browser: &B) -> Result<bool, BrowserError> {
        Ok(self.try_once(browser).await?.is_some())
    }

    /// Poll until a strategy matches or the timeout elapses
    pub async fn resolve<B: Browser>(&self, browser: &B) -> Result<B::Element, BrowserError> {
        let start = Instant::now();
        loop {
            if let Some(element) = self.try_once(browser).await? {
                return Ok(element);
            }
            if start.elapsed() >= self.timeout {
                return Err(BrowserError::LocatorTimeout {
                    locator: self.to_string(),
                    waited_ms: start.elapsed().as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL.min(self.timeout)).await;
        }
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategies: Vec<String> = self.strategies.iter().map(|l| l.to_string()).collect();
        write!(f, "{} [{}]", self.name, strategies.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDashboard, LoginMarkup};

    #[test]
    fn test_text_pattern() {
        let pattern = TextPattern::any_of(["sign", "login", "submit"]);
        assert!(pattern.matches("Sign in"));
        assert!(pattern.matches("LOGIN"));
        assert!(!pattern.matches("Forgot password?"));
        assert_eq!(pattern.to_string(), "/sign|login|submit/i");
    }

    #[tokio::test]
    async fn test_chain_falls_back_to_second_strategy() {
        let browser = FakeDashboard::new().with_markup(LoginMarkup::TypedInputsOnly);
        browser.goto("http://localhost:9000/").await.unwrap();

        let chain = LocatorChain::new("email input")
            .then(Locator::css("input[name=\"email\"]"))
            .then(Locator::css("input[type=\"email\"]"))
            .timeout(Duration::from_millis(50));

        let element = chain.resolve(&browser).await.unwrap();
        assert_eq!(
            browser.attribute(&element, "type").await.unwrap().as_deref(),
            Some("email")
        );
    }

    #[tokio::test]
    async fn test_text_strategy_skips_non_matching_buttons() {
        let browser = FakeDashboard::new();
        browser.goto("http://localhost:9000/").await.unwrap();

        let chain = LocatorChain::new("submit").then(Locator::css_with_text(
            "button",
            TextPattern::any_of(["sign", "login", "submit"]),
        ));
        let element = chain.resolve(&browser).await.unwrap();
        assert_eq!(browser.text(&element).await.unwrap(), "Sign in");
    }

    #[tokio::test]
    async fn test_chain_times_out() {
        let browser = FakeDashboard::new();
        browser.goto("http://localhost:9000/").await.unwrap();

        let chain = LocatorChain::css("[data-test-id=\"missing\"]")
            .timeout(Duration::from_millis(30));
        let err = chain.resolve(&browser).await.unwrap_err();
        match err {
            BrowserError::LocatorTimeout { locator, waited_ms } => {
                assert!(locator.contains("missing"));
                assert!(waited_ms >= 30);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_hidden_elements_need_allow_hidden() {
        let browser = FakeDashboard::new().authenticated();
        browser.goto("http://localhost:9000/dashboard/").await.unwrap();

        let visible_only = LocatorChain::css("li");
        assert!(!visible_only.is_present(&browser).await.unwrap());
        assert!(visible_only.allow_hidden().is_present(&browser).await.unwrap());
    }
}
