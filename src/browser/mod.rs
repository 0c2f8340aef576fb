//! Browser automation layer
//!
//! [`Browser`] is the seam over the WebDriver session. Everything above it
//! (locator chains, the command queue, session bootstrap, scenarios) is
//! written against the trait so it can run against an in-memory fake.

mod locator;
mod queue;
mod webdriver;

#[cfg(test)]
pub mod fake;

pub use locator::{Locator, LocatorChain, TextPattern, POLL_INTERVAL};
pub use queue::{join_url, wait_for_url, CommandQueue, QueueError, UrlCondition};
pub use webdriver::{BrowserSettings, WebDriverBrowser};

use async_trait::async_trait;
use thiserror::Error;

/// Browser-level failures
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Timed out after {waited_ms}ms waiting for {locator}")]
    LocatorTimeout { locator: String, waited_ms: u64 },

    #[error("Timed out after {waited_ms}ms waiting for URL to {expectation} (last URL: {url})")]
    NavigationTimeout {
        expectation: String,
        url: String,
        waited_ms: u64,
    },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("WebDriver error: {0}")]
    Driver(String),
}

/// Operations the harness needs from a browser session
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Visible text of the whole document body
    async fn body_text(&self) -> Result<String, BrowserError>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, css: &str) -> Result<Vec<Self::Element>, BrowserError>;

    async fn text(&self, element: &Self::Element) -> Result<String, BrowserError>;

    async fn is_displayed(&self, element: &Self::Element) -> Result<bool, BrowserError>;

    async fn attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    async fn clear(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), BrowserError>;

    async fn click(&self, element: &Self::Element) -> Result<(), BrowserError>;

    async fn screenshot_png(&self) -> Result<Vec<u8>, BrowserError>;

    /// Uncaught exception messages raised in the page since the last drain
    async fn drain_uncaught_errors(&self) -> Result<Vec<String>, BrowserError>;

    /// Drop cookies and web storage for `origin` so the next visit starts
    /// logged out. Storage is per origin, so this navigates there first.
    async fn reset_session(&self, origin: &str) -> Result<(), BrowserError>;
}
