//! Session bootstrap
//!
//! Drives the dashboard's own login form and waits until the browser has
//! left the login surface. Success means "the URL no longer contains
//! `/login`"; [`SessionResult::authenticated_indicator`] records whether any
//! authenticated-only content was also seen, and [`login_as_admin`] insists
//! on it.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::browser::{
    join_url, wait_for_url, Browser, BrowserError, CommandQueue, Locator, LocatorChain,
    QueueError, TextPattern, UrlCondition,
};
use crate::utils::timer::Timer;

/// URL fragment that marks the login surface
pub const LOGIN_MARKER: &str = "/login";

pub const DEFAULT_EMAIL: &str = "admin@example.com";
pub const DEFAULT_PASSWORD: &str = "admin123";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

const MIN_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Email and password must be non-empty")]
    InvalidCredentials,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    LocatorTimeout { what: String, waited_ms: u64 },

    #[error("Still on the login surface after submitting credentials: {url}")]
    StillOnLoginSurface { url: String },

    #[error("No authenticated content found at {url}")]
    NotAuthenticated { url: String },

    #[error(transparent)]
    Browser(BrowserError),
}

impl From<BrowserError> for SessionError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::LocatorTimeout { locator, waited_ms } => SessionError::LocatorTimeout {
                what: locator,
                waited_ms,
            },
            other => SessionError::Browser(other),
        }
    }
}

impl From<QueueError> for SessionError {
    fn from(e: QueueError) -> Self {
        e.source.into()
    }
}

/// Login credentials
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Default admin account used by `login_as_admin`
    pub fn admin() -> Self {
        Self::new(DEFAULT_EMAIL, DEFAULT_ADMIN_PASSWORD)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(SessionError::InvalidCredentials);
        }
        Ok(())
    }
}

/// Tunables for one login attempt
#[derive(Clone, Debug)]
pub struct SessionOptions {
    /// Path joined onto the base URL for the first visit
    pub entry_path: String,
    /// Timeout for each form element lookup
    pub element_timeout: Duration,
    /// How long to wait for the URL to leave the login surface
    pub navigation_timeout: Duration,
    /// Return early if the page already shows authenticated content
    pub detect_existing: bool,
    /// Fail unless authenticated content is visible after login
    pub require_indicator: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            entry_path: String::new(),
            element_timeout: Duration::from_secs(15),
            navigation_timeout: Duration::from_secs(15),
            detect_existing: false,
            require_indicator: false,
        }
    }
}

impl SessionOptions {
    pub fn entry_path(mut self, path: impl Into<String>) -> Self {
        self.entry_path = path.into();
        self
    }

    pub fn element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Clamped to 10..=30 seconds
    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout.clamp(MIN_NAVIGATION_TIMEOUT, MAX_NAVIGATION_TIMEOUT);
        self
    }

    pub fn detect_existing(mut self, detect: bool) -> Self {
        self.detect_existing = detect;
        self
    }

    pub fn require_indicator(mut self, require: bool) -> Self {
        self.require_indicator = require;
        self
    }

    /// Options used by [`login`]: always fills in the form
    pub fn login() -> Self {
        Self::default().entry_path("/")
    }

    /// Options used by [`login_as_admin`]
    pub fn admin() -> Self {
        Self::default()
            .entry_path("/dashboard/")
            .detect_existing(true)
            .navigation_timeout(Duration::from_secs(20))
            .require_indicator(true)
    }
}

/// Outcome of a successful login
#[derive(Clone, Debug, Serialize)]
pub struct SessionResult {
    pub final_url: String,
    /// The login form was skipped because the session was already live
    pub already_authenticated: bool,
    /// Authenticated-only content was seen on the final page
    pub authenticated_indicator: bool,
    pub elapsed_ms: u64,
}

pub fn email_input() -> LocatorChain {
    LocatorChain::new("email input")
        .then(Locator::css("input[name=\"email\"]"))
        .then(Locator::css("input[type=\"email\"]"))
}

pub fn password_input() -> LocatorChain {
    LocatorChain::new("password input")
        .then(Locator::css("input[name=\"password\"]"))
        .then(Locator::css("input[type=\"password\"]"))
}

pub fn submit_control() -> LocatorChain {
    let pattern = TextPattern::any_of(["sign", "login", "submit"]);
    LocatorChain::new("submit control")
        .then(Locator::css_with_text("button[type=\"submit\"]", pattern.clone()))
        .then(Locator::css_with_text("button", pattern))
        .then(Locator::css("button[type=\"submit\"]"))
}

/// Body text that only an authenticated dashboard shows
pub fn has_authenticated_indicator(body: &str) -> bool {
    let body = body.to_lowercase();
    body.contains("dashboard") || body.contains("saleor")
}

fn origin_root(base_url: &str) -> Result<String, SessionError> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| SessionError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
    Ok(format!("{}/", url.origin().ascii_serialization()))
}

/// Log in through the dashboard's login form
pub async fn establish_session<B: Browser>(
    browser: &B,
    base_url: &str,
    credentials: &Credentials,
    options: &SessionOptions,
) -> Result<SessionResult, SessionError> {
    credentials.validate()?;
    let root = origin_root(base_url)?;
    let timer = Timer::start("establish_session");

    CommandQueue::new(base_url)
        .visit(&options.entry_path)
        .wait_for_body(options.element_timeout)
        .run(browser)
        .await?;

    let email = email_input().timeout(options.element_timeout);
    let mut form_present = email.is_present(browser).await?;

    if options.detect_existing && !form_present {
        let body = browser.body_text().await?;
        if has_authenticated_indicator(&body) {
            let final_url = browser.current_url().await?;
            if !final_url.contains(LOGIN_MARKER) {
                info!("Already logged in at {}", final_url);
                return Ok(SessionResult {
                    final_url,
                    already_authenticated: true,
                    authenticated_indicator: true,
                    elapsed_ms: timer.elapsed_ms(),
                });
            }
        }
    }

    if !form_present {
        // The login form may live at the origin root instead
        CommandQueue::new(&root)
            .visit("")
            .wait_for_body(options.element_timeout)
            .run(browser)
            .await?;
        form_present = email.is_present(browser).await?;
        if !form_present {
            warn!("No login form visible yet at {}, waiting for it", root);
        }
    }

    CommandQueue::new(base_url)
        .type_into(email, credentials.email.as_str())
        .type_into(
            password_input().timeout(options.element_timeout),
            credentials.password.as_str(),
        )
        .click(submit_control().timeout(options.element_timeout))
        .run(browser)
        .await?;

    let condition = UrlCondition::Excludes(LOGIN_MARKER.to_string());
    let final_url = match wait_for_url(browser, &condition, options.navigation_timeout).await {
        Ok(url) => url,
        Err(BrowserError::NavigationTimeout { url, .. }) => {
            return Err(SessionError::StillOnLoginSurface { url })
        }
        Err(e) => return Err(e.into()),
    };

    let authenticated_indicator = has_authenticated_indicator(&browser.body_text().await?);
    if options.require_indicator && !authenticated_indicator {
        return Err(SessionError::NotAuthenticated { url: final_url });
    }
    if !authenticated_indicator {
        warn!(
            "Left the login surface ({}) but saw no authenticated content",
            final_url
        );
    }

    info!("Logged in as {} ({}ms)", credentials.email, timer.elapsed_ms());

    Ok(SessionResult {
        final_url,
        already_authenticated: false,
        authenticated_indicator,
        elapsed_ms: timer.elapsed_ms(),
    })
}

/// Log in from the origin root
pub async fn login<B: Browser>(
    browser: &B,
    base_url: &str,
    credentials: &Credentials,
) -> Result<SessionResult, SessionError> {
    establish_session(browser, base_url, credentials, &SessionOptions::login()).await
}

/// Log in from `/dashboard/`, requiring visible dashboard content
pub async fn login_as_admin<B: Browser>(
    browser: &B,
    base_url: &str,
    credentials: &Credentials,
) -> Result<SessionResult, SessionError> {
    establish_session(browser, base_url, credentials, &SessionOptions::admin()).await
}

/// Log out through the user menu
pub async fn logout<B: Browser>(browser: &B, timeout: Duration) -> Result<String, SessionError> {
    let report = CommandQueue::new("")
        .click(LocatorChain::css("[data-test-id=\"user-menu\"]").timeout(timeout))
        .click(
            LocatorChain::new("logout entry")
                .then(Locator::css_with_text(
                    "a, button, li, [role=\"menuitem\"]",
                    TextPattern::literal("Logout"),
                ))
                .timeout(timeout),
        )
        .wait_url(UrlCondition::Includes(LOGIN_MARKER.to_string()), timeout)
        .run(browser)
        .await?;
    Ok(report.final_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeDashboard, LoginMarkup, ORIGIN};

    fn fast() -> SessionOptions {
        SessionOptions {
            element_timeout: Duration::from_millis(50),
            navigation_timeout: Duration::from_millis(100),
            ..SessionOptions::login()
        }
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let browser = FakeDashboard::new();
        let result = establish_session(&browser, ORIGIN, &Credentials::default(), &fast())
            .await
            .unwrap();

        assert!(!result.final_url.contains("/login"));
        assert!(!result.already_authenticated);
        assert!(result.authenticated_indicator);
        assert!(browser.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_credentials_stay_on_login_surface() {
        let browser = FakeDashboard::new();
        let err = establish_session(
            &browser,
            ORIGIN,
            &Credentials::new("wrong@example.com", "wrongpassword"),
            &fast(),
        )
        .await
        .unwrap_err();

        match err {
            SessionError::StillOnLoginSurface { url } => assert!(url.contains("/login")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!browser.is_authenticated());
    }

    #[test]
    fn test_only_admin_reuses_live_session() {
        assert!(!SessionOptions::default().detect_existing);
        assert!(!SessionOptions::login().detect_existing);
        assert!(SessionOptions::admin().detect_existing);
    }

    #[tokio::test]
    async fn test_login_never_short_circuits() {
        let browser = FakeDashboard::new().authenticated();
        let outcome = establish_session(&browser, ORIGIN, &Credentials::default(), &fast()).await;

        // The dashboard shows no form to a live session, so the lookup times out
        match outcome {
            Ok(result) => assert!(!result.already_authenticated, "login short-circuited"),
            Err(e) => assert!(matches!(e, SessionError::LocatorTimeout { .. }), "{e}"),
        }
        assert!(browser.visits().len() >= 2);
    }

    #[tokio::test]
    async fn test_second_call_short_circuits() {
        let browser = FakeDashboard::new().with_credentials("admin@example.com", "admin");
        let options = SessionOptions {
            element_timeout: Duration::from_millis(50),
            navigation_timeout: Duration::from_millis(100),
            ..SessionOptions::admin()
        };

        let first = establish_session(&browser, ORIGIN, &Credentials::admin(), &options)
            .await
            .unwrap();
        assert!(!first.already_authenticated);

        let second = establish_session(&browser, ORIGIN, &Credentials::admin(), &options)
            .await
            .unwrap();
        assert!(second.already_authenticated);
        assert_eq!(second.final_url, first.final_url);
    }

    #[tokio::test]
    async fn test_dashboard_base_url_lands_on_dashboard() {
        let browser = FakeDashboard::new().with_credentials("admin@example.com", "admin");
        let options = SessionOptions {
            entry_path: String::new(),
            ..fast()
        };

        let result = establish_session(
            &browser,
            "http://localhost:9000/dashboard/",
            &Credentials::admin(),
            &options,
        )
        .await
        .unwrap();

        let path = result.final_url.trim_start_matches(ORIGIN);
        assert!(path == "/dashboard" || path.starts_with("/dashboard/"));
        assert!(!result.final_url.contains("login"));
        assert_eq!(browser.visits(), vec!["http://localhost:9000/dashboard/".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_to_typed_inputs() {
        let browser = FakeDashboard::new().with_markup(LoginMarkup::TypedInputsOnly);
        let result = establish_session(&browser, ORIGIN, &Credentials::default(), &fast())
            .await
            .unwrap();
        assert!(result.authenticated_indicator);
    }

    #[tokio::test]
    async fn test_missing_form_is_locator_timeout() {
        let browser = FakeDashboard::new();
        let err = establish_session(
            &browser,
            "http://localhost:8000/graphql/",
            &Credentials::default(),
            &fast(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SessionError::LocatorTimeout { .. }));
    }

    #[tokio::test]
    async fn test_empty_credentials_rejected() {
        let browser = FakeDashboard::new();
        let err = establish_session(&browser, ORIGIN, &Credentials::new("", "x"), &fast())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert!(browser.visits().is_empty());
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let browser = FakeDashboard::new();
        establish_session(&browser, ORIGIN, &Credentials::default(), &fast())
            .await
            .unwrap();

        let url = logout(&browser, Duration::from_millis(100)).await.unwrap();
        assert!(url.contains("/login"));
        assert!(!browser.is_authenticated());
    }

    #[test]
    fn test_option_presets() {
        let admin = SessionOptions::admin();
        assert_eq!(admin.entry_path, "/dashboard/");
        assert_eq!(admin.navigation_timeout, Duration::from_secs(20));
        assert!(admin.require_indicator);

        let clamped = SessionOptions::default().navigation_timeout(Duration::from_secs(90));
        assert_eq!(clamped.navigation_timeout, Duration::from_secs(30));
        assert_eq!(Credentials::default().password, "admin123");
        assert_eq!(Credentials::admin().password, "admin");
    }

    #[test]
    fn test_origin_root() {
        assert_eq!(
            origin_root("http://localhost:9000/dashboard/").unwrap(),
            "http://localhost:9000/"
        );
        assert!(origin_root("not a url").is_err());
    }
}
