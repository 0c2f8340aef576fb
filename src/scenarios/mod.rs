//! Scenario implementations
//!
//! Bodies of the 17 dashboard scenarios, written against [`Browser`] so
//! they run the same way on a real WebDriver session and on the test fake.
//!
//! ## Suites
//!
//! ### Login (1-5)
//! - Login form displayed
//! - Invalid credentials rejected
//! - Valid credentials log in
//! - Email required
//! - Password required
//!
//! ### Dashboard (6-7) and Navigation (8-12)
//! - Dashboard after login, dashboard content
//! - Home after login, navigation menu, products/orders/customers pages
//!
//! ### GraphQL API (13-16)
//! - Playground reachable, shop query, products query, invalid query handled
//!
//! ### Session (17)
//! - Logout returns to login

mod api;
mod dashboard;
mod login;

use anyhow::Result;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::browser::{Browser, BrowserError, QueueError};
use crate::config::RunConfig;
use crate::graphql::{GraphqlClient, GraphqlError};
use crate::http::HttpClient;
use crate::models::{Scenario, ScenarioStatus};
use crate::readiness::{probe_backend_readiness, Readiness};
use crate::session::{establish_session, Credentials, SessionError, SessionOptions, SessionResult};

/// Why a scenario did not pass
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("{0}")]
    Failed(String),

    #[error("{0}")]
    Skipped(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Graphql(#[from] GraphqlError),
}

impl ScenarioError {
    /// Status this error maps to: driver and transport faults are errors,
    /// everything the application got wrong is a failure
    pub fn status(&self) -> ScenarioStatus {
        match self {
            ScenarioError::Skipped(_) => ScenarioStatus::Skip,
            ScenarioError::Graphql(_) => ScenarioStatus::Error,
            ScenarioError::Browser(e) => browser_status(e),
            ScenarioError::Queue(e) => browser_status(&e.source),
            ScenarioError::Session(SessionError::Browser(e)) => browser_status(e),
            ScenarioError::Session(_) | ScenarioError::Failed(_) => ScenarioStatus::Fail,
        }
    }
}

fn browser_status(e: &BrowserError) -> ScenarioStatus {
    match e {
        BrowserError::Driver(_) => ScenarioStatus::Error,
        _ => ScenarioStatus::Fail,
    }
}

/// Everything a scenario needs besides the browser
#[derive(Clone)]
pub struct ScenarioContext {
    pub base_url: String,
    pub api_url: String,
    pub credentials: Credentials,
    /// Element lookups and URL waits
    pub command_timeout: Duration,
    /// Wait after submitting a form before inspecting the page
    pub settle_delay: Duration,
    pub http: HttpClient,
}

impl ScenarioContext {
    pub fn new(base_url: impl Into<String>, api_url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            api_url: api_url.into(),
            credentials: Credentials::default(),
            command_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_secs(2),
            http,
        }
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let http = HttpClient::with_timeout(config.timeouts.request_secs)?;
        Ok(Self::new(&config.base_url, &config.api_url, http)
            .credentials(config.credentials.clone())
            .command_timeout(config.command_timeout()))
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn graphql(&self) -> GraphqlClient {
        GraphqlClient::new(self.http.clone(), &self.api_url)
    }

    /// Log in with the context credentials
    pub async fn login<B: Browser>(&self, browser: &B) -> Result<SessionResult, SessionError> {
        let options = SessionOptions::login()
            .element_timeout(self.command_timeout)
            .navigation_timeout(self.command_timeout);
        establish_session(browser, &self.base_url, &self.credentials, &options).await
    }
}

/// Run one scenario body (no retries, no exception draining)
pub async fn run_scenario<B: Browser>(
    scenario: Scenario,
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    if scenario.needs_backend() {
        let report = probe_backend_readiness(&ctx.http, &ctx.api_url).await;
        if report.readiness == Readiness::Unreachable {
            return Err(ScenarioError::Skipped(format!(
                "Backend API at {} is not reachable",
                ctx.api_url
            )));
        }
    }

    if scenario.needs_session() {
        ctx.login(browser).await?;
    }

    info!("Running {}", scenario);
    match scenario {
        Scenario::LoginFormDisplayed => login::form_displayed(browser, ctx).await,
        Scenario::InvalidCredentialsRejected => login::invalid_credentials(browser, ctx).await,
        Scenario::ValidCredentialsLogin => login::valid_credentials(browser, ctx).await,
        Scenario::EmailRequired => login::email_required(browser, ctx).await,
        Scenario::PasswordRequired => login::password_required(browser, ctx).await,
        Scenario::DashboardAfterLogin => dashboard::after_login(browser, ctx).await,
        Scenario::DashboardContent => dashboard::content(browser, ctx).await,
        Scenario::NavigationHome => dashboard::home(browser, ctx).await,
        Scenario::NavigationMenuVisible => dashboard::menu_visible(browser, ctx).await,
        Scenario::NavigateToProducts => {
            dashboard::navigate_to(browser, ctx, "Products", "product").await
        }
        Scenario::NavigateToOrders => dashboard::navigate_to(browser, ctx, "Orders", "order").await,
        Scenario::NavigateToCustomers => {
            dashboard::navigate_to(browser, ctx, "Customers", "customer").await
        }
        Scenario::GraphqlPlayground => api::playground(browser, ctx).await,
        Scenario::ShopQuery => api::shop_query(ctx).await,
        Scenario::ProductsQuery => api::products_query(ctx).await,
        Scenario::InvalidQueryHandled => api::invalid_query(ctx).await,
        Scenario::LogoutReturnsToLogin => dashboard::logout(browser, ctx).await,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::browser::fake::ORIGIN;

    /// Context tuned for the in-memory fake
    pub fn fast_context(api_url: &str) -> ScenarioContext {
        ScenarioContext::new(ORIGIN, api_url, HttpClient::with_timeout(2).unwrap())
            .command_timeout(Duration::from_millis(100))
            .settle_delay(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fast_context;
    use super::*;
    use crate::browser::fake::FakeDashboard;
    use crate::http::stub::{unreachable_url, StubServer};

    #[tokio::test]
    async fn test_every_browser_scenario_passes_on_healthy_dashboard() {
        let api = StubServer::start(200, r#"{"data":{"shop":{"name":"Saleor"}}}"#).await;
        let ctx = fast_context(&api.url("/graphql/"));

        for scenario in Scenario::all() {
            if matches!(
                scenario,
                Scenario::ProductsQuery | Scenario::InvalidQueryHandled
            ) {
                continue;
            }
            let browser = FakeDashboard::new();
            let outcome = run_scenario(scenario, &browser, &ctx).await;
            assert!(outcome.is_ok(), "{scenario} failed: {outcome:?}");
        }
    }

    #[tokio::test]
    async fn test_backend_scenarios_skip_when_unreachable() {
        let ctx = fast_context(&unreachable_url("/graphql/").await);
        let browser = FakeDashboard::new();

        let err = run_scenario(Scenario::ShopQuery, &browser, &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.status(), ScenarioStatus::Skip);
        assert!(browser.visits().is_empty());
    }

    #[tokio::test]
    async fn test_session_scenarios_log_in_first() {
        let ctx = fast_context("http://localhost:8000/graphql/");
        let browser = FakeDashboard::new();

        run_scenario(Scenario::NavigationMenuVisible, &browser, &ctx)
            .await
            .unwrap();
        assert!(browser.is_authenticated());
    }

    #[tokio::test]
    async fn test_wrong_context_credentials_fail_session_scenarios() {
        let ctx = fast_context("http://localhost:8000/graphql/")
            .credentials(Credentials::new("admin@example.com", "nope"));
        let browser = FakeDashboard::new();

        let err = run_scenario(Scenario::DashboardAfterLogin, &browser, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Session(SessionError::StillOnLoginSurface { .. })
        ));
        assert_eq!(err.status(), ScenarioStatus::Fail);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            ScenarioError::Failed("x".into()).status(),
            ScenarioStatus::Fail
        );
        assert_eq!(
            ScenarioError::Browser(BrowserError::Driver("gone".into())).status(),
            ScenarioStatus::Error
        );
        assert_eq!(
            ScenarioError::Browser(BrowserError::AssertionFailed("x".into())).status(),
            ScenarioStatus::Fail
        );
        assert_eq!(
            ScenarioError::Session(SessionError::Browser(BrowserError::Driver("x".into())))
                .status(),
            ScenarioStatus::Error
        );
        assert_eq!(
            ScenarioError::Skipped("down".into()).status(),
            ScenarioStatus::Skip
        );
    }
}
