//! Login scenarios
//!
//! Scenarios 1-5: form rendering, rejected and accepted credentials, and the
//! `required` markers on both inputs.

use tracing::debug;

use super::{ScenarioContext, ScenarioError};
use crate::browser::{Browser, CommandQueue, TextPattern};
use crate::session::{email_input, password_input, submit_control, LOGIN_MARKER};

/// Words the dashboard uses when it rejects a login
const REJECTION_WORDS: [&str; 4] = ["invalid", "incorrect", "error", "wrong"];

fn login_page(ctx: &ScenarioContext) -> CommandQueue {
    CommandQueue::new(&ctx.base_url)
        .visit("/")
        .wait_for_body(ctx.command_timeout)
}

/// Scenario 1: email, password and submit controls are visible
pub async fn form_displayed<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    login_page(ctx)
        .assert_visible(email_input().timeout(ctx.command_timeout))
        .assert_visible(password_input().timeout(ctx.command_timeout))
        .assert_visible(submit_control().timeout(ctx.command_timeout))
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 2: bad credentials show an error or leave us on the login page
pub async fn invalid_credentials<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    let report = login_page(ctx)
        .type_into(email_input().timeout(ctx.command_timeout), "wrong@example.com")
        .type_into(password_input().timeout(ctx.command_timeout), "wrongpassword")
        .click(submit_control().timeout(ctx.command_timeout))
        .pause(ctx.settle_delay)
        .run(browser)
        .await?;

    let body = browser.body_text().await?;
    if TextPattern::any_of(REJECTION_WORDS).matches(&body) {
        debug!("Rejection message shown");
        return Ok(());
    }

    let url = report.final_url;
    let root = format!("{}/", ctx.base_url.trim_end_matches('/'));
    if url.contains(LOGIN_MARKER) || url == root {
        debug!("Still on the login page at {}", url);
        return Ok(());
    }

    Err(ScenarioError::Failed(format!(
        "Invalid credentials were accepted: navigated to {url}"
    )))
}

/// Scenario 3: the default account reaches a non-login page
pub async fn valid_credentials<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    let session = ctx.login(browser).await?;
    if session.final_url.contains(LOGIN_MARKER) {
        return Err(ScenarioError::Failed(format!(
            "Still on the login page: {}",
            session.final_url
        )));
    }
    Ok(())
}

/// Scenario 4: submitting without an email; the email input is `required`
pub async fn email_required<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    login_page(ctx)
        .type_into(
            password_input().timeout(ctx.command_timeout),
            ctx.credentials.password.as_str(),
        )
        .click(submit_control().timeout(ctx.command_timeout))
        .assert_attribute(email_input().timeout(ctx.command_timeout), "required")
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 5: submitting without a password; the password input is `required`
pub async fn password_required<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    login_page(ctx)
        .type_into(
            email_input().timeout(ctx.command_timeout),
            ctx.credentials.email.as_str(),
        )
        .click(submit_control().timeout(ctx.command_timeout))
        .assert_attribute(password_input().timeout(ctx.command_timeout), "required")
        .run(browser)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::fast_context;
    use super::*;
    use crate::browser::fake::{FakeDashboard, LoginMarkup};
    use crate::models::ScenarioStatus;
    use crate::session::Credentials;

    const API: &str = "http://localhost:8000/graphql/";

    #[tokio::test]
    async fn test_form_displayed() {
        let browser = FakeDashboard::new();
        form_displayed(&browser, &fast_context(API)).await.unwrap();
    }

    #[tokio::test]
    async fn test_form_displayed_with_typed_inputs() {
        let browser = FakeDashboard::new().with_markup(LoginMarkup::TypedInputsOnly);
        form_displayed(&browser, &fast_context(API)).await.unwrap();
    }

    #[tokio::test]
    async fn test_form_missing_when_already_logged_in() {
        let browser = FakeDashboard::new().authenticated();
        let err = form_displayed(&browser, &fast_context(API))
            .await
            .unwrap_err();
        assert_eq!(err.status(), ScenarioStatus::Fail);
    }

    #[tokio::test]
    async fn test_invalid_credentials_rejected() {
        let browser = FakeDashboard::new();
        invalid_credentials(&browser, &fast_context(API))
            .await
            .unwrap();
        assert!(!browser.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_credentials_scenario_fails_if_accepted() {
        let browser = FakeDashboard::new().with_credentials("wrong@example.com", "wrongpassword");
        let err = invalid_credentials(&browser, &fast_context(API))
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Failed(_)));
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let browser = FakeDashboard::new();
        valid_credentials(&browser, &fast_context(API))
            .await
            .unwrap();
        assert!(browser.is_authenticated());
    }

    #[tokio::test]
    async fn test_valid_credentials_with_wrong_password() {
        let browser = FakeDashboard::new();
        let ctx = fast_context(API).credentials(Credentials::new("admin@example.com", "x"));
        let err = valid_credentials(&browser, &ctx).await.unwrap_err();
        assert_eq!(err.status(), ScenarioStatus::Fail);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let ctx = fast_context(API);
        email_required(&FakeDashboard::new(), &ctx).await.unwrap();
        password_required(&FakeDashboard::new(), &ctx).await.unwrap();
    }
}
