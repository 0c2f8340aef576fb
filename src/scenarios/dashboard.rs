//! Dashboard, navigation and session scenarios
//!
//! Scenarios 6-12 and 17. Each runs after a fresh login.

use super::{ScenarioContext, ScenarioError};
use crate::browser::{Browser, CommandQueue, Locator, LocatorChain, TextPattern, UrlCondition};
use crate::session::{self, LOGIN_MARKER};

const DASHBOARD_MARKER: &str = "/dashboard";

fn current_page(ctx: &ScenarioContext) -> CommandQueue {
    CommandQueue::new(&ctx.base_url).wait_for_body(ctx.command_timeout)
}

/// Scenario 6: logged in, the URL is under `/dashboard`
pub async fn after_login<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    current_page(ctx)
        .wait_url(
            UrlCondition::Includes(DASHBOARD_MARKER.to_string()),
            ctx.command_timeout,
        )
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 7: the dashboard renders some content
pub async fn content<B: Browser>(browser: &B, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    current_page(ctx)
        .assert_body_not_empty()
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 8: home is under `/dashboard` and off the login page
pub async fn home<B: Browser>(browser: &B, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let report = current_page(ctx)
        .wait_url(
            UrlCondition::Includes(DASHBOARD_MARKER.to_string()),
            ctx.command_timeout,
        )
        .run(browser)
        .await?;
    if report.final_url.contains(LOGIN_MARKER) {
        return Err(ScenarioError::Failed(format!(
            "Home is the login page: {}",
            report.final_url
        )));
    }
    Ok(())
}

/// Scenario 9: a visible `nav` element
pub async fn menu_visible<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    current_page(ctx)
        .assert_visible(LocatorChain::css("nav").timeout(ctx.command_timeout))
        .run(browser)
        .await?;
    Ok(())
}

/// Scenarios 10-12: click the menu entry labelled `label`, land on a URL with `fragment`
pub async fn navigate_to<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
    label: &str,
    fragment: &str,
) -> Result<(), ScenarioError> {
    let pattern = TextPattern::literal(label);
    let entry = LocatorChain::new(format!("{label} menu entry"))
        .then(Locator::css_with_text("a", pattern.clone()))
        .then(Locator::css_with_text("button, [role=\"link\"]", pattern))
        .timeout(ctx.command_timeout);

    current_page(ctx)
        .click(entry)
        .wait_url(
            UrlCondition::Includes(fragment.to_string()),
            ctx.command_timeout,
        )
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 17: logging out lands back on the login page
pub async fn logout<B: Browser>(browser: &B, ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let url = session::logout(browser, ctx.command_timeout).await?;
    if !url.contains(LOGIN_MARKER) {
        return Err(ScenarioError::Failed(format!(
            "Logout ended on {url}, not the login page"
        )));
    }
    Ok(())
}
