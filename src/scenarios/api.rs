//! GraphQL API scenarios
//!
//! Scenarios 13-16: the playground page and three queries against the
//! backend endpoint.

use super::{ScenarioContext, ScenarioError};
use crate::browser::{Browser, CommandQueue, TextPattern};

pub const SHOP_QUERY: &str = "query { shop { name version description } }";

pub const PRODUCTS_QUERY: &str = "query { products(first: 5) { edges { node { id name slug } } } }";

pub const INVALID_QUERY: &str = "query { invalidField { name } }";

/// Scenario 13: the endpoint serves a page mentioning GraphQL
pub async fn playground<B: Browser>(
    browser: &B,
    ctx: &ScenarioContext,
) -> Result<(), ScenarioError> {
    CommandQueue::new(&ctx.api_url)
        .visit(&ctx.api_url)
        .wait_for_body(ctx.command_timeout)
        .assert_body_contains(TextPattern::literal("GraphQL"))
        .run(browser)
        .await?;
    Ok(())
}

/// Scenario 14: 200 with `data`; a present `shop` has a `name`
pub async fn shop_query(ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let reply = ctx.graphql().execute(SHOP_QUERY).await?;
    if reply.status_code != 200 {
        return Err(ScenarioError::Failed(format!(
            "Shop query returned status {}",
            reply.status_code
        )));
    }
    if !reply.has_data() {
        return Err(ScenarioError::Failed(format!(
            "Shop query response has no data (errors: {:?})",
            reply.error_messages()
        )));
    }
    if let Some(shop) = reply.data_at(&["shop"]).filter(|v| !v.is_null()) {
        if shop.get("name").is_none() {
            return Err(ScenarioError::Failed("Shop has no name field".to_string()));
        }
    }
    Ok(())
}

/// Scenario 15: 200 with `data.products`
pub async fn products_query(ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let reply = ctx.graphql().execute(PRODUCTS_QUERY).await?;
    if reply.status_code != 200 {
        return Err(ScenarioError::Failed(format!(
            "Products query returned status {}",
            reply.status_code
        )));
    }
    if reply.data_at(&["products"]).is_none() {
        return Err(ScenarioError::Failed(
            "Products query response has no data.products".to_string(),
        ));
    }
    Ok(())
}

/// Scenario 16: an unknown field yields 200 with `errors`, or 400
pub async fn invalid_query(ctx: &ScenarioContext) -> Result<(), ScenarioError> {
    let reply = ctx.graphql().execute(INVALID_QUERY).await?;
    match reply.status_code {
        400 => Ok(()),
        200 if reply.has_errors() => Ok(()),
        200 => Err(ScenarioError::Failed(
            "Invalid query answered 200 without errors".to_string(),
        )),
        status => Err(ScenarioError::Failed(format!(
            "Invalid query returned status {status}, expected 200 or 400"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::fast_context;
    use super::*;
    use crate::browser::fake::FakeDashboard;
    use crate::http::stub::{unreachable_url, StubServer};
    use crate::models::ScenarioStatus;

    #[tokio::test]
    async fn test_playground() {
        let browser = FakeDashboard::new();
        playground(&browser, &fast_context("http://localhost:8000/graphql/"))
            .await
            .unwrap();
        assert_eq!(browser.visits(), vec!["http://localhost:8000/graphql/"]);
    }

    #[tokio::test]
    async fn test_shop_query() {
        let server = StubServer::start(200, r#"{"data":{"shop":{"name":"Saleor"}}}"#).await;
        let ctx = fast_context(&server.url("/graphql/"));
        shop_query(&ctx).await.unwrap();
        assert!(server.bodies()[0].contains("shop"));
    }

    #[tokio::test]
    async fn test_shop_query_tolerates_null_shop() {
        let server = StubServer::start(200, r#"{"data":{"shop":null}}"#).await;
        shop_query(&fast_context(&server.url("/graphql/")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_shop_query_fails_on_server_error() {
        let server = StubServer::start(500, "boom").await;
        let err = shop_query(&fast_context(&server.url("/graphql/")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), ScenarioStatus::Fail);
    }

    #[tokio::test]
    async fn test_products_query() {
        let server = StubServer::start(200, r#"{"data":{"products":{"edges":[]}}}"#).await;
        products_query(&fast_context(&server.url("/graphql/")))
            .await
            .unwrap();

        let server = StubServer::start(200, r#"{"data":{"shop":{"name":"x"}}}"#).await;
        assert!(products_query(&fast_context(&server.url("/graphql/")))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_invalid_query_variants() {
        let with_errors =
            StubServer::start(200, r#"{"errors":[{"message":"Cannot query field"}]}"#).await;
        invalid_query(&fast_context(&with_errors.url("/")))
            .await
            .unwrap();

        let bad_request = StubServer::start(400, r#"{"errors":[]}"#).await;
        invalid_query(&fast_context(&bad_request.url("/")))
            .await
            .unwrap();

        let silent = StubServer::start(200, r#"{"data":{}}"#).await;
        assert!(invalid_query(&fast_context(&silent.url("/"))).await.is_err());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        let ctx = fast_context(&unreachable_url("/graphql/").await);
        let err = shop_query(&ctx).await.unwrap_err();
        assert_eq!(err.status(), ScenarioStatus::Error);
    }
}
