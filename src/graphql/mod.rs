//! GraphQL client
//!
//! Posts `{ "query": ... }` documents to the Saleor API and decodes the
//! standard `data` / `errors` envelope. Non-JSON bodies and non-200 statuses
//! are returned to the caller rather than treated as failures, since the API
//! answers malformed queries with either 200 + `errors` or a bare 400.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::http::{HttpClient, HttpError, HttpRequest};

/// Minimal query used to check that the API answers at all
pub const SHOP_NAME_QUERY: &str = "{ shop { name } }";

#[derive(Error, Debug)]
pub enum GraphqlError {
    #[error(transparent)]
    Transport(#[from] HttpError),

    #[error("Failed to encode GraphQL request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Request body
#[derive(Clone, Debug, Serialize)]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl GraphqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }
}

/// One entry of the `errors` array
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

/// Standard response envelope
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GraphqlEnvelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

/// Raw outcome of a GraphQL POST
#[derive(Clone, Debug)]
pub struct GraphqlReply {
    pub status_code: u16,
    pub body: String,
    pub envelope: Option<GraphqlEnvelope>,
    pub duration_ms: u64,
}

impl GraphqlReply {
    pub fn has_data(&self) -> bool {
        self.envelope
            .as_ref()
            .map(|e| e.data.is_some())
            .unwrap_or(false)
    }

    pub fn has_errors(&self) -> bool {
        self.envelope
            .as_ref()
            .and_then(|e| e.errors.as_ref())
            .map(|errs| !errs.is_empty())
            .unwrap_or(false)
    }

    /// Look up a value under `data` by field path
    pub fn data_at(&self, path: &[&str]) -> Option<&Value> {
        let mut current = self.envelope.as_ref()?.data.as_ref()?;
        for key in path {
            current = current.get(key)?;
        }
        Some(current)
    }

    pub fn error_messages(&self) -> Vec<&str> {
        self.envelope
            .as_ref()
            .and_then(|e| e.errors.as_ref())
            .map(|errs| errs.iter().map(|e| e.message.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Client bound to one GraphQL endpoint
#[derive(Clone)]
pub struct GraphqlClient {
    http: HttpClient,
    endpoint: String,
}

impl GraphqlClient {
    pub fn new(http: HttpClient, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a query with the client's default timeout
    pub async fn execute(&self, query: &str) -> Result<GraphqlReply, GraphqlError> {
        self.send(GraphqlRequest::new(query), None).await
    }

    /// Execute a request with an explicit timeout
    pub async fn send(
        &self,
        request: GraphqlRequest,
        timeout_secs: Option<u64>,
    ) -> Result<GraphqlReply, GraphqlError> {
        let body = serde_json::to_string(&request)?;
        let mut http_request = HttpRequest::post(&self.endpoint).json_body(body);
        if let Some(secs) = timeout_secs {
            http_request = http_request.timeout(secs);
        }

        let response = self.http.send(http_request).await?;
        let envelope = serde_json::from_str::<GraphqlEnvelope>(&response.body).ok();
        debug!(
            "GraphQL {} -> {} {} (data: {}, errors: {})",
            self.endpoint,
            response.status_code,
            response
                .get_header("content-type")
                .map(String::as_str)
                .unwrap_or("-"),
            envelope.as_ref().map(|e| e.data.is_some()).unwrap_or(false),
            envelope.as_ref().map(|e| e.errors.is_some()).unwrap_or(false),
        );

        Ok(GraphqlReply {
            status_code: response.status_code,
            body: response.body,
            envelope,
            duration_ms: response.duration_ms,
        })
    }
}
