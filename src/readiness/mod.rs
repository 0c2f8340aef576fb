//! Environment readiness checks
//!
//! Reachability checks for the dashboard origin and the GraphQL backend.
//! The backend probe is advisory: it logs what it saw and never fails.

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::graphql::{GraphqlClient, GraphqlRequest, SHOP_NAME_QUERY};
use crate::http::{HttpClient, HttpRequest};

/// Timeout for the backend probe and the dashboard running check
pub const PROBE_TIMEOUT_SECS: u64 = 5;

/// Timeout for waiting on the dashboard origin
pub const DASHBOARD_WAIT_TIMEOUT_SECS: u64 = 15;

/// What the backend probe concluded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    /// Answered, but with a 5xx status
    Degraded,
    /// Nothing answered (status 0)
    Unreachable,
}

/// Result of one backend probe
#[derive(Clone, Debug, Serialize)]
pub struct ReadinessReport {
    pub endpoint: String,
    /// HTTP status, 0 when the endpoint could not be reached
    pub status_code: u16,
    pub body_present: bool,
    pub has_data: bool,
    pub has_errors: bool,
    pub readiness: Readiness,
    pub detail: Option<String>,
}

impl ReadinessReport {
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}

/// Probe the GraphQL backend with `{ shop { name } }`
///
/// Status 0 or >= 500 is logged as a warning. This function never returns an
/// error; scenarios proceed identically whatever the backend answers.
pub async fn probe_backend_readiness(client: &HttpClient, endpoint: &str) -> ReadinessReport {
    let graphql = GraphqlClient::new(client.clone(), endpoint);
    let request = GraphqlRequest::new(SHOP_NAME_QUERY);

    let report = match graphql.send(request, Some(PROBE_TIMEOUT_SECS)).await {
        Ok(reply) => {
            let readiness = if reply.status_code == 0 {
                Readiness::Unreachable
            } else if reply.status_code >= 500 {
                Readiness::Degraded
            } else {
                Readiness::Ready
            };
            ReadinessReport {
                endpoint: endpoint.to_string(),
                status_code: reply.status_code,
                body_present: !reply.body.trim().is_empty(),
                has_data: reply.has_data(),
                has_errors: reply.has_errors(),
                readiness,
                detail: None,
            }
        }
        Err(e) => ReadinessReport {
            endpoint: endpoint.to_string(),
            status_code: 0,
            body_present: false,
            has_data: false,
            has_errors: false,
            readiness: Readiness::Unreachable,
            detail: Some(e.to_string()),
        },
    };

    match report.readiness {
        Readiness::Ready => info!(
            "Backend API at {} answered {}",
            report.endpoint, report.status_code
        ),
        Readiness::Degraded => warn!(
            "Backend API not available (status {}) - some scenarios may be skipped",
            report.status_code
        ),
        Readiness::Unreachable => warn!(
            "Backend API at {} is not running - scenarios requiring the API will be skipped{}",
            report.endpoint,
            report
                .detail
                .as_deref()
                .map(|d| format!(" ({d})"))
                .unwrap_or_default()
        ),
    }

    report
}

/// Fail unless the dashboard origin answers 200
pub async fn check_dashboard_running(client: &HttpClient, url: &str) -> Result<()> {
    let status = match client
        .send(HttpRequest::get(url).timeout(PROBE_TIMEOUT_SECS))
        .await
    {
        Ok(response) => response.status_code,
        Err(_) => 0,
    };

    if status != 200 {
        bail!("Dashboard not accessible. Status: {status}");
    }
    Ok(())
}

/// Touch the dashboard origin once; returns the status (0 when unreachable)
pub async fn wait_for_dashboard(client: &HttpClient, url: &str) -> u16 {
    match client
        .send(HttpRequest::get(url).timeout(DASHBOARD_WAIT_TIMEOUT_SECS))
        .await
    {
        Ok(response) => response.status_code,
        Err(e) => {
            warn!("Dashboard at {} did not answer: {}", url, e);
            0
        }
    }
}
