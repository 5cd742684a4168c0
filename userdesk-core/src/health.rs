//! Health checks reported by `GET /health`.

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub enum HealthStatus {
    Up,
    Down(String),
}

impl HealthStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }
}

/// A named dependency whose availability can be probed.
pub trait HealthIndicator: Send + Sync + 'static {
    /// The name of this health check (e.g. `"db"`).
    fn name(&self) -> &str;

    fn check(&self) -> impl std::future::Future<Output = HealthStatus> + Send;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthCheckStatus {
    Up,
    Down,
}

/// A single check result in the health response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthCheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub duration_ms: u64,
}

/// Run one indicator and time it.
pub async fn run_check<H: HealthIndicator>(indicator: &H) -> HealthCheck {
    let started = Instant::now();
    let status = indicator.check().await;
    let duration_ms = started.elapsed().as_millis() as u64;
    match status {
        HealthStatus::Up => HealthCheck {
            name: indicator.name().to_string(),
            status: HealthCheckStatus::Up,
            reason: None,
            duration_ms,
        },
        HealthStatus::Down(reason) => {
            tracing::warn!(check = indicator.name(), %reason, "health check failed");
            HealthCheck {
                name: indicator.name().to_string(),
                status: HealthCheckStatus::Down,
                reason: Some(reason),
                duration_ms,
            }
        }
    }
}

/// Aggregated health response: UP only when every check is UP.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthCheckStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

impl HealthResponse {
    pub fn from_checks(checks: Vec<HealthCheck>) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthCheckStatus::Up) {
            HealthCheckStatus::Up
        } else {
            HealthCheckStatus::Down
        };
        Self { status, checks }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let code = match self.status {
            HealthCheckStatus::Up => StatusCode::OK,
            HealthCheckStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        };
        (code, Json(self)).into_response()
    }
}
