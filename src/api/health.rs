//! Liveness and readiness checks

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::error;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::DomainError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check body; `checks` and `latency_ms` only appear on readiness
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            Self::Healthy => StatusCode::OK,
            Self::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Outcome of checking one dependency
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: &'static str,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
}

impl HealthCheck {
    fn from_result<T>(name: &'static str, started: Instant, result: Result<T, DomainError>) -> Self {
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(_) => Self {
                name,
                status: HealthStatus::Healthy,
                message: None,
                latency_ms,
            },
            Err(e) => {
                error!(check = name, error = %e, "Readiness check failed");

                Self {
                    name,
                    status: HealthStatus::Unhealthy,
                    message: Some("unavailable".to_string()),
                    latency_ms,
                }
            }
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: VERSION,
        checks: None,
        latency_ms: None,
    })
}

/// GET /ready; reads one user row and answers 503 when that fails
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();

    let result = state.user_service.list_users(1, 0).await;
    let user_store = HealthCheck::from_result("user_store", started, result);
    let status = user_store.status;

    let response = HealthResponse {
        status,
        version: VERSION,
        checks: Some(vec![user_store]),
        latency_ms: Some(started.elapsed().as_millis() as u64),
    };

    (status.status_code(), Json(response))
}

/// GET /live
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}
