//! Health check handlers for service monitoring.
//!
//! Provides liveness and health endpoints with a database connectivity
//! check for process managers and load balancers.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, instrument};
use tramites_core::Storage;

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Critical systems failing
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Database connectivity and basic query test
    pub database: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Optional error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Component-level health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy
    Up,
    /// Component is experiencing issues
    Down,
}

/// Runs the component checks and assembles the response.
pub async fn check_health(storage: &Storage) -> HealthResponse {
    debug!("Performing health check");

    let timestamp = Utc::now();
    let start_time = Instant::now();

    let (status, message) = match storage.health_check().await {
        Ok(()) => (ComponentStatus::Up, None),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (ComponentStatus::Down, Some(format!("Database connection failed: {e}")))
        },
    };
    let db_duration = start_time.elapsed();

    let overall_status = match status {
        ComponentStatus::Up => HealthStatus::Healthy,
        ComponentStatus::Down => HealthStatus::Unhealthy,
    };

    HealthResponse {
        status: overall_status,
        timestamp,
        checks: HealthChecks {
            database: ComponentHealth {
                status,
                message,
                response_time_ms: u64::try_from(db_duration.as_millis()).unwrap_or(u64::MAX),
            },
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Health check endpoint handler.
///
/// Returns `200` when the database answers and `503` otherwise.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let response = check_health(&state.storage).await;

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response)).into_response()
}

/// Liveness probe: the process is up and serving HTTP.
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}
