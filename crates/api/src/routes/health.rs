//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use persistence::db;
use persistence::metrics::record_pool_metrics;
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check: database round-trip latency and pool occupancy.
///
/// Also refreshes the pool gauges so `/metrics` stays current between scrapes.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    record_pool_metrics(&state.pool);

    let latency = match db::ping(&state.pool).await {
        Ok(elapsed) => Some(elapsed.as_millis() as u64),
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            None
        }
    };
    let connected = latency.is_some();

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected,
            latency_ms: latency,
            pool_size: state.pool.size(),
            pool_idle: state.pool.num_idle(),
        },
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Liveness probe: 200 while the process runs.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe: 200 once the database answers.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    match db::ping(&state.pool).await {
        Ok(_) => Ok(Json(StatusResponse {
            status: "ready".to_string(),
        })),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}
