//! Health check endpoints

use super::{AppState, SERVICE_NAME};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub bus: &'static str,
    pub bus_connected: bool,
}

/// Root endpoint - plain liveness banner
pub(super) async fn root_handler() -> impl IntoResponse {
    format!("[{SERVICE_NAME}] API is functional")
}

/// Health endpoint - always returns 200 if process is running
pub(super) async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: SERVICE_NAME,
    })
}

/// Readiness endpoint - returns 200 if the bus is usable
pub(super) async fn ready_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bus_connected = state.bus.is_connected();

    let response = ReadyResponse {
        ready: bus_connected,
        bus: state.bus.kind(),
        bus_connected,
    };

    if bus_connected {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Metrics endpoint - returns Prometheus format metrics
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics.set_bus_connected(state.bus.is_connected());

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.render(),
    )
}
