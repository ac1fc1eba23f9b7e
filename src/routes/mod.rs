//! HTTP surface
//!
//! Topic publish/stream endpoints plus health, readiness and metrics.

mod health;
mod topic;

pub use health::{HealthResponse, ReadyResponse};
pub use topic::PublishForm;

use crate::bus::MessageBus;
use crate::error::RelayError;
use crate::metrics::RelayMetrics;
use crate::relay::PublishGateway;
use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Service name, also the path prefix of the topic endpoints
pub const SERVICE_NAME: &str = "info-center";

/// Error body returned with every 4xx/5xx
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<PublishGateway>,
    pub bus: Arc<dyn MessageBus>,
    pub metrics: Arc<RelayMetrics>,
    pub max_session: Duration,
    /// Cancelled on shutdown; every stream session holds a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(bus: Arc<dyn MessageBus>, metrics: Arc<RelayMetrics>, max_session: Duration) -> Self {
        Self {
            gateway: Arc::new(PublishGateway::new(Arc::clone(&bus))),
            bus,
            metrics,
            max_session,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Create the relay router
pub fn router(state: AppState) -> Router {
    let topic_path = format!("/{SERVICE_NAME}/{{topic}}");

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/ready", get(health::ready_handler))
        .route("/metrics", get(health::metrics_handler))
        .route(
            &topic_path,
            get(topic::stream_handler).post(topic::publish_handler),
        )
        .with_state(state)
}
