//! System endpoints: health check and service banner.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    version: String,
    timestamp: DateTime<Utc>,
    /// Events held in memory.
    events: usize,
    /// Registered accounts.
    accounts: usize,
    /// Open WebSocket feeds and log writers.
    listeners: usize,
}

/// `GET /health`: Service health and in-memory counts.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports the service version and how many events, accounts and live listeners the instance holds.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        events: state.ticket_service.registry().len().await,
        accounts: state.account_service.directory().len().await,
        listeners: state.event_bus.receiver_count(),
    })
}

/// `GET /`: Plain-text liveness banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Service banner",
    responses(
        (status = 200, description = "API is running", body = String, content_type = "text/plain"),
    )
)]
pub async fn root_handler() -> &'static str {
    "API is running..."
}

/// System routes mounted at the root level (not under /api).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}
