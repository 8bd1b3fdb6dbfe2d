//! Liveness probe.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    /// Event currently followed, if any.
    active_event: Option<String>,
    /// Whether the poll timer is armed.
    polling: bool,
}

/// `GET /health`: gateway liveness and polling state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports gateway version, the followed event and whether polling is running. \
                   Never contacts the upstream service.",
    responses(
        (status = 200, description = "Gateway is up", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.service.status().await;
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        active_event: status.filter.map(|f| f.event_name().to_string()),
        polling: state.service.is_polling().await,
    })
}

/// Root-level routes, outside `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
