//! Session handlers: select, clear and refresh the tracked filter.

use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{SelectFilterRequest, SessionStatusResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /session`: Current filter and per-stream sync state.
#[utoipa::path(
    get,
    path = "/api/v1/session",
    tag = "Session",
    summary = "Get session status",
    description = "Returns the selected filter, polling state, and the phase, cursor and record count of each stream.",
    responses(
        (status = 200, description = "Session status", body = SessionStatusResponse),
    )
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    let status = state.service.status().await;
    Json(SessionStatusResponse::new(status, state.service.is_polling().await))
}

/// `PUT /session/filter`: Select the event and date to track.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidFilter`] for a blank event name or a
/// bad date.
#[utoipa::path(
    put,
    path = "/api/v1/session/filter",
    tag = "Session",
    summary = "Select filter",
    description = "Selects the event (and date, today when omitted). Every stream is reset and polling restarts immediately.",
    request_body = SelectFilterRequest,
    responses(
        (status = 200, description = "Filter selected", body = SessionStatusResponse),
        (status = 400, description = "Blank event name or invalid date", body = ErrorResponse),
    )
)]
pub async fn select_filter(
    State(state): State<AppState>,
    Json(req): Json<SelectFilterRequest>,
) -> Result<Json<SessionStatusResponse>, GatewayError> {
    let status = state
        .service
        .select_filter(&req.event_name, req.date.as_deref())
        .await?;
    Ok(Json(SessionStatusResponse::new(
        status,
        state.service.is_polling().await,
    )))
}

/// `DELETE /session/filter`: Stop tracking.
#[utoipa::path(
    delete,
    path = "/api/v1/session/filter",
    tag = "Session",
    summary = "Clear filter",
    description = "Deactivates the session: collections are emptied and polling stops.",
    responses(
        (status = 200, description = "Filter cleared", body = SessionStatusResponse),
    )
)]
pub async fn clear_filter(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    let status = state.service.clear_filter().await;
    Json(SessionStatusResponse::new(
        status,
        state.service.is_polling().await,
    ))
}

/// `POST /session/refresh`: Poll every stream now.
///
/// # Errors
///
/// Returns [`GatewayError::NoActiveFilter`] if no filter is selected.
#[utoipa::path(
    post,
    path = "/api/v1/session/refresh",
    tag = "Session",
    summary = "Refresh now",
    description = "Runs one poll of both record streams and occupancy without waiting for the timer. Fetch failures are reported as sync events, not as errors.",
    responses(
        (status = 200, description = "Session status after the poll", body = SessionStatusResponse),
        (status = 409, description = "No filter selected", body = ErrorResponse),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<SessionStatusResponse>, GatewayError> {
    let status = state.service.refresh().await?;
    Ok(Json(SessionStatusResponse::new(
        status,
        state.service.is_polling().await,
    )))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/filter", put(select_filter).delete(clear_filter))
        .route("/session/refresh", post(refresh))
}
