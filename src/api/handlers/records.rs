//! Record view handlers: allowed, denied, reasons, occupancy.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::analytics::DenialReasons;
use crate::api::dto::{DeniedQueryParams, OccupancyResponse, PaginationParams, RecordPage};
use crate::app_state::AppState;
use crate::domain::{AttendanceRecord, DenialRecord};

/// `GET /records/allowed`: Synchronized attendance records.
#[utoipa::path(
    get,
    path = "/api/v1/records/allowed",
    tag = "Records",
    summary = "List allowed records",
    description = "Returns the synchronized attendance records in arrival order.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Allowed records", body = RecordPage<AttendanceRecord>),
    )
)]
pub async fn list_allowed(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Json<RecordPage<AttendanceRecord>> {
    let snapshot = state.service.allowed_records().await;
    let total = snapshot.records.len();
    Json(RecordPage::from_snapshot(snapshot, &params, total))
}

/// `GET /records/denied`: Synchronized denial records, latest first.
#[utoipa::path(
    get,
    path = "/api/v1/records/denied",
    tag = "Records",
    summary = "List denied records",
    description = "Returns the synchronized denial records, latest first, optionally narrowed by reason and a text search over name, uid and location.",
    params(DeniedQueryParams),
    responses(
        (status = 200, description = "Denied records", body = RecordPage<DenialRecord>),
    )
)]
pub async fn list_denied(
    State(state): State<AppState>,
    Query(params): Query<DeniedQueryParams>,
) -> Json<RecordPage<DenialRecord>> {
    let snapshot = state.service.denied_records(&params.query()).await;
    let total = snapshot.records.len();
    Json(RecordPage::from_snapshot(snapshot, &params.pagination(), total))
}

/// `GET /records/denied/reasons`: Reason dropdown with counts.
#[utoipa::path(
    get,
    path = "/api/v1/records/denied/reasons",
    tag = "Records",
    summary = "List denial reasons",
    description = "Returns `ALL` followed by the distinct denial reasons (sorted), the total, and the count per reason.",
    responses(
        (status = 200, description = "Denial reasons", body = DenialReasons),
    )
)]
pub async fn denial_reasons(State(state): State<AppState>) -> Json<DenialReasons> {
    Json(state.service.denial_reasons().await)
}

/// `GET /occupancy`: Live occupancy per location.
#[utoipa::path(
    get,
    path = "/api/v1/occupancy",
    tag = "Records",
    summary = "Get live occupancy",
    description = "Returns the latest live and total counts per location for the selected filter.",
    responses(
        (status = 200, description = "Occupancy snapshot", body = OccupancyResponse),
    )
)]
pub async fn occupancy(State(state): State<AppState>) -> Json<OccupancyResponse> {
    Json(state.service.occupancy().await.into())
}

/// Record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/records/allowed", get(list_allowed))
        .route("/records/denied", get(list_denied))
        .route("/records/denied/reasons", get(denial_reasons))
        .route("/occupancy", get(occupancy))
}
