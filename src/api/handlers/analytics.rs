//! Analytics and CSV export handlers.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::analytics::AnalyticsReport;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /analytics`: Aggregations over allowed and denied records.
#[utoipa::path(
    get,
    path = "/api/v1/analytics",
    tag = "Analytics",
    summary = "Get analytics",
    description = "Returns KPIs, zone, status, hourly and daily distributions, recent activity and security alerts over the merged allowed and denied records. Every section is empty without data.",
    responses(
        (status = 200, description = "Analytics report", body = AnalyticsReport),
    )
)]
pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsReport> {
    Json(state.service.analytics().await)
}

/// `GET /export.csv`: Download the merged records as CSV.
///
/// # Errors
///
/// Returns [`GatewayError::NoActiveFilter`] or [`GatewayError::NoData`]
/// when there is nothing to export.
#[utoipa::path(
    get,
    path = "/api/v1/export.csv",
    tag = "Analytics",
    summary = "Export CSV",
    description = "Renders the merged allowed and denied records as CSV with every field quoted.",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 409, description = "No filter selected or no data", body = ErrorResponse),
    )
)]
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    let export = state.service.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    ))
}

/// Analytics routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(get_analytics))
        .route("/export.csv", get(export_csv))
}
