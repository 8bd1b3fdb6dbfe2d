//! Auth passthrough handlers.
//!
//! Upstream answers are returned as-is; upstream client errors keep their
//! status code.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::upstream::{ResendOtpRequest, SigninRequest, SignupRequest, VerifyOtpRequest};

/// `POST /auth/signup`: Register an account.
///
/// # Errors
///
/// Returns the upstream failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Auth",
    summary = "Sign up",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Upstream answer", body = serde_json::Value),
        (status = 502, description = "Upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.auth.signup(&req).await.map(Json)
}

/// `POST /auth/verify-otp`: Confirm an account.
///
/// # Errors
///
/// Returns the upstream failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-otp",
    tag = "Auth",
    summary = "Verify OTP",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Upstream answer", body = serde_json::Value),
        (status = 502, description = "Upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.auth.verify_otp(&req).await.map(Json)
}

/// `POST /auth/resend-otp`: Send a fresh OTP.
///
/// # Errors
///
/// Returns the upstream failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-otp",
    tag = "Auth",
    summary = "Resend OTP",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Upstream answer", body = serde_json::Value),
        (status = 502, description = "Upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(req): Json<ResendOtpRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.auth.resend_otp(&req).await.map(Json)
}

/// `POST /auth/signin`: Sign in and keep the bearer token.
///
/// # Errors
///
/// Returns the upstream failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/signin",
    tag = "Auth",
    summary = "Sign in",
    description = "Forwards the credentials; a `token` in the answer authorizes all later upstream requests.",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Upstream answer", body = serde_json::Value),
        (status = 401, description = "Rejected credentials", body = ErrorResponse),
        (status = 502, description = "Upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    state.auth.signin(&req).await.map(Json)
}

/// `POST /auth/logout`: Sign out and drop the bearer token.
///
/// # Errors
///
/// Returns the upstream failure.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    summary = "Log out",
    responses(
        (status = 200, description = "Upstream answer", body = serde_json::Value),
        (status = 502, description = "Upstream unreachable", body = ErrorResponse),
    )
)]
pub async fn logout(State(state): State<AppState>) -> Result<Json<serde_json::Value>, GatewayError> {
    state.auth.logout().await.map(Json)
}

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/resend-otp", post(resend_otp))
        .route("/auth/signin", post(signin))
        .route("/auth/logout", post(logout))
}
