//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no active filter: select an event first",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | Session state   | 409 Conflict                 |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 5000–5999 | Upstream        | 502 Bad Gateway / upstream 4xx |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Event name or date could not be turned into a filter.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The operation needs a selected event and none is active.
    #[error("no active filter: select an event first")]
    NoActiveFilter,

    /// The operation needs records and the session holds none.
    #[error("no records available for the active filter")]
    NoData,

    /// Transport-level failure talking to the upstream service.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// The upstream service answered with a non-2xx status.
    #[error("upstream returned {status}: {message}")]
    UpstreamStatus {
        /// HTTP status code returned by the upstream.
        status: u16,
        /// Upstream `message` field, or the raw body.
        message: String,
    },

    /// CSV rendering failed.
    #[error("export error: {0}")]
    Export(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidFilter(_) => 1002,
            Self::NoActiveFilter => 2001,
            Self::NoData => 2002,
            Self::Internal(_) => 3000,
            Self::Export(_) => 3001,
            Self::Upstream(_) => 5001,
            Self::UpstreamStatus { .. } => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    ///
    /// Upstream client errors (4xx) keep their status so one-shot actions
    /// such as sign-in surface e.g. `401` unchanged; everything else from
    /// the upstream maps to `502`.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            Self::NoActiveFilter | Self::NoData => StatusCode::CONFLICT,
            Self::Export(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamStatus { status, .. } => match StatusCode::from_u16(*status) {
                Ok(code) if code.is_client_error() => code,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

impl From<csv::Error> for GatewayError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_request() {
        let err = GatewayError::InvalidFilter("bad date".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn session_errors_are_conflict() {
        assert_eq!(GatewayError::NoActiveFilter.status_code(), StatusCode::CONFLICT);
        assert_eq!(GatewayError::NoData.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn upstream_client_errors_pass_through() {
        let err = GatewayError::UpstreamStatus {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn upstream_server_errors_become_bad_gateway() {
        let err = GatewayError::UpstreamStatus {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn into_response_sets_status() {
        let response = GatewayError::NoData.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
