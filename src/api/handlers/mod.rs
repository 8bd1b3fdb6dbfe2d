//! REST endpoint handlers organized by resource.

pub mod analytics;
pub mod auth;
pub mod records;
pub mod session;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(session::routes())
        .merge(records::routes())
        .merge(analytics::routes())
        .merge(auth::routes())
}
