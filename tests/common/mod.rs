//! In-process fake of the upstream attendance service.

#![allow(dead_code, clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use rollcall_gateway::config::GatewayConfig;

/// Mutable upstream tables plus a log of what the gateway asked for.
#[derive(Debug, Default)]
pub struct UpstreamState {
    pub allowed: Vec<Value>,
    pub denied: Vec<Value>,
    pub failing: bool,
    pub time_params: Vec<String>,
    pub auth_headers: Vec<Option<String>>,
}

pub type Shared = Arc<Mutex<UpstreamState>>;

pub fn allowed(id: i64, name: &str, time: &str) -> Value {
    json!({
        "id": id,
        "fullname": name,
        "bsguid": format!("BS-{id}"),
        "event": "Expo Day",
        "location": "Hall A",
        "date_time": format!("2026-01-03T{time}"),
    })
}

pub fn denied(id: i64, name: &str, time: &str, reason: &str) -> Value {
    json!({
        "id": id,
        "full_name": name,
        "bsguid": format!("BD-{id}"),
        "event_name": "Expo Day",
        "location": "Gate",
        "attempted_date_time": format!("2026-01-03T{time}"),
        "denial_reason": reason,
    })
}

fn time_of(record: &Value, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| s.split('T').nth(1))
        .unwrap_or_default()
        .to_string()
}

async fn search(
    state: &Shared,
    headers: &HeaderMap,
    denied: bool,
    after: Option<&String>,
) -> axum::response::Response {
    let mut upstream = state.lock().await;
    upstream.auth_headers.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    if upstream.failing {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "database unavailable" })),
        )
            .into_response();
    }
    if let Some(time) = after {
        upstream.time_params.push(time.clone());
    }
    let (rows, field) = if denied {
        (&upstream.denied, "attempted_date_time")
    } else {
        (&upstream.allowed, "date_time")
    };
    let rows: Vec<Value> = rows
        .iter()
        .filter(|r| after.is_none_or(|t| time_of(r, field) > *t))
        .cloned()
        .collect();
    Json(rows).into_response()
}

async fn allowed_all(State(s): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    search(&s, &headers, false, None).await
}

async fn allowed_after(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    search(&s, &headers, false, q.get("time")).await
}

async fn denied_all(State(s): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    search(&s, &headers, true, None).await
}

async fn denied_after(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    search(&s, &headers, true, q.get("time")).await
}

async fn occupancy() -> Json<Value> {
    Json(json!([{ "location": "Hall A", "liveCount": 3, "totalCount": 9 }]))
}

async fn signin(Json(body): Json<Value>) -> impl IntoResponse {
    if body.get("password").and_then(Value::as_str) == Some("pw") {
        (StatusCode::OK, Json(json!({ "token": "tok-123" })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn logout() -> Json<Value> {
    Json(json!({ "message": "logged out" }))
}

/// Starts the fake upstream and returns its address and shared state.
pub async fn spawn_upstream(state: UpstreamState) -> (SocketAddr, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/api/attendance/admin/search/by-event-and-date", get(allowed_all))
        .route(
            "/api/attendance/admin/search/by-event-date-and-time-after",
            get(allowed_after),
        )
        .route("/api/attendance/denied/admin/search/by-event-and-date", get(denied_all))
        .route(
            "/api/attendance/denied/admin/search/by-event-date-and-time-after",
            get(denied_after),
        )
        .route("/api/attendance/admin/search/live-occupancy", get(occupancy))
        .route("/api/auth/signin", post(signin))
        .route("/api/auth/logout", post(logout))
        .with_state(Arc::clone(&shared));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, shared)
}

/// Gateway configuration pointing at `upstream`, with a timer slow
/// enough that tests drive polling through refresh.
pub fn config_for(upstream: SocketAddr) -> GatewayConfig {
    let Ok(listen_addr) = "127.0.0.1:0".parse() else {
        panic!("bad listen addr");
    };
    GatewayConfig {
        listen_addr,
        upstream_base_url: format!("http://{upstream}/api"),
        upstream_token: None,
        upstream_timeout_secs: 5,
        poll_interval_ms: 3_600_000,
        occupancy_enabled: true,
        default_event_name: None,
        event_bus_capacity: 256,
    }
}
