//! WebSocket push of sync events.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use common::{UpstreamState, allowed, config_for, spawn_upstream};
use rollcall_gateway::api::build_app;
use rollcall_gateway::app_state::AppState;

type Client = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("no websocket message");
        };
        if let Message::Text(text) = msg {
            let Ok(json) = serde_json::from_str(text.as_str()) else {
                panic!("bad json");
            };
            return json;
        }
    }
}

async fn next_event(ws: &mut Client, event_type: &str) -> Value {
    loop {
        let msg = next_json(ws).await;
        if msg["type"] == "event" && msg["payload"]["event_type"] == event_type {
            return msg;
        }
    }
}

#[tokio::test]
async fn subscribed_client_receives_sync_events() {
    let (upstream, _) = spawn_upstream(UpstreamState {
        allowed: vec![allowed(1, "Ada", "10:00:00")],
        ..UpstreamState::default()
    })
    .await;
    let Ok(state) = AppState::from_config(&config_for(upstream)) else {
        panic!("state wiring failed");
    };
    let service = std::sync::Arc::clone(&state.service);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no addr");
    };
    let app = build_app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": "2026-01-03T10:00:00Z",
        "payload": { "command": "subscribe", "streams": ["allowed"] }
    });
    let Ok(()) = ws.send(Message::text(subscribe.to_string())).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["payload"]["subscribed"], json!(["allowed"]));

    let Ok(_) = service.select_filter("Expo Day", Some("2026-01-03")).await else {
        panic!("select failed");
    };

    let changed = next_event(&mut ws, "filter_changed").await;
    assert_eq!(changed["payload"]["filter"]["event_name"], "Expo Day");

    let resynced = next_event(&mut ws, "resynced").await;
    assert_eq!(resynced["payload"]["stream"], "allowed");
    assert_eq!(resynced["payload"]["record_count"], 1);
}

#[tokio::test]
async fn malformed_message_gets_error_reply() {
    let (upstream, _) = spawn_upstream(UpstreamState::default()).await;
    let Ok(state) = AppState::from_config(&config_for(upstream)) else {
        panic!("state wiring failed");
    };
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no addr");
    };
    let app = build_app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    let Ok(()) = ws.send(Message::text("not json")).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut ws).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 400);
}
