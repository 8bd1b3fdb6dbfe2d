//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes sync events (snapshots, merged
//! deltas, occupancy updates, fetch failures) to dashboards, filtered by
//! the streams each client subscribed to.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
