//! # rollcall-gateway
//!
//! Dashboard gateway for an RFID access-control and attendance service.
//!
//! The gateway keeps a local, deduplicated copy of the attendance
//! ("allowed") and denial records of one selected event/date by polling
//! the upstream service: a full snapshot first, then only the records
//! newer than the last-seen time of day. Browser dashboards read
//! snapshots, aggregations and CSV exports over REST and receive sync
//! events over WebSocket. Admission decisions, card lifecycle and
//! scanning all live upstream: this service only queries them.
//!
//! ## Architecture
//!
//! ```text
//! Browser dashboards (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── DashboardService (service/)
//!     ├── PollScheduler ── DashboardSession (sync/)
//!     │                      ├── StreamSynchronizer<allowed>
//!     │                      ├── StreamSynchronizer<denied>
//!     │                      └── OccupancyTracker
//!     ├── EventBus (domain/)
//!     │
//!     ├── Analytics + CSV export (analytics/, export/)
//!     │
//!     └── Upstream attendance service (upstream/, reqwest)
//! ```

pub mod analytics;
pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod service;
pub mod sync;
pub mod upstream;
pub mod ws;
