//! Session DTOs: filter selection and synchronization status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::StreamKind;
use crate::sync::{SessionStatus, StreamStatus};

/// Request body for `PUT /session/filter`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SelectFilterRequest {
    /// Event to track.
    pub event_name: String,
    /// Calendar date (`YYYY-MM-DD`); today when omitted.
    #[serde(default)]
    pub date: Option<String>,
}

/// Synchronization state of one stream.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StreamStatusDto {
    /// Stream kind.
    pub stream: StreamKind,
    /// `uninitialized` or `synchronized`.
    pub phase: String,
    /// Time-of-day cursor (`HH:MM:SS`).
    pub cursor: Option<String>,
    /// Records held.
    pub record_count: usize,
    /// Last applied fetch.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl From<StreamStatus> for StreamStatusDto {
    fn from(status: StreamStatus) -> Self {
        Self {
            stream: status.stream,
            phase: status.phase.as_str().to_string(),
            cursor: status.phase.cursor().map(|c| c.to_string()),
            record_count: status.record_count,
            last_synced_at: status.last_synced_at,
        }
    }
}

/// Response body of the session endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatusResponse {
    /// Whether a filter is selected.
    pub active: bool,
    /// Selected event.
    pub event_name: Option<String>,
    /// Selected date.
    pub date: Option<String>,
    /// Whether the polling timer runs.
    pub polling: bool,
    /// Allowed stream.
    pub allowed: StreamStatusDto,
    /// Denied stream.
    pub denied: StreamStatusDto,
    /// Last occupancy refresh.
    pub occupancy_refreshed_at: Option<DateTime<Utc>>,
}

impl SessionStatusResponse {
    /// Builds the response from a session summary.
    #[must_use]
    pub fn new(status: SessionStatus, polling: bool) -> Self {
        Self {
            active: status.filter.is_some(),
            event_name: status.filter.as_ref().map(|f| f.event_name().to_string()),
            date: status.filter.as_ref().map(|f| f.date_param()),
            polling,
            allowed: status.allowed.into(),
            denied: status.denied.into(),
            occupancy_refreshed_at: status.occupancy_refreshed_at,
        }
    }
}
