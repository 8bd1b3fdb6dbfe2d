//! Events emitted by the synchronizers.
//!
//! Every state change and every fetch failure is published as a
//! [`SyncEvent`] through the [`super::EventBus`] and pushed to WebSocket
//! subscribers. `FetchFailed` is the user-visible failure notification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{LocationOccupancy, StreamKind, SyncCursor, SyncFilter};

/// Event emitted after a synchronizer changes state or fails to fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The session filter was selected, replaced or cleared.
    FilterChanged {
        /// New filter, `None` when cleared.
        filter: Option<SyncFilter>,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A full snapshot replaced a stream's collection.
    Resynced {
        /// Stream that was reloaded.
        stream: StreamKind,
        /// Filter the snapshot belongs to.
        filter: SyncFilter,
        /// Collection size after the reload.
        record_count: usize,
        /// Cursor after the reload.
        cursor: Option<SyncCursor>,
        /// Apply timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A non-empty delta was merged into a stream's collection.
    RecordsMerged {
        /// Stream that received records.
        stream: StreamKind,
        /// Filter the delta belongs to.
        filter: SyncFilter,
        /// Records with previously unseen ids.
        inserted: usize,
        /// Records that replaced an existing id.
        replaced: usize,
        /// Collection size after the merge.
        record_count: usize,
        /// Cursor after the merge.
        cursor: Option<SyncCursor>,
        /// Apply timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Occupancy was refreshed.
    OccupancyUpdated {
        /// Filter the snapshot belongs to.
        filter: SyncFilter,
        /// Per-location counts.
        locations: Vec<LocationOccupancy>,
        /// Refresh timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A fetch failed; state was left untouched.
    FetchFailed {
        /// Stream whose fetch failed.
        stream: StreamKind,
        /// Filter that was being fetched.
        filter: SyncFilter,
        /// Human-readable failure message.
        message: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl SyncEvent {
    /// Returns the stream this event concerns, `None` for session-wide
    /// events.
    #[must_use]
    pub const fn stream(&self) -> Option<StreamKind> {
        match self {
            Self::FilterChanged { .. } => None,
            Self::Resynced { stream, .. }
            | Self::RecordsMerged { stream, .. }
            | Self::FetchFailed { stream, .. } => Some(*stream),
            Self::OccupancyUpdated { .. } => Some(StreamKind::Occupancy),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::FilterChanged { .. } => "filter_changed",
            Self::Resynced { .. } => "resynced",
            Self::RecordsMerged { .. } => "records_merged",
            Self::OccupancyUpdated { .. } => "occupancy_updated",
            Self::FetchFailed { .. } => "fetch_failed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failed_serializes_with_tag() {
        let event = SyncEvent::FetchFailed {
            stream: StreamKind::Denied,
            filter: SyncFilter::today("Orientation"),
            message: "upstream returned 503".to_string(),
            timestamp: Utc::now(),
        };
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serialization failed");
        };
        assert!(json.contains("\"event_type\":\"fetch_failed\""));
        assert!(json.contains("\"stream\":\"denied\""));
        assert!(json.contains("Orientation"));
    }

    #[test]
    fn stream_accessor() {
        let changed = SyncEvent::FilterChanged {
            filter: None,
            timestamp: Utc::now(),
        };
        assert_eq!(changed.stream(), None);
        assert_eq!(changed.event_type_str(), "filter_changed");

        let occ = SyncEvent::OccupancyUpdated {
            filter: SyncFilter::today("X"),
            locations: Vec::new(),
            timestamp: Utc::now(),
        };
        assert_eq!(occ.stream(), Some(StreamKind::Occupancy));
    }
}
