//! Attendance and denial records as returned by the upstream service.
//!
//! Records are passed through unmodified: every display field the
//! upstream may leave out is an `Option`. Placeholders such as
//! `"Unknown"` are applied only by the analytics and export views.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Timestamp layouts accepted from the upstream, tried in order after
/// RFC 3339.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The read models a dashboard session keeps in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Admitted (attendance) records.
    Allowed,
    /// Rejected (denial) records.
    Denied,
    /// Live occupancy per location.
    Occupancy,
}

impl StreamKind {
    /// Returns the stream name as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Denied => "denied",
            Self::Occupancy => "occupancy",
        }
    }

    /// Parses a stream name as used in WebSocket subscriptions.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "allowed" => Some(Self::Allowed),
            "denied" => Some(Self::Denied),
            "occupancy" => Some(Self::Occupancy),
            _ => None,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common view over attendance and denial records used by the
/// synchronizer and the analytics layer.
pub trait SyncRecord: fmt::Debug + Clone + Send + Sync + 'static {
    /// Which stream this record type belongs to.
    const KIND: StreamKind;

    /// Server-assigned identifier, the deduplication key.
    fn id(&self) -> i64;

    /// Raw timestamp string exactly as received.
    fn raw_timestamp(&self) -> Option<&str>;

    /// Name of the person associated with the event.
    fn subject_name(&self) -> Option<&str>;

    /// Identifier of the person associated with the event.
    fn subject_uid(&self) -> Option<&str>;

    /// Zone name.
    fn location(&self) -> Option<&str>;

    /// Logical event/session the record belongs to.
    fn event_name(&self) -> Option<&str>;

    /// Categorical denial reason. Always `None` for attendance records.
    fn denial_reason(&self) -> Option<&str> {
        None
    }

    /// Parsed timestamp, `None` when missing or malformed.
    fn timestamp(&self) -> Option<NaiveDateTime> {
        self.raw_timestamp().and_then(parse_timestamp)
    }
}

/// A successful scan (attendance entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    /// Server-assigned identifier.
    pub id: i64,
    /// Attendee full name.
    #[serde(default)]
    pub fullname: Option<String>,
    /// Attendee uid.
    #[serde(default)]
    pub bsguid: Option<String>,
    /// RFID card uid.
    #[serde(default)]
    pub carduid: Option<String>,
    /// Event name.
    #[serde(default)]
    pub event: Option<String>,
    /// Zone name.
    #[serde(default)]
    pub location: Option<String>,
    /// Scan timestamp.
    #[serde(default)]
    pub date_time: Option<String>,
    /// Exit flag reported by the gate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_status: Option<i32>,
    /// Exit timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
}

impl SyncRecord for AttendanceRecord {
    const KIND: StreamKind = StreamKind::Allowed;

    fn id(&self) -> i64 {
        self.id
    }

    fn raw_timestamp(&self) -> Option<&str> {
        self.date_time.as_deref()
    }

    fn subject_name(&self) -> Option<&str> {
        self.fullname.as_deref()
    }

    fn subject_uid(&self) -> Option<&str> {
        self.bsguid.as_deref()
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn event_name(&self) -> Option<&str> {
        self.event.as_deref()
    }
}

/// A rejected scan (denial entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DenialRecord {
    /// Server-assigned identifier.
    pub id: i64,
    /// RFID card uid.
    #[serde(default)]
    pub carduid: Option<String>,
    /// Attendee uid, if the card is registered.
    #[serde(default)]
    pub bsguid: Option<String>,
    /// Attendee full name, if the card is registered.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Upstream event identifier.
    #[serde(default)]
    pub event_id: Option<i64>,
    /// Event name.
    #[serde(default)]
    pub event_name: Option<String>,
    /// Zone name.
    #[serde(default)]
    pub location: Option<String>,
    /// Attempt timestamp.
    #[serde(default)]
    pub attempted_date_time: Option<String>,
    /// Reason code, e.g. `"OUTSIDE_WINDOW"`.
    #[serde(default)]
    pub denial_reason: Option<String>,
    /// Participant category.
    #[serde(default)]
    pub participant_type: Option<String>,
    /// Start of the allowed entry window.
    #[serde(default)]
    pub entry_from: Option<String>,
    /// End of the allowed entry window.
    #[serde(default)]
    pub entry_till: Option<String>,
    /// Upstream row creation time.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SyncRecord for DenialRecord {
    const KIND: StreamKind = StreamKind::Denied;

    fn id(&self) -> i64 {
        self.id
    }

    fn raw_timestamp(&self) -> Option<&str> {
        self.attempted_date_time.as_deref()
    }

    fn subject_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    fn subject_uid(&self) -> Option<&str> {
        self.bsguid.as_deref()
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    fn denial_reason(&self) -> Option<&str> {
        self.denial_reason.as_deref()
    }
}

/// Parses an upstream timestamp into local wall-clock time.
///
/// Accepts RFC 3339 (converted to the local timezone) and the naive
/// `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]` layouts. Returns `None` for blank
/// or unparseable input.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
