//! Unified activity entries: allowed and denied records in one shape.

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AttendanceRecord, DenialRecord, StreamKind, SyncRecord};

/// Name shown when a record has none.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Location shown when a record has none.
pub const UNKNOWN_LOCATION: &str = "Unknown Zone";

/// Reason shown for a denial without one.
pub const DEFAULT_DENIAL_REASON: &str = "DENIED";

/// Outcome of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Admitted.
    Success,
    /// Refused.
    Denied,
}

impl EntryStatus {
    /// Wire name (`success` / `denied`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Denied => "denied",
        }
    }

    /// Chart label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success => "Authorized",
            Self::Denied => "Denied",
        }
    }
}

/// One scan, allowed or denied, with display placeholders filled in.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ActivityEntry {
    /// Stream the record came from.
    pub stream: StreamKind,
    /// Record id, unique within its stream.
    pub id: i64,
    /// Holder name.
    pub full_name: String,
    /// Holder uid.
    pub bsguid: Option<String>,
    /// Event name, falling back to the selected event.
    pub event: String,
    /// Scanner location.
    pub location: String,
    /// Timestamp as received.
    pub date_time: String,
    /// Parsed timestamp.
    #[schema(value_type = Option<String>)]
    pub timestamp: Option<NaiveDateTime>,
    /// Admitted or refused.
    pub status: EntryStatus,
    /// Denial reason; `None` for admitted scans.
    pub denial_reason: Option<String>,
}

impl ActivityEntry {
    fn from_record<R: SyncRecord>(record: &R, fallback_event: &str, status: EntryStatus) -> Self {
        let denial_reason = match status {
            EntryStatus::Success => None,
            EntryStatus::Denied => Some(
                record
                    .denial_reason()
                    .unwrap_or(DEFAULT_DENIAL_REASON)
                    .to_string(),
            ),
        };
        Self {
            stream: R::KIND,
            id: record.id(),
            full_name: record.subject_name().unwrap_or(UNKNOWN_NAME).to_string(),
            bsguid: record.subject_uid().map(str::to_string),
            event: record.event_name().unwrap_or(fallback_event).to_string(),
            location: record.location().unwrap_or(UNKNOWN_LOCATION).to_string(),
            date_time: record.raw_timestamp().unwrap_or_default().to_string(),
            timestamp: record.timestamp(),
            status,
            denial_reason,
        }
    }

    /// Builds an entry from an admitted scan.
    #[must_use]
    pub fn allowed(record: &AttendanceRecord, fallback_event: &str) -> Self {
        Self::from_record(record, fallback_event, EntryStatus::Success)
    }

    /// Builds an entry from a refused scan.
    #[must_use]
    pub fn denied(record: &DenialRecord, fallback_event: &str) -> Self {
        Self::from_record(record, fallback_event, EntryStatus::Denied)
    }

    /// `true` for refused scans.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.status == EntryStatus::Denied
    }
}

/// Allowed entries followed by denied entries, each in arrival order.
#[must_use]
pub fn unify(
    allowed: &[AttendanceRecord],
    denied: &[DenialRecord],
    fallback_event: &str,
) -> Vec<ActivityEntry> {
    allowed
        .iter()
        .map(|r| ActivityEntry::allowed(r, fallback_event))
        .chain(denied.iter().map(|r| ActivityEntry::denied(r, fallback_event)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_fill_missing_fields() {
        let allowed = AttendanceRecord {
            id: 1,
            ..AttendanceRecord::default()
        };
        let denied = DenialRecord {
            id: 1,
            ..DenialRecord::default()
        };
        let entries = unify(&[allowed], &[denied], "Orientation");

        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.full_name, UNKNOWN_NAME);
            assert_eq!(entry.location, UNKNOWN_LOCATION);
            assert_eq!(entry.event, "Orientation");
            assert!(entry.timestamp.is_none());
        }
        assert_eq!(entries.first().map(|e| e.status), Some(EntryStatus::Success));
        assert_eq!(entries.first().and_then(|e| e.denial_reason.clone()), None);
        assert_eq!(
            entries.get(1).and_then(|e| e.denial_reason.clone()).as_deref(),
            Some(DEFAULT_DENIAL_REASON)
        );
    }

    #[test]
    fn record_values_win_over_placeholders() {
        let denied = DenialRecord {
            id: 9,
            full_name: Some("Bo".to_string()),
            event_name: Some("Gala".to_string()),
            location: Some("Gate 2".to_string()),
            denial_reason: Some("EXPIRED".to_string()),
            attempted_date_time: Some("2025-03-01T10:00:05".to_string()),
            ..DenialRecord::default()
        };
        let entry = ActivityEntry::denied(&denied, "Orientation");
        assert_eq!(entry.full_name, "Bo");
        assert_eq!(entry.event, "Gala");
        assert_eq!(entry.location, "Gate 2");
        assert_eq!(entry.denial_reason.as_deref(), Some("EXPIRED"));
        assert!(entry.timestamp.is_some());
        assert!(entry.is_denied());
    }
}
