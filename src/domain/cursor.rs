//! Synchronization cursor and the two-state phase machine built on it.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::record::SyncRecord;
use crate::error::GatewayError;

/// Wire layout of a cursor (`HH:MM:SS`).
pub const CURSOR_FORMAT: &str = "%H:%M:%S";

/// Last-seen time of day for one record stream.
///
/// Second precision: sub-second parts of record timestamps are dropped,
/// matching what the upstream delta query accepts. Serialized as an
/// `HH:MM:SS` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncCursor(NaiveTime);

impl SyncCursor {
    /// Builds a cursor from a time of day, truncated to whole seconds.
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        Self(time.with_nanosecond(0).unwrap_or(time))
    }

    /// Builds a cursor from the time-of-day part of a timestamp.
    #[must_use]
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        Self::from_time(ts.time())
    }

    /// Returns the cursor as a [`NaiveTime`].
    #[must_use]
    pub const fn as_time(&self) -> NaiveTime {
        self.0
    }

    /// Formats the cursor as an upstream query parameter.
    #[must_use]
    pub fn to_param(&self) -> String {
        self.0.format(CURSOR_FORMAT).to_string()
    }

    /// Returns the later of `self` and `candidate`, so a cursor never
    /// moves backwards.
    #[must_use]
    pub fn advance(self, candidate: Option<Self>) -> Self {
        candidate.map_or(self, |c| self.max(c))
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CURSOR_FORMAT))
    }
}

impl FromStr for SyncCursor {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), CURSOR_FORMAT)
            .map(Self::from_time)
            .map_err(|e| GatewayError::InvalidRequest(format!("invalid cursor {s:?}: {e}")))
    }
}

impl Serialize for SyncCursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SyncCursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Returns the cursor for the latest parseable timestamp in `batch`.
///
/// Records with a missing or malformed timestamp are skipped (and
/// logged); they never become the cursor source. `None` when the batch
/// carries no usable timestamp at all.
#[must_use]
pub fn latest_cursor<R: SyncRecord>(batch: &[R]) -> Option<SyncCursor> {
    let mut latest: Option<NaiveDateTime> = None;
    for record in batch {
        match record.timestamp() {
            Some(ts) => latest = Some(latest.map_or(ts, |cur| cur.max(ts))),
            None => tracing::warn!(
                stream = %R::KIND,
                id = record.id(),
                raw = ?record.raw_timestamp(),
                "record timestamp missing or unparseable; skipped for cursor"
            ),
        }
    }
    latest.map(SyncCursor::from_timestamp)
}

/// Synchronization phase of one stream.
///
/// `Uninitialized` until an initial snapshot yields a cursor, then
/// `Synchronized` for the rest of the filter's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "cursor", rename_all = "snake_case")]
pub enum SyncPhase {
    /// No cursor yet: the next poll is a full fetch.
    Uninitialized,
    /// Cursor set: the next poll is a delta fetch.
    Synchronized(SyncCursor),
}

impl SyncPhase {
    /// Maps an optional cursor onto a phase.
    #[must_use]
    pub const fn from_cursor(cursor: Option<SyncCursor>) -> Self {
        match cursor {
            Some(c) => Self::Synchronized(c),
            None => Self::Uninitialized,
        }
    }

    /// The cursor, if synchronized.
    #[must_use]
    pub const fn cursor(&self) -> Option<SyncCursor> {
        match self {
            Self::Synchronized(c) => Some(*c),
            Self::Uninitialized => None,
        }
    }

    /// Returns the phase name as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Synchronized(_) => "synchronized",
        }
    }
}
