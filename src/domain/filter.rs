//! The `(event name, date)` pair scoping a synchronization session.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Date layout used on the wire (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Selects which records a synchronizer tracks.
///
/// A filter whose event name is blank (empty or whitespace only) is
/// *inactive*: synchronizers treat it as "nothing selected" and never
/// hit the network for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncFilter {
    event_name: String,
    date: NaiveDate,
}

impl SyncFilter {
    /// Creates a filter for the given event and calendar date.
    #[must_use]
    pub fn new(event_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            event_name: event_name.into(),
            date,
        }
    }

    /// Creates a filter for the given event on today's local date.
    #[must_use]
    pub fn today(event_name: impl Into<String>) -> Self {
        Self::new(event_name, Local::now().date_naive())
    }

    /// Builds a filter from request input. A missing date means today.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidFilter`] if `date` is present but not
    /// a valid `YYYY-MM-DD` calendar date.
    pub fn parse(event_name: &str, date: Option<&str>) -> Result<Self, GatewayError> {
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                GatewayError::InvalidFilter(format!("date {raw:?} is not YYYY-MM-DD: {e}"))
            })?,
            None => Local::now().date_naive(),
        };
        Ok(Self::new(event_name, date))
    }

    /// Event name as entered.
    #[must_use]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date formatted for upstream query parameters.
    #[must_use]
    pub fn date_param(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// `false` when the event name is blank.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.event_name.trim().is_empty()
    }
}

impl fmt::Display for SyncFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.event_name, self.date.format(DATE_FORMAT))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn jan3() -> NaiveDate {
        let Some(d) = NaiveDate::from_ymd_opt(2026, 1, 3) else {
            panic!("valid date");
        };
        d
    }

    #[test]
    fn blank_event_is_inactive() {
        assert!(!SyncFilter::new("", jan3()).is_active());
        assert!(!SyncFilter::new("   \t", jan3()).is_active());
        assert!(SyncFilter::new("Orientation", jan3()).is_active());
    }

    #[test]
    fn parse_accepts_iso_date() {
        let Ok(filter) = SyncFilter::parse("Orientation", Some("2026-01-03")) else {
            panic!("expected valid filter");
        };
        assert_eq!(filter.date(), jan3());
        assert_eq!(filter.date_param(), "2026-01-03");
        assert_eq!(filter.to_string(), "Orientation@2026-01-03");
    }

    #[test]
    fn parse_defaults_to_today() {
        let Ok(filter) = SyncFilter::parse("Orientation", None) else {
            panic!("expected valid filter");
        };
        assert_eq!(filter.date(), Local::now().date_naive());

        let Ok(blank_date) = SyncFilter::parse("Orientation", Some("  ")) else {
            panic!("expected valid filter");
        };
        assert_eq!(blank_date.date(), Local::now().date_naive());
    }

    #[test]
    fn parse_rejects_bad_date() {
        assert!(SyncFilter::parse("Orientation", Some("03/01/2026")).is_err());
        assert!(SyncFilter::parse("Orientation", Some("2026-02-30")).is_err());
    }

    #[test]
    fn filters_differ_by_event_or_date() {
        let a = SyncFilter::new("A", jan3());
        let b = SyncFilter::new("B", jan3());
        let a_next = SyncFilter::new("A", jan3().succ_opt().unwrap_or(jan3()));
        assert_ne!(a, b);
        assert_ne!(a, a_next);
    }
}
