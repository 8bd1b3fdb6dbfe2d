//! CSV rendering of the unified activity view.

use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};

use crate::analytics::{ActivityEntry, EntryStatus};
use crate::domain::filter::DATE_FORMAT;
use crate::error::GatewayError;

/// Header row.
pub const HEADERS: [&str; 7] = [
    "Full Name",
    "BSD UID",
    "Event",
    "Location",
    "Date Time",
    "Status",
    "Denial Reason",
];

/// Renders `entries` as CSV with every field quoted.
///
/// The denial reason column is filled only for denied rows.
///
/// # Errors
///
/// Returns [`GatewayError::Export`] if the writer fails.
pub fn render_csv(entries: &[ActivityEntry]) -> Result<String, GatewayError> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    wtr.write_record(HEADERS)?;
    for entry in entries {
        let reason = match entry.status {
            EntryStatus::Denied => entry.denial_reason.as_deref().unwrap_or_default(),
            EntryStatus::Success => "",
        };
        wtr.write_record([
            entry.full_name.as_str(),
            entry.bsguid.as_deref().unwrap_or_default(),
            entry.event.as_str(),
            entry.location.as_str(),
            entry.date_time.as_str(),
            entry.status.as_str(),
            reason,
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| GatewayError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| GatewayError::Export(e.to_string()))
}

/// Download name: `<event>_analytics_<YYYY-MM-DD>.csv`, whitespace runs in
/// the event name replaced by `_`.
#[must_use]
pub fn export_filename(event_name: &str, day: NaiveDate) -> String {
    let event = event_name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{event}_analytics_{}.csv", day.format(DATE_FORMAT))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::analytics::unify;
    use crate::domain::{AttendanceRecord, DenialRecord};

    #[test]
    fn renders_header_and_quoted_rows() {
        let allowed = AttendanceRecord {
            id: 1,
            fullname: Some("Ada".to_string()),
            bsguid: Some("BS-1".to_string()),
            date_time: Some("2025-03-01T10:00:00".to_string()),
            ..AttendanceRecord::default()
        };
        let denied = DenialRecord {
            id: 2,
            full_name: Some("Bo \"B\"".to_string()),
            denial_reason: Some("EXPIRED".to_string()),
            ..DenialRecord::default()
        };
        let entries = unify(&[allowed], &[denied], "Expo");

        let Ok(csv) = render_csv(&entries) else {
            panic!("render failed");
        };
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            [
                r#""Full Name","BSD UID","Event","Location","Date Time","Status","Denial Reason""#,
                r#""Ada","BS-1","Expo","Unknown Zone","2025-03-01T10:00:00","success","""#,
                r#""Bo ""B""","","Expo","Unknown Zone","","denied","EXPIRED""#,
            ]
        );
    }

    #[test]
    fn filename_collapses_whitespace() {
        let Some(day) = NaiveDate::from_ymd_opt(2025, 3, 1) else {
            panic!("bad date");
        };
        assert_eq!(
            export_filename("Spring  Open\tDay", day),
            "Spring_Open_Day_analytics_2025-03-01.csv"
        );
    }
}
