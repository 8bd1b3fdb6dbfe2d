//! Dashboard aggregations over unified activity entries.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Timelike;
use serde::Serialize;
use utoipa::ToSchema;

use super::entry::{ActivityEntry, EntryStatus};

/// Entries listed under recent activity.
pub const RECENT_LIMIT: usize = 5;

/// Denied entries listed under security alerts.
pub const ALERT_LIMIT: usize = 3;

/// Headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Kpis {
    /// Allowed plus denied scans.
    pub total_records: usize,
    /// Distinct holder uids.
    pub unique_users: usize,
    /// Share of admitted scans in percent, rounded; 0 without data.
    pub success_rate: u32,
    /// Distinct locations.
    pub active_locations: usize,
    /// Refused scans.
    pub denied_count: usize,
}

/// Count for one chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Bucket {
    /// Bucket label.
    pub name: String,
    /// Entries in the bucket.
    pub value: usize,
}

/// Everything the analytics page shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsReport {
    /// Headline numbers.
    pub kpis: Kpis,
    /// Entries per location, busiest first.
    pub zones: Vec<Bucket>,
    /// `Authorized` and `Denied` counts.
    pub statuses: Vec<Bucket>,
    /// Entries per hour of day, `12AM` through `11PM`.
    pub hourly: Vec<Bucket>,
    /// Entries per calendar date (`YYYY-MM-DD`), oldest first.
    pub daily: Vec<Bucket>,
    /// Latest entries, newest first.
    pub recent: Vec<ActivityEntry>,
    /// Latest denied entries, newest first.
    pub alerts: Vec<ActivityEntry>,
}

impl AnalyticsReport {
    /// Aggregates `entries`. Without entries every section is empty.
    #[must_use]
    pub fn build(entries: &[ActivityEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }
        Self {
            kpis: kpis(entries),
            zones: zone_distribution(entries),
            statuses: status_distribution(entries),
            hourly: hourly_trend(entries),
            daily: daily_distribution(entries),
            recent: latest(entries.iter(), RECENT_LIMIT),
            alerts: latest(entries.iter().filter(|e| e.is_denied()), ALERT_LIMIT),
        }
    }
}

/// Headline numbers for `entries`.
#[must_use]
pub fn kpis(entries: &[ActivityEntry]) -> Kpis {
    let total = entries.len();
    let denied = entries.iter().filter(|e| e.is_denied()).count();
    let users: HashSet<Option<&str>> = entries.iter().map(|e| e.bsguid.as_deref()).collect();
    let locations: HashSet<&str> = entries.iter().map(|e| e.location.as_str()).collect();
    Kpis {
        total_records: total,
        unique_users: users.len(),
        success_rate: success_rate(total.saturating_sub(denied), total),
        active_locations: locations.len(),
        denied_count: denied,
    }
}

/// `success / total` in percent, rounded half up.
fn success_rate(success: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rate = (success.saturating_mul(200) + total) / total.saturating_mul(2);
    u32::try_from(rate).unwrap_or(100)
}

/// Entries per location, busiest first; ties keep first appearance.
#[must_use]
pub fn zone_distribution(entries: &[ActivityEntry]) -> Vec<Bucket> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        let count = counts.entry(entry.location.as_str()).or_insert_with(|| {
            order.push(entry.location.as_str());
            0
        });
        *count += 1;
    }
    let mut zones: Vec<Bucket> = order
        .into_iter()
        .map(|name| Bucket {
            name: name.to_string(),
            value: counts.get(name).copied().unwrap_or_default(),
        })
        .collect();
    zones.sort_by_key(|b| Reverse(b.value));
    zones
}

/// `Authorized` and `Denied` counts.
#[must_use]
pub fn status_distribution(entries: &[ActivityEntry]) -> Vec<Bucket> {
    let denied = entries.iter().filter(|e| e.is_denied()).count();
    vec![
        Bucket {
            name: EntryStatus::Success.label().to_string(),
            value: entries.len() - denied,
        },
        Bucket {
            name: EntryStatus::Denied.label().to_string(),
            value: denied,
        },
    ]
}

/// 12-hour clock label for an hour of day.
#[must_use]
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12AM".to_string(),
        1..=11 => format!("{hour}AM"),
        12 => "12PM".to_string(),
        _ => format!("{}PM", hour - 12),
    }
}

/// Entries per hour of day, all 24 buckets. Entries without a parsable
/// timestamp are left out.
#[must_use]
pub fn hourly_trend(entries: &[ActivityEntry]) -> Vec<Bucket> {
    let mut hours = [0_usize; 24];
    for ts in entries.iter().filter_map(|e| e.timestamp) {
        if let Some(slot) = hours.get_mut(ts.hour() as usize) {
            *slot += 1;
        }
    }
    (0_u32..)
        .zip(hours)
        .map(|(hour, value)| Bucket {
            name: hour_label(hour),
            value,
        })
        .collect()
}

/// Entries per calendar date, oldest first.
#[must_use]
pub fn daily_distribution(entries: &[ActivityEntry]) -> Vec<Bucket> {
    let mut days = BTreeMap::new();
    for ts in entries.iter().filter_map(|e| e.timestamp) {
        *days.entry(ts.date()).or_insert(0_usize) += 1;
    }
    days.into_iter()
        .map(|(date, value)| Bucket {
            name: date.format(crate::domain::filter::DATE_FORMAT).to_string(),
            value,
        })
        .collect()
}

/// The `limit` newest entries. Entries without a timestamp sort last.
fn latest<'a>(entries: impl Iterator<Item = &'a ActivityEntry>, limit: usize) -> Vec<ActivityEntry> {
    let mut sorted: Vec<&ActivityEntry> = entries.collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::entry::unify;
    use crate::domain::{AttendanceRecord, DenialRecord};

    fn allowed(id: i64, uid: &str, location: &str, at: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            bsguid: Some(uid.to_string()),
            location: Some(location.to_string()),
            date_time: Some(at.to_string()),
            ..AttendanceRecord::default()
        }
    }

    fn denied(id: i64, uid: &str, at: &str) -> DenialRecord {
        DenialRecord {
            id,
            bsguid: Some(uid.to_string()),
            location: Some("Gate".to_string()),
            attempted_date_time: Some(at.to_string()),
            ..DenialRecord::default()
        }
    }

    fn sample() -> Vec<ActivityEntry> {
        unify(
            &[
                allowed(1, "u1", "Hall", "2025-03-01T00:15:00"),
                allowed(2, "u2", "Hall", "2025-03-01T09:30:00"),
                allowed(3, "u1", "Gate", "2025-03-01T13:05:00"),
            ],
            &[denied(1, "u3", "2025-03-01T13:10:00")],
            "Expo",
        )
    }

    #[test]
    fn empty_input_gives_empty_report() {
        assert_eq!(AnalyticsReport::build(&[]), AnalyticsReport::default());
        assert_eq!(kpis(&[]).success_rate, 0);
    }

    #[test]
    fn kpis_count_users_locations_and_rate() {
        let k = kpis(&sample());
        assert_eq!(k.total_records, 4);
        assert_eq!(k.unique_users, 3);
        assert_eq!(k.active_locations, 2);
        assert_eq!(k.denied_count, 1);
        assert_eq!(k.success_rate, 75);
    }

    #[test]
    fn success_rate_rounds_half_up() {
        assert_eq!(success_rate(2, 3), 67);
        assert_eq!(success_rate(1, 3), 33);
        assert_eq!(success_rate(1, 8), 13);
        assert_eq!(success_rate(5, 5), 100);
    }

    #[test]
    fn zones_sorted_busiest_first() {
        let zones = zone_distribution(&sample());
        let names: Vec<&str> = zones.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Hall", "Gate"]);
        assert!(zones.iter().all(|b| b.value == 2));
    }

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0), "12AM");
        assert_eq!(hour_label(11), "11AM");
        assert_eq!(hour_label(12), "12PM");
        assert_eq!(hour_label(23), "11PM");
    }

    #[test]
    fn hourly_trend_has_all_buckets() {
        let hourly = hourly_trend(&sample());
        assert_eq!(hourly.len(), 24);
        assert_eq!(hourly.first().map(|b| b.value), Some(1));
        assert_eq!(hourly.get(13).map(|b| (b.name.as_str(), b.value)), Some(("1PM", 2)));
        assert_eq!(hourly.iter().map(|b| b.value).sum::<usize>(), 4);
    }

    #[test]
    fn recent_and_alerts_are_newest_first() {
        let report = AnalyticsReport::build(&sample());
        let recent: Vec<(bool, i64)> = report.recent.iter().map(|e| (e.is_denied(), e.id)).collect();
        assert_eq!(recent, [(true, 1), (false, 3), (false, 2), (false, 1)]);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily.first().map(|b| b.name.as_str()), Some("2025-03-01"));
        assert_eq!(report.statuses.first().map(|b| b.value), Some(3));
    }
}
