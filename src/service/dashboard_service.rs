//! Dashboard service: filter selection, on-demand refresh and read views.

use std::sync::Arc;

use chrono::Utc;

use crate::analytics::{ActivityEntry, AnalyticsReport, DenialQuery, DenialReasons, unify};
use crate::domain::{AttendanceRecord, DenialRecord, EventBus, SyncFilter};
use crate::error::GatewayError;
use crate::export::{export_filename, render_csv};
use crate::sync::{
    DashboardSession, OccupancySnapshot, PollScheduler, SessionStatus, StreamSnapshot,
};
use crate::upstream::{
    HttpAttendanceSource, HttpDenialSource, HttpOccupancySource, OccupancySource, RecordSource,
};

/// A rendered CSV download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested file name.
    pub filename: String,
    /// CSV text.
    pub body: String,
}

/// Orchestration layer for the dashboard.
///
/// Owns the [`DashboardSession`] and the [`PollScheduler`] that drives it.
/// Selecting a filter resets every stream and re-arms the timer so the
/// first poll for the new filter runs immediately; clearing the filter
/// stops polling altogether.
#[derive(Debug)]
pub struct DashboardService<A = HttpAttendanceSource, D = HttpDenialSource, O = HttpOccupancySource>
where
    A: RecordSource<Record = AttendanceRecord>,
    D: RecordSource<Record = DenialRecord>,
    O: OccupancySource,
{
    session: Arc<DashboardSession<A, D, O>>,
    scheduler: PollScheduler,
    event_bus: EventBus,
}

impl<A, D, O> DashboardService<A, D, O>
where
    A: RecordSource<Record = AttendanceRecord>,
    D: RecordSource<Record = DenialRecord>,
    O: OccupancySource,
{
    /// Creates a new `DashboardService`.
    #[must_use]
    pub fn new(
        session: Arc<DashboardSession<A, D, O>>,
        scheduler: PollScheduler,
        event_bus: EventBus,
    ) -> Self {
        Self {
            session,
            scheduler,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the session driven by this service.
    #[must_use]
    pub const fn session(&self) -> &Arc<DashboardSession<A, D, O>> {
        &self.session
    }

    /// Selects the event (and date, today when omitted) to track.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidFilter`] for a blank event name or
    /// an unparsable date.
    pub async fn select_filter(
        &self,
        event_name: &str,
        date: Option<&str>,
    ) -> Result<SessionStatus, GatewayError> {
        let filter = SyncFilter::parse(event_name, date)?;
        if !filter.is_active() {
            return Err(GatewayError::InvalidFilter(
                "event name must not be blank".to_string(),
            ));
        }

        self.scheduler.stop().await;
        self.session.set_filter(Some(filter)).await;
        self.scheduler.start(Arc::clone(&self.session)).await;
        Ok(self.session.status().await)
    }

    /// Deactivates the session and stops polling.
    pub async fn clear_filter(&self) -> SessionStatus {
        self.scheduler.stop().await;
        self.session.set_filter(None).await;
        self.session.status().await
    }

    /// Runs one poll of every stream right away.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoActiveFilter`] if no filter is selected.
    pub async fn refresh(&self) -> Result<SessionStatus, GatewayError> {
        if self.session.filter().await.is_none() {
            return Err(GatewayError::NoActiveFilter);
        }
        let report = self.session.tick().await;
        tracing::debug!(?report, "manual refresh");
        Ok(self.session.status().await)
    }

    /// Session summary.
    pub async fn status(&self) -> SessionStatus {
        self.session.status().await
    }

    /// `true` while the polling timer runs.
    pub async fn is_polling(&self) -> bool {
        self.scheduler.is_running().await
    }

    /// The allowed collection.
    pub async fn allowed_records(&self) -> StreamSnapshot<AttendanceRecord> {
        self.session.allowed_snapshot().await
    }

    /// The denied collection narrowed by `query`, latest first.
    pub async fn denied_records(&self, query: &DenialQuery<'_>) -> StreamSnapshot<DenialRecord> {
        let mut snapshot = self.session.denied_snapshot().await;
        snapshot.records = query.apply(&snapshot.records);
        snapshot
    }

    /// Reasons present in the denied collection.
    pub async fn denial_reasons(&self) -> DenialReasons {
        DenialReasons::collect(&self.session.denied_snapshot().await.records)
    }

    /// Latest occupancy snapshot.
    pub async fn occupancy(&self) -> OccupancySnapshot {
        self.session.occupancy_snapshot().await
    }

    /// Allowed and denied records as one list. Empty without a filter.
    pub async fn activity(&self) -> Vec<ActivityEntry> {
        let Some(filter) = self.session.filter().await else {
            return Vec::new();
        };
        let (allowed, denied) = tokio::join!(
            self.session.allowed_snapshot(),
            self.session.denied_snapshot()
        );
        unify(&allowed.records, &denied.records, filter.event_name())
    }

    /// Aggregations over [`activity`](Self::activity).
    pub async fn analytics(&self) -> AnalyticsReport {
        AnalyticsReport::build(&self.activity().await)
    }

    /// Renders the activity list as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoActiveFilter`] without a filter,
    /// [`GatewayError::NoData`] when nothing has been synchronized, or
    /// [`GatewayError::Export`] if rendering fails.
    pub async fn export_csv(&self) -> Result<CsvExport, GatewayError> {
        let Some(filter) = self.session.filter().await else {
            return Err(GatewayError::NoActiveFilter);
        };
        let entries = self.activity().await;
        if entries.is_empty() {
            return Err(GatewayError::NoData);
        }
        let body = render_csv(&entries)?;
        let filename = export_filename(filter.event_name(), Utc::now().date_naive());
        tracing::info!(%filter, rows = entries.len(), %filename, "csv export rendered");
        Ok(CsvExport { filename, body })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::{LocationOccupancy, SyncCursor, SyncRecord};
    use crate::sync::Tick;

    /// Serves a fixed in-memory table the way the upstream search does.
    #[derive(Debug)]
    struct MemorySource<R> {
        rows: Mutex<Vec<R>>,
    }

    impl<R> MemorySource<R> {
        fn new(rows: Vec<R>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }
    }

    impl<R: SyncRecord> RecordSource for MemorySource<R> {
        type Record = R;

        async fn fetch_all(&self, _filter: &SyncFilter) -> Result<Vec<R>, GatewayError> {
            Ok(self.rows.lock().await.clone())
        }

        async fn fetch_after(
            &self,
            _filter: &SyncFilter,
            cursor: SyncCursor,
        ) -> Result<Vec<R>, GatewayError> {
            Ok(self
                .rows
                .lock()
                .await
                .iter()
                .filter(|r| r.timestamp().is_some_and(|ts| ts.time() > cursor.as_time()))
                .cloned()
                .collect())
        }
    }

    #[derive(Debug)]
    struct FixedOccupancy;

    impl OccupancySource for FixedOccupancy {
        async fn fetch_occupancy(
            &self,
            _filter: &SyncFilter,
        ) -> Result<Vec<LocationOccupancy>, GatewayError> {
            Ok(vec![LocationOccupancy {
                location: "Hall A".to_string(),
                live: 2,
                total: 5,
            }])
        }
    }

    type TestService =
        DashboardService<MemorySource<AttendanceRecord>, MemorySource<DenialRecord>, FixedOccupancy>;

    fn allowed(id: i64, time: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            fullname: Some(format!("Person {id}")),
            bsguid: Some(format!("UID{id}")),
            location: Some("Hall A".to_string()),
            date_time: Some(format!("2026-01-03T{time}")),
            ..AttendanceRecord::default()
        }
    }

    fn denied(id: i64, time: &str, reason: &str) -> DenialRecord {
        DenialRecord {
            id,
            full_name: Some(format!("Visitor {id}")),
            location: Some("Gate".to_string()),
            attempted_date_time: Some(format!("2026-01-03T{time}")),
            denial_reason: Some(reason.to_string()),
            ..DenialRecord::default()
        }
    }

    fn service() -> TestService {
        let bus = EventBus::new(64);
        let session = Arc::new(DashboardSession::new(
            MemorySource::new(vec![allowed(1, "10:00:00"), allowed(2, "10:05:00")]),
            MemorySource::new(vec![
                denied(7, "10:01:00", "EXPIRED"),
                denied(8, "10:02:00", "NOT_REGISTERED"),
            ]),
            Some(FixedOccupancy),
            bus.clone(),
        ));
        DashboardService::new(session, PollScheduler::new(Duration::from_secs(3600)), bus)
    }

    #[tokio::test]
    async fn blank_event_is_rejected() {
        let svc = service();
        let Err(err) = svc.select_filter("   ", None).await else {
            panic!("blank filter accepted");
        };
        assert!(matches!(err, GatewayError::InvalidFilter(_)));
        assert!(!svc.is_polling().await);
    }

    #[tokio::test]
    async fn refresh_requires_filter() {
        let svc = service();
        assert!(matches!(
            svc.refresh().await,
            Err(GatewayError::NoActiveFilter)
        ));
        assert!(matches!(
            svc.export_csv().await,
            Err(GatewayError::NoActiveFilter)
        ));
    }

    #[tokio::test]
    async fn select_then_refresh_loads_all_views() {
        let svc = service();
        let Ok(_) = svc.select_filter("Orientation", Some("2026-01-03")).await else {
            panic!("select failed");
        };
        assert!(svc.is_polling().await);
        let Ok(status) = svc.refresh().await else {
            panic!("refresh failed");
        };

        assert_eq!(status.allowed.record_count, 2);
        assert_eq!(status.denied.record_count, 2);
        assert!(status.allowed.phase.cursor().is_some());
        assert_eq!(svc.occupancy().await.locations.len(), 1);

        let reasons = svc.denial_reasons().await;
        assert_eq!(reasons.reasons, ["ALL", "EXPIRED", "NOT_REGISTERED"]);

        let latest_first = svc.denied_records(&DenialQuery::default()).await;
        let ids: Vec<i64> = latest_first.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, [8, 7]);

        let report = svc.analytics().await;
        assert_eq!(report.kpis.total_records, 4);
        assert_eq!(report.kpis.success_rate, 50);
    }

    #[tokio::test]
    async fn export_names_file_after_event() {
        let svc = service();
        let Ok(_) = svc.select_filter("Open Day", Some("2026-01-03")).await else {
            panic!("select failed");
        };
        Tick::tick(svc.session().as_ref()).await;

        let Ok(export) = svc.export_csv().await else {
            panic!("export failed");
        };
        assert!(export.filename.starts_with("Open_Day_analytics_"));
        assert_eq!(export.body.lines().count(), 5);
    }

    #[tokio::test]
    async fn clear_filter_empties_everything() {
        let svc = service();
        let Ok(_) = svc.select_filter("Orientation", None).await else {
            panic!("select failed");
        };
        let _ = svc.refresh().await;

        let status = svc.clear_filter().await;
        assert!(status.filter.is_none());
        assert_eq!(status.allowed.record_count, 0);
        assert!(!svc.is_polling().await);
        assert!(svc.activity().await.is_empty());
        assert_eq!(svc.analytics().await, AnalyticsReport::default());
    }
}
