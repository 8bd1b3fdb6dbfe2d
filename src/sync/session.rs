//! Dashboard session: the allowed and denied streams plus occupancy,
//! driven together under one filter.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::occupancy::{OccupancySnapshot, OccupancyTracker};
use super::scheduler::Tick;
use super::synchronizer::{PollOutcome, StreamSnapshot, StreamStatus, StreamSynchronizer};
use crate::domain::{AttendanceRecord, DenialRecord, EventBus, SyncEvent, SyncFilter};
use crate::upstream::{OccupancySource, RecordSource};

/// Outcome of one session tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Allowed stream poll.
    pub allowed: PollOutcome,
    /// Denied stream poll.
    pub denied: PollOutcome,
    /// Whether occupancy was refreshed.
    pub occupancy_refreshed: bool,
}

/// Summary of the whole session.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    /// Active filter.
    pub filter: Option<SyncFilter>,
    /// Allowed stream summary.
    pub allowed: StreamStatus,
    /// Denied stream summary.
    pub denied: StreamStatus,
    /// Last occupancy refresh, `None` if disabled or not yet refreshed.
    pub occupancy_refreshed_at: Option<DateTime<Utc>>,
}

/// The synchronizers one dashboard view works with.
///
/// Both record streams share the filter and the polling cadence but keep
/// independent collections and cursors. Occupancy is optional.
#[derive(Debug)]
pub struct DashboardSession<A, D, O>
where
    A: RecordSource<Record = AttendanceRecord>,
    D: RecordSource<Record = DenialRecord>,
    O: OccupancySource,
{
    allowed: StreamSynchronizer<A>,
    denied: StreamSynchronizer<D>,
    occupancy: Option<OccupancyTracker<O>>,
    bus: EventBus,
    filter: RwLock<Option<SyncFilter>>,
}

impl<A, D, O> DashboardSession<A, D, O>
where
    A: RecordSource<Record = AttendanceRecord>,
    D: RecordSource<Record = DenialRecord>,
    O: OccupancySource,
{
    /// Creates an inactive session. Pass `None` as `occupancy` to skip
    /// the occupancy read model.
    #[must_use]
    pub fn new(allowed: A, denied: D, occupancy: Option<O>, bus: EventBus) -> Self {
        Self {
            allowed: StreamSynchronizer::new(allowed, bus.clone()),
            denied: StreamSynchronizer::new(denied, bus.clone()),
            occupancy: occupancy.map(|source| OccupancyTracker::new(source, bus.clone())),
            bus,
            filter: RwLock::new(None),
        }
    }

    /// Selects `filter` for every read model, clearing all collections
    /// and cursors. A blank filter deactivates the session.
    ///
    /// Returns the filter that is now active.
    pub async fn set_filter(&self, filter: Option<SyncFilter>) -> Option<SyncFilter> {
        let filter = filter.filter(SyncFilter::is_active);
        let mut current = self.filter.write().await;

        self.allowed.set_filter(filter.clone()).await;
        self.denied.set_filter(filter.clone()).await;
        if let Some(occupancy) = &self.occupancy {
            occupancy.set_filter(filter.clone()).await;
        }
        current.clone_from(&filter);
        drop(current);

        match &filter {
            Some(f) => tracing::info!(filter = %f, "session filter selected"),
            None => tracing::info!("session filter cleared"),
        }
        let _ = self.bus.publish(SyncEvent::FilterChanged {
            filter: filter.clone(),
            timestamp: Utc::now(),
        });
        filter
    }

    /// The active filter.
    pub async fn filter(&self) -> Option<SyncFilter> {
        self.filter.read().await.clone()
    }

    /// Polls both streams and refreshes occupancy concurrently.
    pub async fn tick(&self) -> TickReport {
        let occupancy = async {
            match &self.occupancy {
                Some(tracker) => tracker.refresh().await,
                None => false,
            }
        };
        let (allowed, denied, occupancy_refreshed) =
            tokio::join!(self.allowed.poll(), self.denied.poll(), occupancy);
        TickReport {
            allowed,
            denied,
            occupancy_refreshed,
        }
    }

    /// The allowed stream.
    #[must_use]
    pub const fn allowed(&self) -> &StreamSynchronizer<A> {
        &self.allowed
    }

    /// The denied stream.
    #[must_use]
    pub const fn denied(&self) -> &StreamSynchronizer<D> {
        &self.denied
    }

    /// Copy of the allowed stream.
    pub async fn allowed_snapshot(&self) -> StreamSnapshot<AttendanceRecord> {
        self.allowed.snapshot().await
    }

    /// Copy of the denied stream.
    pub async fn denied_snapshot(&self) -> StreamSnapshot<DenialRecord> {
        self.denied.snapshot().await
    }

    /// Copy of the occupancy snapshot; empty when occupancy is disabled.
    pub async fn occupancy_snapshot(&self) -> OccupancySnapshot {
        match &self.occupancy {
            Some(tracker) => tracker.snapshot().await,
            None => OccupancySnapshot::default(),
        }
    }

    /// `true` when occupancy is tracked.
    #[must_use]
    pub const fn tracks_occupancy(&self) -> bool {
        self.occupancy.is_some()
    }

    /// Session summary.
    pub async fn status(&self) -> SessionStatus {
        let (allowed, denied, occupancy) = tokio::join!(
            self.allowed.status(),
            self.denied.status(),
            self.occupancy_snapshot()
        );
        SessionStatus {
            filter: self.filter().await,
            allowed,
            denied,
            occupancy_refreshed_at: occupancy.refreshed_at,
        }
    }
}

impl<A, D, O> Tick for DashboardSession<A, D, O>
where
    A: RecordSource<Record = AttendanceRecord>,
    D: RecordSource<Record = DenialRecord>,
    O: OccupancySource,
{
    async fn tick(&self) {
        let report = DashboardSession::tick(self).await;
        tracing::trace!(?report, "session tick");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{LocationOccupancy, StreamKind, SyncCursor, SyncRecord};
    use crate::error::GatewayError;
    use crate::sync::PollOutcome;

    #[derive(Debug, Default)]
    struct Fixed<R> {
        rows: Vec<R>,
        calls: AtomicUsize,
    }

    impl<R: SyncRecord> RecordSource for Fixed<R> {
        type Record = R;

        async fn fetch_all(&self, _filter: &SyncFilter) -> Result<Vec<R>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }

        async fn fetch_after(
            &self,
            _filter: &SyncFilter,
            _cursor: SyncCursor,
        ) -> Result<Vec<R>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[derive(Debug)]
    struct Down;

    impl OccupancySource for Down {
        async fn fetch_occupancy(
            &self,
            _filter: &SyncFilter,
        ) -> Result<Vec<LocationOccupancy>, GatewayError> {
            Err(GatewayError::Internal("offline".to_string()))
        }
    }

    type TestSession = DashboardSession<Fixed<AttendanceRecord>, Fixed<DenialRecord>, Down>;

    fn session(bus: &EventBus, occupancy: bool) -> TestSession {
        let allowed = Fixed {
            rows: vec![AttendanceRecord {
                id: 1,
                date_time: Some("2026-01-03T09:00:00".to_string()),
                ..AttendanceRecord::default()
            }],
            calls: AtomicUsize::new(0),
        };
        DashboardSession::new(
            allowed,
            Fixed::default(),
            occupancy.then_some(Down),
            bus.clone(),
        )
    }

    #[tokio::test]
    async fn inactive_tick_fetches_nothing() {
        let bus = EventBus::new(16);
        let session = session(&bus, true);
        let report = session.tick().await;
        assert_eq!(report.allowed, PollOutcome::Inactive);
        assert_eq!(report.denied, PollOutcome::Inactive);
        assert!(!report.occupancy_refreshed);
        assert_eq!(session.allowed().filter().await, None);
    }

    #[tokio::test]
    async fn set_filter_announces_and_resets_every_stream() {
        let bus = EventBus::new(16);
        let session = session(&bus, false);
        let mut rx = bus.subscribe();

        let active = session.set_filter(Some(SyncFilter::today("Expo"))).await;
        assert!(active.is_some());
        let Ok(event) = rx.recv().await else {
            panic!("expected filter event");
        };
        assert_eq!(event.event_type_str(), "filter_changed");
        assert_eq!(session.denied().filter().await, active);

        let report = session.tick().await;
        assert!(matches!(report.allowed, PollOutcome::Applied(_)));
        assert!(matches!(report.denied, PollOutcome::Applied(_)));
        assert_eq!(session.status().await.allowed.record_count, 1);

        let cleared = session.set_filter(Some(SyncFilter::today(" "))).await;
        assert!(cleared.is_none());
        let status = session.status().await;
        assert!(status.filter.is_none());
        assert_eq!(status.allowed.record_count, 0);
    }

    #[tokio::test]
    async fn occupancy_failure_does_not_block_streams() {
        let bus = EventBus::new(16);
        let session = session(&bus, true);
        session.set_filter(Some(SyncFilter::today("Expo"))).await;
        let mut rx = bus.subscribe();

        let report = session.tick().await;
        assert!(!report.occupancy_refreshed);
        assert!(matches!(report.allowed, PollOutcome::Applied(_)));

        let mut failed_streams = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if event.event_type_str() == "fetch_failed" {
                failed_streams.push(event.stream());
            }
        }
        assert_eq!(failed_streams, [Some(StreamKind::Occupancy)]);
        assert!(session.tracks_occupancy());
    }
}
