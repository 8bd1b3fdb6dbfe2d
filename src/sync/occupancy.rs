//! Live occupancy read model.
//!
//! Occupancy is an aggregate snapshot, not an event stream, so it is
//! replaced wholesale on every tick. Failures and stale responses are
//! handled like the record streams: a response is dropped if the filter
//! changed or a later refresh already landed.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::synchronizer::notify_failure;
use crate::domain::{EventBus, LocationOccupancy, StreamKind, SyncEvent, SyncFilter};
use crate::upstream::OccupancySource;

/// Latest occupancy snapshot.
#[derive(Debug, Clone, Default)]
pub struct OccupancySnapshot {
    /// Filter the snapshot belongs to.
    pub filter: Option<SyncFilter>,
    /// Per-location counts, in upstream order.
    pub locations: Vec<LocationOccupancy>,
    /// Time of the last successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct OccupancyInner {
    generation: u64,
    issued_seq: u64,
    applied_seq: u64,
    snapshot: OccupancySnapshot,
}

/// Keeps the occupancy snapshot for the active filter.
#[derive(Debug)]
pub struct OccupancyTracker<O: OccupancySource> {
    source: O,
    bus: EventBus,
    inner: RwLock<OccupancyInner>,
}

impl<O: OccupancySource> OccupancyTracker<O> {
    /// Creates an inactive tracker.
    #[must_use]
    pub fn new(source: O, bus: EventBus) -> Self {
        Self {
            source,
            bus,
            inner: RwLock::new(OccupancyInner::default()),
        }
    }

    /// Switches to `filter`, dropping the previous snapshot.
    pub async fn set_filter(&self, filter: Option<SyncFilter>) {
        let mut inner = self.inner.write().await;
        inner.generation = inner.generation.wrapping_add(1);
        inner.snapshot = OccupancySnapshot {
            filter: filter.filter(SyncFilter::is_active),
            ..OccupancySnapshot::default()
        };
    }

    /// Fetches a fresh snapshot. Returns `true` if one was applied.
    pub async fn refresh(&self) -> bool {
        let (filter, generation, seq) = {
            let mut inner = self.inner.write().await;
            let Some(filter) = inner.snapshot.filter.clone() else {
                return false;
            };
            inner.issued_seq = inner.issued_seq.wrapping_add(1);
            (filter, inner.generation, inner.issued_seq)
        };

        let result = self.source.fetch_occupancy(&filter).await;

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            tracing::debug!(%filter, "discarding occupancy for superseded filter");
            return false;
        }
        if seq < inner.applied_seq {
            tracing::debug!(%filter, seq, "discarding occupancy overtaken by a later refresh");
            return false;
        }
        match result {
            Ok(locations) => {
                inner.applied_seq = seq;
                inner.snapshot.locations.clone_from(&locations);
                inner.snapshot.refreshed_at = Some(Utc::now());
                drop(inner);
                let _ = self.bus.publish(SyncEvent::OccupancyUpdated {
                    filter,
                    locations,
                    timestamp: Utc::now(),
                });
                true
            }
            Err(err) => {
                drop(inner);
                notify_failure(&self.bus, StreamKind::Occupancy, &filter, &err);
                false
            }
        }
    }

    /// Copy of the latest snapshot.
    pub async fn snapshot(&self) -> OccupancySnapshot {
        self.inner.read().await.snapshot.clone()
    }
}
