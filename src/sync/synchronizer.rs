//! Incremental record synchronizer.
//!
//! A stream starts `Uninitialized` and loads a full snapshot for its
//! filter. Once a snapshot yields a cursor the stream is `Synchronized`
//! and every later poll only asks for records strictly after the cursor,
//! merging them into the collection with duplicate suppression by id.
//!
//! Fetch failures never touch state: they are reported on the event bus
//! (the dashboard's failure toast) and the next tick retries the same
//! phase.
//!
//! [`sync`] is the stateless form of one poll. [`StreamSynchronizer`]
//! owns the state of one stream and adds stale-response protection: a
//! response is applied only if the filter it was fetched for is still
//! the active one and no poll issued after it has been applied yet.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    EventBus, MergeStats, RecordSet, StreamKind, SyncCursor, SyncEvent, SyncFilter, SyncPhase,
    SyncRecord, latest_cursor,
};
use crate::error::GatewayError;
use crate::upstream::RecordSource;

/// Collection and cursor of one stream.
#[derive(Debug, Clone)]
pub struct SyncState<R> {
    records: RecordSet<R>,
    cursor: Option<SyncCursor>,
}

impl<R> Default for SyncState<R> {
    fn default() -> Self {
        Self {
            records: RecordSet::default(),
            cursor: None,
        }
    }
}

impl<R: SyncRecord> SyncState<R> {
    /// Empty, uninitialized state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from parts.
    #[must_use]
    pub fn from_parts(records: RecordSet<R>, cursor: Option<SyncCursor>) -> Self {
        Self { records, cursor }
    }

    /// The deduplicated collection.
    #[must_use]
    pub const fn records(&self) -> &RecordSet<R> {
        &self.records
    }

    /// The cursor, `None` while uninitialized.
    #[must_use]
    pub const fn cursor(&self) -> Option<SyncCursor> {
        self.cursor
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SyncPhase {
        SyncPhase::from_cursor(self.cursor)
    }

    /// Splits the state into collection and cursor.
    #[must_use]
    pub fn into_parts(self) -> (RecordSet<R>, Option<SyncCursor>) {
        (self.records, self.cursor)
    }

    /// Applies a successful fetch.
    ///
    /// A snapshot replaces the collection and recomputes the cursor from
    /// scratch (an empty snapshot leaves the stream uninitialized). A
    /// delta is merged and moves the cursor to the batch maximum, never
    /// backwards; an empty delta changes nothing.
    pub fn apply(&mut self, outcome: FetchOutcome<R>) -> ApplyReport {
        match outcome {
            FetchOutcome::Snapshot(batch) => {
                let cursor = latest_cursor(&batch);
                self.records = RecordSet::from_batch(batch);
                self.cursor = cursor;
                ApplyReport {
                    kind: ApplyKind::Snapshot,
                    stats: MergeStats {
                        inserted: self.records.len(),
                        replaced: 0,
                    },
                    record_count: self.records.len(),
                    cursor: self.cursor,
                }
            }
            FetchOutcome::Delta(batch) => {
                let batch_cursor = latest_cursor(&batch);
                let stats = self.records.merge(batch);
                self.cursor = match self.cursor {
                    Some(current) => Some(current.advance(batch_cursor)),
                    None => batch_cursor,
                };
                ApplyReport {
                    kind: ApplyKind::Delta,
                    stats,
                    record_count: self.records.len(),
                    cursor: self.cursor,
                }
            }
        }
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome<R> {
    /// Full snapshot for the filter.
    Snapshot(Vec<R>),
    /// Records strictly after the cursor.
    Delta(Vec<R>),
}

/// Which kind of fetch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    /// Full reload.
    Snapshot,
    /// Incremental merge.
    Delta,
}

/// What [`SyncState::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    /// Snapshot or delta.
    pub kind: ApplyKind,
    /// Inserted/replaced counts.
    pub stats: MergeStats,
    /// Collection size afterwards.
    pub record_count: usize,
    /// Cursor afterwards.
    pub cursor: Option<SyncCursor>,
}

/// Issues the fetch the current phase calls for.
///
/// # Errors
///
/// Returns the source's error unchanged.
pub async fn fetch<S: RecordSource>(
    source: &S,
    filter: &SyncFilter,
    cursor: Option<SyncCursor>,
) -> Result<FetchOutcome<S::Record>, GatewayError> {
    match cursor {
        None => source.fetch_all(filter).await.map(FetchOutcome::Snapshot),
        Some(cursor) => source
            .fetch_after(filter, cursor)
            .await
            .map(FetchOutcome::Delta),
    }
}

/// Runs one poll against `state` and returns the updated state.
///
/// An inactive (blank) filter returns `state` untouched without calling
/// the source. A failed fetch is reported on `bus` as
/// [`SyncEvent::FetchFailed`] and also returns `state` untouched.
pub async fn sync<S: RecordSource>(
    source: &S,
    bus: &EventBus,
    filter: &SyncFilter,
    mut state: SyncState<S::Record>,
) -> SyncState<S::Record> {
    if !filter.is_active() {
        return state;
    }
    match fetch(source, filter, state.cursor).await {
        Ok(outcome) => {
            let report = state.apply(outcome);
            publish_report(bus, S::Record::KIND, filter, &report);
        }
        Err(err) => notify_failure(bus, S::Record::KIND, filter, &err),
    }
    state
}

/// Publishes the event matching an applied fetch. Empty deltas are
/// silent.
fn publish_report(bus: &EventBus, stream: StreamKind, filter: &SyncFilter, report: &ApplyReport) {
    let timestamp = Utc::now();
    match report.kind {
        ApplyKind::Snapshot => {
            tracing::debug!(%stream, %filter, records = report.record_count, cursor = ?report.cursor, "snapshot applied");
            let _ = bus.publish(SyncEvent::Resynced {
                stream,
                filter: filter.clone(),
                record_count: report.record_count,
                cursor: report.cursor,
                timestamp,
            });
        }
        ApplyKind::Delta if !report.stats.is_empty() => {
            tracing::debug!(
                %stream,
                %filter,
                inserted = report.stats.inserted,
                replaced = report.stats.replaced,
                cursor = ?report.cursor,
                "delta merged"
            );
            let _ = bus.publish(SyncEvent::RecordsMerged {
                stream,
                filter: filter.clone(),
                inserted: report.stats.inserted,
                replaced: report.stats.replaced,
                record_count: report.record_count,
                cursor: report.cursor,
                timestamp,
            });
        }
        ApplyKind::Delta => {}
    }
}

/// Logs a fetch failure and publishes the user-facing notification.
pub(crate) fn notify_failure(
    bus: &EventBus,
    stream: StreamKind,
    filter: &SyncFilter,
    err: &GatewayError,
) {
    tracing::warn!(%stream, %filter, error = %err, "fetch failed; state unchanged");
    let _ = bus.publish(SyncEvent::FetchFailed {
        stream,
        filter: filter.clone(),
        message: failure_message(stream, err),
        timestamp: Utc::now(),
    });
}

/// Toast text: the upstream message when there is one, a generic
/// per-stream message otherwise.
fn failure_message(stream: StreamKind, err: &GatewayError) -> String {
    match err {
        GatewayError::UpstreamStatus { message, .. } if !message.trim().is_empty() => {
            message.clone()
        }
        _ => match stream {
            StreamKind::Allowed => "Failed to fetch attendance".to_string(),
            StreamKind::Denied => "Failed to fetch denied attendance".to_string(),
            StreamKind::Occupancy => "Failed to fetch live occupancy".to_string(),
        },
    }
}

/// What one [`StreamSynchronizer::poll`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No active filter; nothing was fetched.
    Inactive,
    /// The fetch succeeded and was applied.
    Applied(ApplyReport),
    /// The fetch succeeded but was overtaken, either by a filter change
    /// or by a later poll that already applied; discarded.
    Stale,
    /// The fetch failed; state unchanged.
    Failed,
}

/// Read-only copy of a stream's state.
#[derive(Debug, Clone)]
pub struct StreamSnapshot<R> {
    /// Stream kind.
    pub stream: StreamKind,
    /// Active filter.
    pub filter: Option<SyncFilter>,
    /// Current phase.
    pub phase: SyncPhase,
    /// Records in arrival order.
    pub records: Vec<R>,
    /// Time of the last applied fetch.
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Record-free summary of a stream's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStatus {
    /// Stream kind.
    pub stream: StreamKind,
    /// Current phase.
    pub phase: SyncPhase,
    /// Collection size.
    pub record_count: usize,
    /// Time of the last applied fetch.
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct StreamInner<R> {
    filter: Option<SyncFilter>,
    generation: u64,
    /// Sequence number handed to the most recently issued poll.
    issued_seq: u64,
    /// Sequence number of the last poll whose response was applied.
    applied_seq: u64,
    state: SyncState<R>,
    last_synced_at: Option<DateTime<Utc>>,
}

/// Owns the collection and cursor of one record stream.
///
/// All mutation goes through [`set_filter`](Self::set_filter) and
/// [`poll`](Self::poll); readers get cloned snapshots. The lock is never
/// held across a fetch, so polls may overlap: each response carries the
/// filter generation and poll sequence number it was issued under and is
/// dropped if the generation moved on or a later poll already applied.
/// Applied responses therefore follow issue order, which keeps the cursor
/// from regressing when a slow snapshot lands after newer data.
#[derive(Debug)]
pub struct StreamSynchronizer<S: RecordSource> {
    source: S,
    bus: EventBus,
    inner: RwLock<StreamInner<S::Record>>,
}

impl<S: RecordSource> StreamSynchronizer<S> {
    /// Creates an inactive synchronizer.
    #[must_use]
    pub fn new(source: S, bus: EventBus) -> Self {
        Self {
            source,
            bus,
            inner: RwLock::new(StreamInner {
                filter: None,
                generation: 0,
                issued_seq: 0,
                applied_seq: 0,
                state: SyncState::new(),
                last_synced_at: None,
            }),
        }
    }

    /// The stream this synchronizer tracks.
    #[must_use]
    pub const fn stream(&self) -> StreamKind {
        S::Record::KIND
    }

    /// Switches to `filter`, starting a new session.
    ///
    /// Always clears the collection and cursor and invalidates in-flight
    /// responses, even when the filter is unchanged.
    pub async fn set_filter(&self, filter: Option<SyncFilter>) {
        let mut inner = self.inner.write().await;
        inner.generation = inner.generation.wrapping_add(1);
        inner.filter = filter.filter(SyncFilter::is_active);
        inner.state = SyncState::new();
        inner.last_synced_at = None;
        tracing::debug!(stream = %self.stream(), filter = ?inner.filter, generation = inner.generation, "stream reset");
    }

    /// Runs one poll: fetch for the current phase, then apply unless the
    /// filter changed or a later poll was applied while the fetch was in
    /// flight.
    pub async fn poll(&self) -> PollOutcome {
        let (filter, generation, seq, cursor) = {
            let mut inner = self.inner.write().await;
            let Some(filter) = inner.filter.clone() else {
                return PollOutcome::Inactive;
            };
            inner.issued_seq = inner.issued_seq.wrapping_add(1);
            (filter, inner.generation, inner.issued_seq, inner.state.cursor())
        };

        let result = fetch(&self.source, &filter, cursor).await;

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            tracing::debug!(stream = %self.stream(), %filter, "discarding response for superseded filter");
            return PollOutcome::Stale;
        }
        if seq < inner.applied_seq {
            tracing::debug!(
                stream = %self.stream(),
                %filter,
                seq,
                applied = inner.applied_seq,
                "discarding response overtaken by a later poll"
            );
            return PollOutcome::Stale;
        }
        match result {
            Ok(outcome) => {
                let report = inner.state.apply(outcome);
                inner.applied_seq = seq;
                inner.last_synced_at = Some(Utc::now());
                drop(inner);
                publish_report(&self.bus, self.stream(), &filter, &report);
                PollOutcome::Applied(report)
            }
            Err(err) => {
                drop(inner);
                notify_failure(&self.bus, self.stream(), &filter, &err);
                PollOutcome::Failed
            }
        }
    }

    /// The active filter.
    pub async fn filter(&self) -> Option<SyncFilter> {
        self.inner.read().await.filter.clone()
    }

    /// Copy of the full stream state.
    pub async fn snapshot(&self) -> StreamSnapshot<S::Record> {
        let inner = self.inner.read().await;
        StreamSnapshot {
            stream: self.stream(),
            filter: inner.filter.clone(),
            phase: inner.state.phase(),
            records: inner.state.records().as_slice().to_vec(),
            last_synced_at: inner.last_synced_at,
        }
    }

    /// Summary without records.
    pub async fn status(&self) -> StreamStatus {
        let inner = self.inner.read().await;
        StreamStatus {
            stream: self.stream(),
            phase: inner.state.phase(),
            record_count: inner.state.records().len(),
            last_synced_at: inner.last_synced_at,
        }
    }
}
