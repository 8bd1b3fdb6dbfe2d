//! Record and occupancy sources backed by the upstream REST API.
//!
//! [`RecordSource`] and [`OccupancySource`] are the seams the
//! synchronizers are written against; the HTTP implementations below
//! talk to the real service, tests plug in in-memory fakes.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::UpstreamClient;
use crate::domain::{
    AttendanceRecord, DenialRecord, LocationOccupancy, OccupancyRow, StreamKind, SyncCursor,
    SyncFilter, SyncRecord,
};
use crate::error::GatewayError;

/// Where a synchronizer fetches its records from.
pub trait RecordSource: Send + Sync + 'static {
    /// Record type produced by this source.
    type Record: SyncRecord;

    /// Full snapshot of all records matching `filter`.
    fn fetch_all(
        &self,
        filter: &SyncFilter,
    ) -> impl Future<Output = Result<Vec<Self::Record>, GatewayError>> + Send;

    /// Records matching `filter` whose time of day is strictly after
    /// `cursor`.
    fn fetch_after(
        &self,
        filter: &SyncFilter,
        cursor: SyncCursor,
    ) -> impl Future<Output = Result<Vec<Self::Record>, GatewayError>> + Send;
}

/// Where the occupancy tracker fetches its snapshot from.
pub trait OccupancySource: Send + Sync + 'static {
    /// Aggregate per-location counts for `filter`.
    fn fetch_occupancy(
        &self,
        filter: &SyncFilter,
    ) -> impl Future<Output = Result<Vec<LocationOccupancy>, GatewayError>> + Send;
}

/// Path prefix of the search endpoints for a record stream.
const fn search_prefix(kind: StreamKind) -> &'static str {
    match kind {
        StreamKind::Denied => "/attendance/denied/admin/search",
        StreamKind::Allowed | StreamKind::Occupancy => "/attendance/admin/search",
    }
}

/// [`RecordSource`] for one stream of the upstream REST API.
///
/// The endpoint family is chosen by the record type's
/// [`SyncRecord::KIND`].
#[derive(Debug)]
pub struct HttpRecordSource<R> {
    client: Arc<UpstreamClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpRecordSource<R> {
    /// Creates a source sharing `client`.
    #[must_use]
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }
}

impl<R> Clone for HttpRecordSource<R> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.client))
    }
}

impl<R: SyncRecord + DeserializeOwned> RecordSource for HttpRecordSource<R> {
    type Record = R;

    async fn fetch_all(&self, filter: &SyncFilter) -> Result<Vec<R>, GatewayError> {
        let path = format!("{}/by-event-and-date", search_prefix(R::KIND));
        let date = filter.date_param();
        self.client
            .get_json(&path, &[("eventName", filter.event_name()), ("date", &date)])
            .await
    }

    async fn fetch_after(
        &self,
        filter: &SyncFilter,
        cursor: SyncCursor,
    ) -> Result<Vec<R>, GatewayError> {
        let path = format!("{}/by-event-date-and-time-after", search_prefix(R::KIND));
        let date = filter.date_param();
        let time = cursor.to_param();
        self.client
            .get_json(
                &path,
                &[
                    ("eventName", filter.event_name()),
                    ("date", &date),
                    ("time", &time),
                ],
            )
            .await
    }
}

/// Attendance ("allowed") stream over HTTP.
pub type HttpAttendanceSource = HttpRecordSource<AttendanceRecord>;

/// Denial stream over HTTP.
pub type HttpDenialSource = HttpRecordSource<DenialRecord>;

/// [`OccupancySource`] backed by the live-occupancy endpoint.
#[derive(Debug, Clone)]
pub struct HttpOccupancySource {
    client: Arc<UpstreamClient>,
}

impl HttpOccupancySource {
    /// Creates a source sharing `client`.
    #[must_use]
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }
}

impl OccupancySource for HttpOccupancySource {
    async fn fetch_occupancy(
        &self,
        filter: &SyncFilter,
    ) -> Result<Vec<LocationOccupancy>, GatewayError> {
        let path = format!("{}/live-occupancy", search_prefix(StreamKind::Occupancy));
        let date = filter.date_param();
        let rows: Vec<OccupancyRow> = self
            .client
            .get_json(
                &path,
                &[("eventName", filter.event_name().trim()), ("date", &date)],
            )
            .await?;
        Ok(rows.into_iter().map(LocationOccupancy::from).collect())
    }
}
