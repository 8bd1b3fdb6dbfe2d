//! Record view DTOs: collections, denial search, occupancy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams};
use super::session_dto::StreamStatusDto;
use crate::analytics::DenialQuery;
use crate::domain::{LocationOccupancy, SyncFilter};
use crate::sync::{OccupancySnapshot, StreamSnapshot, StreamStatus};

/// Query parameters of `GET /records/denied`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DeniedQueryParams {
    /// Exact denial reason; `ALL` or absent for every reason.
    pub reason: Option<String>,
    /// Case-insensitive search over name, uid and location.
    pub q: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl DeniedQueryParams {
    /// Search criteria.
    #[must_use]
    pub fn query(&self) -> DenialQuery<'_> {
        DenialQuery {
            reason: self.reason.as_deref(),
            text: self.q.as_deref(),
        }
    }

    /// Pagination part.
    #[must_use]
    pub const fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// A page of one synchronized collection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecordPage<T> {
    /// Selected event.
    pub event_name: Option<String>,
    /// Selected date.
    pub date: Option<String>,
    /// Stream synchronization state.
    pub status: StreamStatusDto,
    /// Records of this page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

impl<T> RecordPage<T> {
    /// Paginates a stream snapshot. `total` overrides the record count
    /// reported in `status` when the records were narrowed by a search.
    #[must_use]
    pub fn from_snapshot(snapshot: StreamSnapshot<T>, params: &PaginationParams, total: usize) -> Self {
        let status = StreamStatus {
            stream: snapshot.stream,
            phase: snapshot.phase,
            record_count: total,
            last_synced_at: snapshot.last_synced_at,
        };
        let (data, pagination) = params.paginate(snapshot.records);
        Self {
            event_name: filter_name(snapshot.filter.as_ref()),
            date: snapshot.filter.as_ref().map(SyncFilter::date_param),
            status: status.into(),
            data,
            pagination,
        }
    }
}

/// Response body of `GET /occupancy`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OccupancyResponse {
    /// Selected event.
    pub event_name: Option<String>,
    /// Selected date.
    pub date: Option<String>,
    /// Last successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Per-location counts.
    pub locations: Vec<LocationOccupancy>,
}

impl From<OccupancySnapshot> for OccupancyResponse {
    fn from(snapshot: OccupancySnapshot) -> Self {
        Self {
            event_name: filter_name(snapshot.filter.as_ref()),
            date: snapshot.filter.as_ref().map(SyncFilter::date_param),
            refreshed_at: snapshot.refreshed_at,
            locations: snapshot.locations,
        }
    }
}

fn filter_name(filter: Option<&SyncFilter>) -> Option<String> {
    filter.map(|f| f.event_name().to_string())
}
