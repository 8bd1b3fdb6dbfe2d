//! Live occupancy per location.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Occupancy row as returned by the upstream service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyRow {
    /// Zone name.
    #[serde(default)]
    pub location: Option<String>,
    /// People currently inside.
    #[serde(default)]
    pub live_count: Option<u64>,
    /// People admitted so far.
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Normalised occupancy snapshot for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocationOccupancy {
    /// Zone name.
    pub location: String,
    /// People currently inside.
    pub live: u64,
    /// People admitted so far.
    pub total: u64,
}

impl From<OccupancyRow> for LocationOccupancy {
    fn from(row: OccupancyRow) -> Self {
        Self {
            location: row.location.unwrap_or_default(),
            live: row.live_count.unwrap_or(0),
            total: row.total_count.unwrap_or(0),
        }
    }
}
