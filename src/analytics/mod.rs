//! Read-only aggregations over the synchronized collections.
//!
//! Nothing here fetches or mutates: callers pass record snapshots and get
//! plain values back.

pub mod denied;
pub mod entry;
pub mod report;

pub use denied::{ALL_REASONS, DenialQuery, DenialReasons};
pub use entry::{ActivityEntry, EntryStatus, unify};
pub use report::{AnalyticsReport, Bucket, Kpis};
