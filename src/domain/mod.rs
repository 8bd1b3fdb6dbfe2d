//! Domain layer: records, filters, cursors, and the event system.
//!
//! This module contains the record model shared by the attendance and
//! denial streams, the filter and cursor types that drive incremental
//! synchronization, the deduplicating record set, and the event bus for
//! broadcasting sync progress.

pub mod cursor;
pub mod event_bus;
pub mod filter;
pub mod occupancy;
pub mod record;
pub mod record_set;
pub mod sync_event;

pub use cursor::{SyncCursor, SyncPhase, latest_cursor};
pub use event_bus::EventBus;
pub use filter::SyncFilter;
pub use occupancy::{LocationOccupancy, OccupancyRow};
pub use record::{AttendanceRecord, DenialRecord, StreamKind, SyncRecord, parse_timestamp};
pub use record_set::{MergeStats, RecordSet};
pub use sync_event::SyncEvent;
