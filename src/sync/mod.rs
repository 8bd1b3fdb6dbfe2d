//! Synchronization layer: record streams, occupancy, session, timer.

pub mod occupancy;
pub mod scheduler;
pub mod session;
pub mod synchronizer;

pub use occupancy::{OccupancySnapshot, OccupancyTracker};
pub use scheduler::{PollScheduler, Tick};
pub use session::{DashboardSession, SessionStatus, TickReport};
pub use synchronizer::{
    ApplyKind, ApplyReport, FetchOutcome, PollOutcome, StreamSnapshot, StreamStatus,
    StreamSynchronizer, SyncState, fetch, sync,
};
