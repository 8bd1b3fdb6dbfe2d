//! Service layer: business logic orchestration.
//!
//! [`DashboardService`] owns the synchronization session and its timer,
//! and answers the read views (records, analytics, export) from the
//! synchronized collections.

pub mod dashboard_service;

pub use dashboard_service::{CsvExport, DashboardService};
