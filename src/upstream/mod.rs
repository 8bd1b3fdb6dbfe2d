//! Upstream layer: HTTP client, record sources, and auth passthrough.
//!
//! Everything that talks to the remote attendance service lives here.
//! The synchronizers only see the [`RecordSource`] and
//! [`OccupancySource`] traits.

pub mod auth;
pub mod client;
pub mod source;
pub mod token;

pub use auth::{AuthApi, ResendOtpRequest, SigninRequest, SignupRequest, UserRole, VerifyOtpRequest};
pub use client::UpstreamClient;
pub use source::{
    HttpAttendanceSource, HttpDenialSource, HttpOccupancySource, HttpRecordSource,
    OccupancySource, RecordSource,
};
pub use token::TokenStore;
