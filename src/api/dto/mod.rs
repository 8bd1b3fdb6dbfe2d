//! Data Transfer Objects for REST request/response serialization.
//!
//! Upstream records are exposed with their upstream field names; the
//! DTOs here wrap them with session and pagination metadata.

pub mod common_dto;
pub mod records_dto;
pub mod session_dto;

pub use common_dto::*;
pub use records_dto::*;
pub use session_dto::*;
