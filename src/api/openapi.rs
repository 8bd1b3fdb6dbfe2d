//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    OccupancyResponse, PaginationMeta, SelectFilterRequest, SessionStatusResponse,
    StreamStatusDto,
};
use super::handlers::{analytics, auth, records, session, system};
use crate::analytics::{ActivityEntry, AnalyticsReport, Bucket, DenialReasons, EntryStatus, Kpis};
use crate::domain::{AttendanceRecord, DenialRecord, LocationOccupancy, StreamKind};
use crate::error::{ErrorBody, ErrorResponse};
use crate::upstream::{ResendOtpRequest, SigninRequest, SignupRequest, UserRole, VerifyOtpRequest};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "rollcall-gateway",
        description = "Dashboard gateway keeping RFID attendance and denial records in sync with the access-control service."
    ),
    paths(
        system::health_handler,
        session::get_session,
        session::select_filter,
        session::clear_filter,
        session::refresh,
        records::list_allowed,
        records::list_denied,
        records::denial_reasons,
        records::occupancy,
        analytics::get_analytics,
        analytics::export_csv,
        auth::signup,
        auth::verify_otp,
        auth::resend_otp,
        auth::signin,
        auth::logout,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        SelectFilterRequest,
        SessionStatusResponse,
        StreamStatusDto,
        PaginationMeta,
        OccupancyResponse,
        AttendanceRecord,
        DenialRecord,
        LocationOccupancy,
        StreamKind,
        DenialReasons,
        AnalyticsReport,
        ActivityEntry,
        EntryStatus,
        Kpis,
        Bucket,
        SignupRequest,
        VerifyOtpRequest,
        ResendOtpRequest,
        SigninRequest,
        UserRole,
    )),
    tags(
        (name = "System", description = "Health"),
        (name = "Session", description = "Filter selection and synchronization state"),
        (name = "Records", description = "Synchronized collections"),
        (name = "Analytics", description = "Aggregations and export"),
        (name = "Auth", description = "Upstream authentication passthrough"),
    )
)]
pub struct ApiDoc;
