//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::EventBus;
use crate::error::GatewayError;
use crate::service::DashboardService;
use crate::sync::{DashboardSession, PollScheduler};
use crate::upstream::{
    AuthApi, HttpAttendanceSource, HttpDenialSource, HttpOccupancySource, TokenStore,
    UpstreamClient,
};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dashboard service for sync control and read views.
    pub service: Arc<DashboardService>,
    /// Upstream auth passthrough.
    pub auth: AuthApi,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wires the upstream client, sources, session and service from
    /// `config`. No filter is selected yet.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] if the HTTP client cannot be
    /// built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let event_bus = EventBus::new(config.event_bus_capacity);
        let token = TokenStore::new(config.upstream_token.clone());
        let client = Arc::new(UpstreamClient::new(
            config.upstream_base_url.as_str(),
            config.upstream_timeout(),
            token,
        )?);

        let occupancy = config
            .occupancy_enabled
            .then(|| HttpOccupancySource::new(Arc::clone(&client)));
        let session = Arc::new(DashboardSession::new(
            HttpAttendanceSource::new(Arc::clone(&client)),
            HttpDenialSource::new(Arc::clone(&client)),
            occupancy,
            event_bus.clone(),
        ));
        let scheduler = PollScheduler::new(config.poll_interval());
        let service = Arc::new(DashboardService::new(session, scheduler, event_bus.clone()));

        Ok(Self {
            service,
            auth: AuthApi::new(client),
            event_bus,
        })
    }
}
