//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Smallest accepted polling period.
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Base URL of the upstream attendance service, without trailing slash.
    pub upstream_base_url: String,

    /// Bearer token attached to upstream requests until a sign-in
    /// replaces it.
    pub upstream_token: Option<String>,

    /// Timeout in seconds for a single upstream request.
    pub upstream_timeout_secs: u64,

    /// Milliseconds between synchronizer ticks.
    pub poll_interval_ms: u64,

    /// Whether live occupancy is refreshed on every tick.
    pub occupancy_enabled: bool,

    /// Event selected at startup, if any.
    pub default_event_name: Option<String>,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let upstream_base_url = std::env::var("UPSTREAM_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let upstream_token = parse_env_string("UPSTREAM_TOKEN");
        let upstream_timeout_secs = parse_env("UPSTREAM_TIMEOUT_SECS", 10);

        let poll_interval_ms = parse_env("POLL_INTERVAL_MS", 5_000).max(MIN_POLL_INTERVAL_MS);
        let occupancy_enabled = parse_env_bool("OCCUPANCY_ENABLED", true);
        let default_event_name = parse_env_string("DEFAULT_EVENT_NAME");

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 10_000);

        Ok(Self {
            listen_addr,
            upstream_base_url,
            upstream_token,
            upstream_timeout_secs,
            poll_interval_ms,
            occupancy_enabled,
            default_event_name,
            event_bus_capacity,
        })
    }

    /// Polling period as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upstream request timeout as a [`Duration`].
    #[must_use]
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|v| v.trim().to_ascii_lowercase())
        .as_deref()
    {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

/// Reads a non-blank string variable.
fn parse_env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing() {
        assert_eq!(parse_env("ROLLCALL_TEST_UNSET_NUMBER", 42_u64), 42);
        assert!(parse_env_bool("ROLLCALL_TEST_UNSET_BOOL", true));
        assert!(parse_env_string("ROLLCALL_TEST_UNSET_STRING").is_none());
    }

    #[test]
    fn durations_follow_fields() {
        let Ok(addr) = "127.0.0.1:0".parse() else {
            return;
        };
        let config = GatewayConfig {
            listen_addr: addr,
            upstream_base_url: "http://localhost:8080/api".to_string(),
            upstream_token: None,
            upstream_timeout_secs: 3,
            poll_interval_ms: 2_000,
            occupancy_enabled: true,
            default_event_name: None,
            event_bus_capacity: 16,
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(3));
    }
}
