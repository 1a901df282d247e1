//! Client configuration.
//!
//! Defaults point at a local development server. Every field can be
//! overridden from the environment with [`ClientConfig::from_env`].

use std::time::Duration;

use tracing::warn;

use crate::websocket::{ReconnectPolicy, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY};

pub const DEFAULT_WS_URL: &str = "ws://localhost:3002/api/v1/ws";
pub const DEFAULT_API_URL: &str = "http://localhost:3002";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

pub const ENV_WS_URL: &str = "FOMO_WS_URL";
pub const ENV_API_URL: &str = "FOMO_API_URL";
pub const ENV_RECONNECT_DELAY_MS: &str = "FOMO_RECONNECT_DELAY_MS";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "FOMO_MAX_RECONNECT_ATTEMPTS";
pub const ENV_USE_MOCKS: &str = "FOMO_USE_MOCKS";

/// Configuration for the session socket and REST client.
///
/// # Example
///
/// ```ignore
/// use fomo::config::ClientConfig;
///
/// let config = ClientConfig::from_env()
///     .with_max_reconnect_attempts(3)
///     .with_use_mocks(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base WebSocket URL; the project id is appended as a query parameter
    pub ws_url: String,
    /// Base REST URL; paths are rooted at `/api/v1`
    pub api_url: String,
    /// Fixed delay between reconnect attempts
    pub reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
    /// Capacity of the transport event and outbound queues
    pub channel_capacity: usize,
    /// Answer locally instead of contacting a server
    pub use_mocks: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_WS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            use_mocks: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = url.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn with_use_mocks(mut self, use_mocks: bool) -> Self {
        self.use_mocks = use_mocks;
        self
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            delay: self.reconnect_delay,
            max_attempts: self.max_reconnect_attempts,
        }
    }

    /// Defaults overridden by `FOMO_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `FOMO_*` key.
    /// Unparseable numbers are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_WS_URL).filter(|v| !v.trim().is_empty()) {
            config.ws_url = url.trim().to_string();
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_RECONNECT_DELAY_MS) {
            config.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, ENV_MAX_RECONNECT_ATTEMPTS) {
            config.max_reconnect_attempts = attempts;
        }
        if let Some(flag) = lookup(ENV_USE_MOCKS) {
            config.use_mocks = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
