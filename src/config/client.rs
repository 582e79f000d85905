//! Downstream service configuration.
//!
//! Holds the base URL of each collaborator the broker talks to and the
//! deadline applied to every outbound call.

use std::time::Duration;

use serde::Deserialize;

/// Default base URL of the authentication service.
pub const DEFAULT_AUTH_BASE_URL: &str = "http://authentication-service";
/// Default base URL of the logger service.
pub const DEFAULT_LOG_BASE_URL: &str = "http://logger-service";
/// Default base URL of the mail service.
pub const DEFAULT_MAIL_BASE_URL: &str = "http://mail-service";
/// Default deadline for a single outbound call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default deadline for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
/// Default cap on a downstream reply body.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Address of a single downstream service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    /// Scheme and authority, e.g. `http://mail-service`. Paths are appended by clients.
    pub base_url: String,
}

impl ServiceEndpoint {
    /// Create an endpoint from a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Join `path` onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Downstream services configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Authentication service.
    pub auth: ServiceEndpoint,
    /// Logger service.
    pub log: ServiceEndpoint,
    /// Mail service.
    pub mail: ServiceEndpoint,
    /// Overall deadline for one outbound call, in milliseconds.
    pub timeout_ms: u64,
    /// Deadline for connection establishment, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Largest downstream reply body the broker will buffer.
    pub max_response_bytes: usize,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth: ServiceEndpoint::new(DEFAULT_AUTH_BASE_URL),
            log: ServiceEndpoint::new(DEFAULT_LOG_BASE_URL),
            mail: ServiceEndpoint::new(DEFAULT_MAIL_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl ServicesConfig {
    /// Outbound call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connection establishment deadline.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
