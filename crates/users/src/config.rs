//! Users service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `USERS_HOST` - Bind address (default: 127.0.0.1)
//! - `USERS_PORT` - Listen port (default: 5050)
//! - `ORDERS_BASE_URL` - Base URL of the orders service
//!   (default: <http://127.0.0.1:5151>)
//! - `ORDERS_TIMEOUT_MS` - Per-request timeout for inter-service calls in
//!   milliseconds (default: 3000)
//! - `TRACE_EXPORTER_URL` - Span exporter endpoint (external collaborator;
//!   recorded in config and logged at startup)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Users service configuration.
#[derive(Debug, Clone)]
pub struct UsersConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the peer orders service
    pub orders_base_url: String,
    /// Bound on every inter-service call; on expiry the saga aborts as if
    /// the call failed
    pub orders_timeout: Duration,
    /// Span exporter endpoint, if configured
    pub trace_exporter_url: Option<String>,
}

impl UsersConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("USERS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("USERS_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("USERS_PORT", "5050")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("USERS_PORT".to_owned(), e.to_string()))?;
        let orders_base_url = get_env_or_default("ORDERS_BASE_URL", "http://127.0.0.1:5151")
            .trim_end_matches('/')
            .to_owned();
        let timeout_ms = get_env_or_default("ORDERS_TIMEOUT_MS", "3000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORDERS_TIMEOUT_MS".to_owned(), e.to_string())
            })?;
        let trace_exporter_url = get_optional_env("TRACE_EXPORTER_URL");

        Ok(Self {
            host,
            port,
            orders_base_url,
            orders_timeout: Duration::from_millis(timeout_ms),
            trace_exporter_url,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
