//! Relay configuration module
//!
//! Loads settings from `.env` (if present) and the process environment.

use crate::error::RelayError;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// HTTP port for the publish, stream and health endpoints
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// NATS server URL(s) - comma-separated for multiple servers.
    /// Unset runs the relay on the in-process bus.
    #[serde(default)]
    pub nats_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum lifetime of one consumer stream, in seconds
    #[serde(default = "default_max_session_secs")]
    pub max_session_secs: u64,

    /// Per-topic buffer of the in-process bus
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_session_secs() -> u64 {
    30
}

fn default_bus_capacity() -> usize {
    crate::bus::DEFAULT_CAPACITY
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_environment(Environment::default())
    }

    fn from_environment(environment: Environment) -> Result<Self, RelayError> {
        let relay: RelayConfig = Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .and_then(Config::try_deserialize::<RelayConfig>)
            .map_err(|e| RelayError::Config(e.to_string()))?;

        relay.validate()?;
        Ok(relay)
    }

    fn validate(&self) -> Result<(), RelayError> {
        if self.max_session_secs == 0 {
            return Err(RelayError::Config(
                "MAX_SESSION_SECS must be greater than zero".to_string(),
            ));
        }
        if self.bus_capacity == 0 {
            return Err(RelayError::Config(
                "BUS_CAPACITY must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Maximum stream session lifetime
    pub fn max_session(&self) -> Duration {
        Duration::from_secs(self.max_session_secs)
    }
}
