use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("STORE_BACKEND: unknown backend {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub store_backend: StoreBackend,
}

impl AppConfig {
    /// Expected environment variables:
    /// - APP_HOST (defaults to 0.0.0.0)
    /// - APP_PORT, or PORT as set by most hosting platforms (defaults to 3000)
    /// - REQUEST_TIMEOUT_SECS (defaults to 10)
    /// - STORE_BACKEND: `mongo` or `memory` (defaults to mongo)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading application configuration from environment variables");

        let host = env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("APP_PORT").or_else(|_| env::var("PORT")) {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue(format!("APP_PORT: {raw}")))?,
            Err(_) => {
                warn!("APP_PORT not set, using default: 3000");
                3000
            }
        };

        let request_timeout_secs = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid REQUEST_TIMEOUT_SECS value".to_string()))?;

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Mongo,
        };
        debug!(?store_backend, host = %host, port, request_timeout_secs, "Application settings");

        let config = AppConfig {
            host,
            port,
            request_timeout_secs,
            store_backend,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError("REQUEST_TIMEOUT_SECS must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 10,
            store_backend: StoreBackend::Mongo,
        }
    }
}
