pub mod app_conf;
pub mod mongo_conf;
pub mod jwt_conf;
pub mod access_conf;
pub mod report_conf;

pub use access_conf::AccessConfig;
pub use app_conf::{AppConfig, StoreBackend};
pub use jwt_conf::JwtConfig;
pub use mongo_conf::MongoConfig;
pub use report_conf::ReportConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Reads a boolean flag; accepts `true/false`, `1/0`, `yes/no`.
pub(crate) fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!("{name}: expected a boolean, got {raw}"))),
    }
}
