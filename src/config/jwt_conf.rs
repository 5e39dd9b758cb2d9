use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Settings of the bearer-token identity provider.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub jwt_secret: String,
    /// Lifetime of locally issued tokens, in minutes
    pub token_expiration: i64,
    /// Expected `iss` claim (optional)
    pub jwt_issuer: Option<String>,
    /// Expected `aud` claim (optional)
    pub jwt_audience: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key used to verify tokens (required, >= 32 chars)
    /// - JWT_TOKEN_EXPIRY: Lifetime of issued tokens in minutes (defaults to 60)
    /// - JWT_ISSUER: JWT issuer (optional)
    /// - JWT_AUDIENCE: JWT audience (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let token_expiration = env::var("JWT_TOKEN_EXPIRY")
            .unwrap_or_else(|_| {
                warn!("JWT_TOKEN_EXPIRY not set, using default: 60 minutes");
                "60".to_string()
            })
            .parse::<i64>()
            .map_err(|e| {
                error!("Invalid JWT_TOKEN_EXPIRY value: {}", e);
                ConfigError::InvalidValue(format!("JWT_TOKEN_EXPIRY: {}", e))
            })?;

        let jwt_issuer = env::var("JWT_ISSUER").ok();
        if let Some(ref issuer) = jwt_issuer {
            debug!("JWT issuer: {}", issuer);
        }

        let jwt_audience = env::var("JWT_AUDIENCE").ok();
        if let Some(ref audience) = jwt_audience {
            debug!("JWT audience: {}", audience);
        }

        let config = JwtConfig {
            jwt_secret,
            token_expiration,
            jwt_issuer,
            jwt_audience,
        };
        config.validate()?;

        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short (minimum 32 characters required)");
            return Err(ConfigError::ValidationError("JWT secret must be at least 32 characters long".to_string()));
        }

        if self.token_expiration <= 0 {
            error!("Token expiration must be greater than 0");
            return Err(ConfigError::ValidationError("Token expiration must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Configuration for tests and local development
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            token_expiration: 60,
            jwt_issuer: Some("smart-bills-test".to_string()),
            jwt_audience: Some("smart-bills-clients".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(JwtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let config = JwtConfig {
            jwt_secret: "short".to_string(),
            ..JwtConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_is_rejected() {
        let config = JwtConfig {
            token_expiration: 0,
            ..JwtConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
