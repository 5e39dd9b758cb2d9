use std::env;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::query::report::DayOrder;

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub recent_days_limit: i64,
    pub recent_days_order: DayOrder,
}

impl ReportConfig {
    /// Expected environment variables:
    /// - RECENT_DAYS_LIMIT (defaults to 7)
    /// - RECENT_DAYS_ORDER: `earliest` or `latest` (defaults to earliest)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading report configuration from environment variables");
        let recent_days_limit = env::var("RECENT_DAYS_LIMIT")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid RECENT_DAYS_LIMIT value".to_string()))?;
        let recent_days_order = match env::var("RECENT_DAYS_ORDER") {
            Ok(raw) => raw.parse::<DayOrder>().map_err(ConfigError::InvalidValue)?,
            Err(_) => DayOrder::default(),
        };
        debug!(recent_days_limit, ?recent_days_order, "Report settings");

        let config = ReportConfig {
            recent_days_limit,
            recent_days_order,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_days_limit < 1 {
            return Err(ConfigError::ValidationError("RECENT_DAYS_LIMIT must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            recent_days_limit: 7,
            recent_days_order: DayOrder::Earliest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keeps_earliest_seven_days() {
        let config = ReportConfig::default();
        assert_eq!(config.recent_days_limit, 7);
        assert_eq!(config.recent_days_order, DayOrder::Earliest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let config = ReportConfig {
            recent_days_limit: 0,
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
