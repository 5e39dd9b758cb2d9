use std::env;
use tracing::{info, warn};

use crate::config::{parse_flag, ConfigError};

/// Authorization policy knobs.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    /// When false, admin routes accept any verified identity.
    pub enforce_admin_role: bool,
}

impl AccessConfig {
    /// Expected environment variables:
    /// - ENFORCE_ADMIN_ROLE (defaults to true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let enforce_admin_role = match env::var("ENFORCE_ADMIN_ROLE") {
            Ok(raw) => parse_flag("ENFORCE_ADMIN_ROLE", &raw)?,
            Err(_) => true,
        };
        if enforce_admin_role {
            info!("Admin routes require the admin role");
        } else {
            warn!("ENFORCE_ADMIN_ROLE=false: admin routes accept any verified identity");
        }
        Ok(AccessConfig { enforce_admin_role })
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            enforce_admin_role: true,
        }
    }
}
