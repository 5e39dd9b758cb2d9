use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// MongoDB configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// MongoDB connection URI
    pub uri: String,
    /// Database name
    pub database: String,
    /// Username for authentication (optional)
    pub username: Option<String>,
    /// Password for authentication (optional)
    pub password: Option<String>,
    /// Catalog bills collection
    pub bills_collection: String,
    /// Paid bills (transactions) collection
    pub paid_bills_collection: String,
    /// Users collection
    pub users_collection: String,
    /// Connection pool size
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
    /// Server selection timeout in seconds
    pub server_selection_timeout_secs: u64,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        debug!("{} not set, using default: {}", name, default);
        default.to_string()
    })
}

impl MongoConfig {
    /// Load MongoDB configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MONGO_URI: MongoDB connection URI. When absent, a `mongodb+srv://` URI is
    ///   built from DB_CLUSTER and DB_USER / DB_PASSWORD become the credentials
    /// - MONGO_DATABASE: Database name (defaults to smart-bills)
    /// - MONGO_USERNAME / MONGO_PASSWORD: explicit credentials (optional, take
    ///   precedence over DB_USER / DB_PASSWORD)
    /// - MONGO_BILLS_COLLECTION, MONGO_PAID_BILLS_COLLECTION, MONGO_USERS_COLLECTION
    /// - MONGO_POOL_SIZE: Connection pool size (defaults to 10)
    /// - MONGO_CONNECTION_TIMEOUT: Connection timeout in seconds (defaults to 5)
    /// - MONGO_SERVER_SELECTION_TIMEOUT: in seconds (defaults to 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let mut username = env::var("MONGO_USERNAME").ok();
        let mut password = env::var("MONGO_PASSWORD").ok();

        let uri = match env::var("MONGO_URI") {
            Ok(uri) => uri,
            Err(_) => match env::var("DB_CLUSTER") {
                Ok(cluster) => {
                    debug!("Assembling MongoDB URI from DB_CLUSTER");
                    // Credentials go through the driver's Credential, never the URI.
                    username = username.or_else(|| env::var("DB_USER").ok());
                    password = password.or_else(|| env::var("DB_PASSWORD").ok());
                    if username.is_none() || password.is_none() {
                        error!("DB_CLUSTER is set without DB_USER/DB_PASSWORD");
                        return Err(ConfigError::EnvVarNotFound("DB_USER/DB_PASSWORD".to_string()));
                    }
                    Self::srv_uri(&cluster)
                }
                Err(_) => {
                    error!("Neither MONGO_URI nor DB_USER/DB_PASSWORD/DB_CLUSTER are set");
                    return Err(ConfigError::EnvVarNotFound("MONGO_URI".to_string()));
                }
            },
        };

        let database = env_or("MONGO_DATABASE", "smart-bills");
        debug!("MongoDB database: {}", database);

        if let Some(ref user) = username {
            debug!("MongoDB username: {}", user);
        }
        if password.is_some() {
            debug!("MongoDB password provided");
        }

        let bills_collection = env_or("MONGO_BILLS_COLLECTION", "bills");
        let paid_bills_collection = env_or("MONGO_PAID_BILLS_COLLECTION", "paidBills");
        let users_collection = env_or("MONGO_USERS_COLLECTION", "users");

        let pool_size = env::var("MONGO_POOL_SIZE")
            .unwrap_or_else(|_| {
                warn!("MONGO_POOL_SIZE not set, using default: 10");
                "10".to_string()
            })
            .parse::<u32>()
            .map_err(|_| {
                error!("Invalid MONGO_POOL_SIZE value");
                ConfigError::InvalidValue("Invalid MONGO_POOL_SIZE value".to_string())
            })?;

        let connection_timeout_secs = env_or("MONGO_CONNECTION_TIMEOUT", "5")
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid MONGO_CONNECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid MONGO_CONNECTION_TIMEOUT value".to_string())
            })?;

        let server_selection_timeout_secs = env_or("MONGO_SERVER_SELECTION_TIMEOUT", "5")
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid MONGO_SERVER_SELECTION_TIMEOUT value");
                ConfigError::InvalidValue("Invalid MONGO_SERVER_SELECTION_TIMEOUT value".to_string())
            })?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            bills_collection,
            paid_bills_collection,
            users_collection,
            pool_size,
            connection_timeout_secs,
            server_selection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Atlas-style SRV connection string without userinfo. Credentials are
    /// attached by `database::connect`, so reserved characters in a password
    /// need no percent-encoding.
    pub fn srv_uri(cluster: &str) -> String {
        format!("mongodb+srv://{cluster}/?retryWrites=true&w=majority&appName=SmartBills")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uri.is_empty() {
            error!("MongoDB URI is empty");
            return Err(ConfigError::ValidationError("MongoDB URI cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            error!("MongoDB database is empty");
            return Err(ConfigError::ValidationError("MongoDB database cannot be empty".to_string()));
        }

        for (name, value) in [
            ("bills", &self.bills_collection),
            ("paid bills", &self.paid_bills_collection),
            ("users", &self.users_collection),
        ] {
            if value.is_empty() {
                error!("MongoDB {} collection name is empty", name);
                return Err(ConfigError::ValidationError(format!("MongoDB {name} collection cannot be empty")));
            }
        }

        if self.pool_size == 0 {
            error!("MongoDB pool size is 0");
            return Err(ConfigError::ValidationError("MongoDB pool size must be greater than 0".to_string()));
        }

        if self.connection_timeout_secs == 0 || self.server_selection_timeout_secs == 0 {
            error!("MongoDB timeout is 0");
            return Err(ConfigError::ValidationError("MongoDB timeouts must be greater than 0".to_string()));
        }

        if let Some(ref user) = self.username {
            if user.is_empty() {
                error!("MongoDB username is empty");
                return Err(ConfigError::ValidationError("MongoDB username cannot be empty if set".to_string()));
            }
        }
        if let Some(ref pass) = self.password {
            if pass.is_empty() {
                error!("MongoDB password is empty");
                return Err(ConfigError::ValidationError("MongoDB password cannot be empty if set".to_string()));
            }
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "smart-bills".to_string(),
            username: None,
            password: None,
            bills_collection: "bills".to_string(),
            paid_bills_collection: "paidBills".to_string(),
            users_collection: "users".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
            server_selection_timeout_secs: 5,
        }
    }
}
