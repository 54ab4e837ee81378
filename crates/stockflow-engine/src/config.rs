//! Engine configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. VAT is compiled in and deliberately absent here.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use stockflow_db::DbConfig;
use tracing_subscriber::EnvFilter;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub connect_timeout_secs: u64,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: PathBuf::from("./stockflow.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `STOCKFLOW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            database_path: lookup("STOCKFLOW_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: lookup("STOCKFLOW_MAX_CONNECTIONS")
                .map(|v| v.parse::<u32>())
                .transpose()
                .map_err(|_| ConfigError::InvalidValue("STOCKFLOW_MAX_CONNECTIONS".to_string()))?
                .unwrap_or(defaults.max_connections),

            connect_timeout_secs: lookup("STOCKFLOW_CONNECT_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .map_err(|_| {
                    ConfigError::InvalidValue("STOCKFLOW_CONNECT_TIMEOUT_SECS".to_string())
                })?
                .unwrap_or(defaults.connect_timeout_secs),

            log_filter: lookup("STOCKFLOW_LOG").unwrap_or(defaults.log_filter),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKFLOW_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool settings for [`stockflow_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }

    /// Installs the global `tracing` subscriber.
    ///
    /// `RUST_LOG` wins over `log_filter` when set.
    pub fn init_tracing(&self) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_filter))
            .map_err(|_| ConfigError::InvalidValue("STOCKFLOW_LOG".to_string()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| ConfigError::Logging(e.to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
