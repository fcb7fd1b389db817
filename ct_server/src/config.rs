//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use club_tournament::db::DatabaseConfig;
use club_tournament::tournament::{DEFAULT_MAX_CONFLICT_RETRIES, ManagerConfig};
use std::net::SocketAddr;

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Upper bound on conflict retries accepted from the environment
const MAX_CONFLICT_RETRIES: u32 = 100;

/// Where tournaments are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration, unused in memory mode
    pub database: DatabaseConfig,
    /// Tournament manager configuration
    pub manager: ManagerConfig,
    /// Prometheus scrape endpoint, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Storage backend
    pub storage: StorageMode,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory` - Keep tournaments in memory instead of PostgreSQL
    ///
    /// # Errors
    ///
    /// Returns error if a set variable cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or(default_bind()?),
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let storage = if in_memory {
            StorageMode::InMemory
        } else {
            StorageMode::Postgres
        };

        Ok(ServerConfig {
            bind,
            database,
            manager: manager_config()?,
            metrics_bind: parse_addr("METRICS_BIND")?,
            storage,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage == StorageMode::Postgres {
            if self.database.database_url.is_empty() {
                return Err(ConfigError::Invalid {
                    var: "DATABASE_URL".to_string(),
                    reason: "Must not be empty".to_string(),
                });
            }

            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }

            if self.database.statement_timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_STATEMENT_TIMEOUT".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if self.manager.max_conflict_retries > MAX_CONFLICT_RETRIES {
            return Err(ConfigError::Invalid {
                var: "TOURNAMENT_MAX_CONFLICT_RETRIES".to_string(),
                reason: format!("Must be at most {}", MAX_CONFLICT_RETRIES),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> Result<SocketAddr, ConfigError> {
    DEFAULT_BIND.parse().map_err(|_| ConfigError::Invalid {
        var: "SERVER_BIND".to_string(),
        reason: format!("Bad default address {}", DEFAULT_BIND),
    })
}

fn manager_config() -> Result<ManagerConfig, ConfigError> {
    let max_conflict_retries = match std::env::var("TOURNAMENT_MAX_CONFLICT_RETRIES") {
        Ok(value) => parse_count("TOURNAMENT_MAX_CONFLICT_RETRIES", &value)?,
        Err(_) => DEFAULT_MAX_CONFLICT_RETRIES,
    };

    Ok(ManagerConfig {
        max_conflict_retries,
    })
}

fn parse_count(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Not a non-negative integer: {}", value),
    })
}

/// Parse an optional socket address variable; set but unparseable is an error
fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Not a socket address: {}", value),
        }),
        Err(_) => Ok(None),
    }
}
