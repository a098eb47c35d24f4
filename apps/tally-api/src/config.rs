//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address
    pub address: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size (at least 1)
    pub db_max_connections: u32,

    /// Deadline for one checkout, `None` when disabled
    pub checkout_timeout: Option<Duration>,

    /// Insert the demo catalog on startup when the catalog is empty
    pub seed_demo: bool,

    /// Log filter directive, used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let address = var("TALLY_ADDRESS", "0.0.0.0:8089")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_ADDRESS".to_string()))?;

        let database_path = PathBuf::from(var("TALLY_DATABASE_PATH", "./tally.db"));

        let db_max_connections: u32 = var("TALLY_DB_MAX_CONNECTIONS", "5")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_DB_MAX_CONNECTIONS".to_string()))?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TALLY_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        let timeout_ms: u64 = var("TALLY_CHECKOUT_TIMEOUT_MS", "10000")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_CHECKOUT_TIMEOUT_MS".to_string()))?;
        // 0 disables the deadline
        let checkout_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

        let seed_demo = var("TALLY_SEED_DEMO", "false")
            .parse()
            .map_err(|_| ConfigError::InvalidValue("TALLY_SEED_DEMO".to_string()))?;

        Ok(ApiConfig {
            address,
            database_path,
            db_max_connections,
            checkout_timeout,
            seed_demo,
            log_filter: var("TALLY_LOG", "info"),
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.address.port(), 8089);
        assert_eq!(config.database_path, PathBuf::from("./tally.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.checkout_timeout, Some(Duration::from_secs(10)));
        assert!(!config.seed_demo);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TALLY_ADDRESS", "127.0.0.1:9000"),
            ("TALLY_CHECKOUT_TIMEOUT_MS", "0"),
            ("TALLY_SEED_DEMO", "true"),
            ("TALLY_LOG", "tally_checkout=debug"),
        ])
        .unwrap();
        assert_eq!(config.address.to_string(), "127.0.0.1:9000");
        assert_eq!(config.checkout_timeout, None);
        assert!(config.seed_demo);
        assert_eq!(config.log_filter, "tally_checkout=debug");
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("TALLY_DB_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for TALLY_DB_MAX_CONNECTIONS");

        assert!(load(&[("TALLY_ADDRESS", "nowhere")]).is_err());
        assert!(load(&[("TALLY_CHECKOUT_TIMEOUT_MS", "-5")]).is_err());
        assert!(load(&[("TALLY_SEED_DEMO", "yes")]).is_err());
    }
}
