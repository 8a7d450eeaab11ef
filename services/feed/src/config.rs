//! Service configuration loaded from `FEED_*` environment variables

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Which store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Feed service configuration
///
/// # Environment Variables
/// - `FEED_BIND_ADDRESS`: listen address (default: `0.0.0.0:8080`)
/// - `FEED_STORE`: `postgres` or `memory` (default: `postgres`)
/// - `FEED_MAX_PAGE_SIZE`: optional cap on `n_new` (default: unset)
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub bind_address: String,
    pub store: StoreBackend,
    #[serde(default)]
    pub max_page_size: Option<u32>,
}

impl FeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("store", "postgres")?
            .add_source(Environment::with_prefix("FEED").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear() {
        unsafe {
            env::remove_var("FEED_BIND_ADDRESS");
            env::remove_var("FEED_STORE");
            env::remove_var("FEED_MAX_PAGE_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_feed_config_defaults() {
        clear();

        let config = FeedConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.max_page_size, None);
    }

    #[test]
    #[serial]
    fn test_feed_config_from_env() {
        clear();
        unsafe {
            env::set_var("FEED_BIND_ADDRESS", "127.0.0.1:3001");
            env::set_var("FEED_STORE", "memory");
            env::set_var("FEED_MAX_PAGE_SIZE", "50");
        }

        let config = FeedConfig::from_env().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:3001");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.max_page_size, Some(50));

        clear();
    }

    #[test]
    #[serial]
    fn test_feed_config_rejects_unknown_store() {
        clear();
        unsafe {
            env::set_var("FEED_STORE", "mongodb");
        }

        assert!(FeedConfig::from_env().is_err());

        clear();
    }
}
