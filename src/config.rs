//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, ClassConfig, DataType};
use crate::error::Result;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-class cache limits
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Simulated upstream latency for the sample data source
    pub fetch_latency: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    /// - `FETCH_LATENCY_MS` - Sample source latency in milliseconds (default: 100)
    /// - `<CLASS>_CACHE_MAX_SIZE` - Max entries for a class, where `<CLASS>` is
    ///   `GRADES`, `COURSES`, `ASSIGNMENTS` or `TOKENS`
    /// - `<CLASS>_CACHE_TTL` - TTL in seconds for a class
    pub fn from_env() -> Self {
        let cache = DataType::ALL
            .into_iter()
            .fold(CacheConfig::default(), |cache, data_type| {
                let defaults = data_type.default_config();
                let prefix = data_type.env_prefix();
                let class = ClassConfig::new(
                    env_or(&format!("{prefix}_CACHE_MAX_SIZE"), defaults.max_size),
                    Duration::from_secs(env_or(
                        &format!("{prefix}_CACHE_TTL"),
                        defaults.ttl.as_secs(),
                    )),
                );
                cache.with_class(data_type, class)
            });

        Self {
            cache,
            server_port: env_or("SERVER_PORT", 8000),
            cleanup_interval: env_or("CLEANUP_INTERVAL", 30),
            fetch_latency: Duration::from_millis(env_or("FETCH_LATENCY_MS", 100)),
        }
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        if self.cleanup_interval == 0 {
            return Err(crate::error::CacheError::InvalidConfig(
                "CLEANUP_INTERVAL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 8000,
            cleanup_interval: 30,
            fetch_latency: Duration::from_millis(100),
        }
    }
}

/// Reads and parses `name`, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.cleanup_interval, 30);
        assert_eq!(config.fetch_latency, Duration::from_millis(100));
        assert_eq!(config.cache, CacheConfig::default());
        assert!(config.validate().is_ok());
    }

    // Env-driven cases share one test so parallel tests never race on the
    // process environment.
    #[test]
    fn test_config_from_env() {
        for name in [
            "SERVER_PORT",
            "CLEANUP_INTERVAL",
            "FETCH_LATENCY_MS",
            "GRADES_CACHE_MAX_SIZE",
            "GRADES_CACHE_TTL",
            "TOKENS_CACHE_TTL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.cache, CacheConfig::default());

        env::set_var("GRADES_CACHE_MAX_SIZE", "2");
        env::set_var("GRADES_CACHE_TTL", "60");
        env::set_var("TOKENS_CACHE_TTL", "not-a-number");
        env::set_var("SERVER_PORT", "9100");

        let config = Config::from_env();
        assert_eq!(
            config.cache.class(DataType::Grades),
            ClassConfig::new(2, Duration::from_secs(60))
        );
        assert_eq!(
            config.cache.class(DataType::Tokens),
            DataType::Tokens.default_config()
        );
        assert_eq!(config.server_port, 9100);

        for name in [
            "GRADES_CACHE_MAX_SIZE",
            "GRADES_CACHE_TTL",
            "TOKENS_CACHE_TTL",
            "SERVER_PORT",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_validate_rejects_zero_cleanup_interval() {
        let config = Config {
            cleanup_interval: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
