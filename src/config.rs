//! Configuration Module
//!
//! Loads the portal core's settings from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_SWEEP_INTERVAL_MS, DEFAULT_TTL_MS};

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL in milliseconds for cache entries set without one
    pub cache_default_ttl_ms: u64,
    /// Upper bound on the summed estimated size of cache entries, in bytes
    pub cache_max_size: usize,
    /// Interval of the background expiry sweep, in milliseconds
    pub cache_sweep_interval_ms: u64,
    /// Admin HTTP server port
    pub server_port: u16,
    /// Directory for persisted store state; in-memory when unset
    pub persistence_dir: Option<PathBuf>,
    /// Adds the logging middleware to every domain store
    pub log_actions: bool,
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_MS` - Default entry TTL (default: 300000)
    /// - `CACHE_MAX_SIZE` - Cache size budget in bytes (default: 50 MiB)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency (default: 60000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PERSISTENCE_DIR` - Store persistence directory (default: unset)
    /// - `LOG_ACTIONS` - Log every dispatch (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_default_ttl_ms: parse_var("CACHE_DEFAULT_TTL_MS", defaults.cache_default_ttl_ms),
            cache_max_size: parse_var("CACHE_MAX_SIZE", defaults.cache_max_size),
            cache_sweep_interval_ms: parse_var(
                "CACHE_SWEEP_INTERVAL_MS",
                defaults.cache_sweep_interval_ms,
            ),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            persistence_dir: env::var_os("PERSISTENCE_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            log_actions: parse_var("LOG_ACTIONS", defaults.log_actions),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_millis(self.cache_default_ttl_ms),
            max_size: self.cache_max_size,
            sweep_interval: Duration::from_millis(self.cache_sweep_interval_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_default_ttl_ms: DEFAULT_TTL_MS,
            cache_max_size: DEFAULT_MAX_SIZE,
            cache_sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            server_port: 3000,
            persistence_dir: None,
            log_actions: false,
        }
    }
}
