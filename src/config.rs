//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Default TTL used by the process-wide default cache (6 hours).
pub const DEFAULT_CACHE_TTL: u64 = 21_600;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default TTL in seconds for entries set without one (0 = never expire)
    pub default_ttl: u64,
    /// Background sweep interval in seconds (0 = no sweep, expiry stays lazy)
    pub check_period: u64,
    /// Maximum number of entries, None = unlimited
    pub max_keys: Option<usize>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 0)
    /// - `CACHE_CHECK_PERIOD` - Sweep frequency in seconds (default: 600)
    /// - `CACHE_MAX_KEYS` - Maximum entries (default: unlimited)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            check_period: env::var("CACHE_CHECK_PERIOD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.check_period),
            max_keys: env::var("CACHE_MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }

    /// Sets the default TTL in seconds.
    pub fn with_default_ttl(mut self, default_ttl: u64) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the sweep interval in seconds.
    pub fn with_check_period(mut self, check_period: u64) -> Self {
        self.check_period = check_period;
        self
    }

    /// Sets the entry limit.
    pub fn with_max_keys(mut self, max_keys: Option<usize>) -> Self {
        self.max_keys = max_keys;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: 0,
            check_period: 600,
            max_keys: None,
        }
    }
}
