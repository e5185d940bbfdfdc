//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, TimeZone, Utc};

// == Expiry ==
/// When an entry expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry lives until it is deleted or the cache is flushed
    Never,
    /// The entry expires at this instant
    At(DateTime<Utc>),
}

// == Cache Entry ==
/// A stored payload plus its expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<P> {
    /// The stored payload
    pub payload: P,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<P> CacheEntry<P> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// A TTL of zero means the entry never expires.
    ///
    /// # Arguments
    /// * `payload` - The payload to store
    /// * `ttl_seconds` - TTL in seconds
    pub fn new(payload: P, ttl_seconds: u64) -> Self {
        Self {
            payload,
            expires_at: expiry_from_ttl(current_timestamp_ms(), ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Redefine TTL ==
    /// Resets the expiration to `ttl_seconds` from now (zero clears it).
    pub fn set_ttl(&mut self, ttl_seconds: u64) {
        self.expires_at = expiry_from_ttl(current_timestamp_ms(), ttl_seconds);
    }

    // == Expiry ==
    /// Returns the expiration as a wall-clock instant.
    ///
    /// Expirations past what a `DateTime` can represent read as `Never`.
    pub fn expiry(&self) -> Expiry {
        self.expires_at
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map_or(Expiry::Never, Expiry::At)
    }
}

fn expiry_from_ttl(now: u64, ttl_seconds: u64) -> Option<u64> {
    if ttl_seconds == 0 {
        None
    } else {
        Some(now.saturating_add(ttl_seconds.saturating_mul(1000)))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
