//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::Serialize;
use serde_json::Value;

// == Cache Entry ==
/// A single cached value plus its bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry<T> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: T,
    /// Serialized size of `value` in bytes
    pub size: usize,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), always set at creation
    pub expires_at: u64,
    /// Caller-supplied metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl<T> CacheEntry<T> {
    // == Is Expired ==
    /// An entry is expired once `now >= expires_at`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}
