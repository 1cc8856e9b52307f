//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

/// Longest cache key accepted over HTTP.
pub const MAX_KEY_LEN: usize = 256;

/// Request body for `PUT /cache`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional TTL in milliseconds (cache default if omitted)
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Opaque data stored alongside the entry
    #[serde(default)]
    pub metadata: Option<Value>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LEN {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LEN
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be positive".to_string());
        }
        None
    }
}
