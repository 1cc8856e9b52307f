//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::services::OutboxItem;

/// Response body for `GET /cache/:key`.
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for `PUT /cache`.
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache/:key`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for `GET /cache/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Summed estimated size of live entries, in bytes
    pub total_size: usize,
    pub entries: usize,
    /// hits / (hits + misses), 0 when nothing was read yet
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            total_size: stats.total_size,
            entries: stats.entries,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for `GET /stores`.
#[derive(Debug, Clone, Serialize)]
pub struct StoresResponse {
    pub stores: Vec<String>,
}

/// Response body for `GET /stores/:name`.
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    pub store: String,
    pub state: Value,
}

/// Response body for `POST /stores/:name/dispatch`.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResponse {
    pub store: String,
    /// Action kind as sent by the client
    pub action: String,
    /// State after the reducer ran
    pub state: Value,
}

/// Response body for `GET /outbox`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboxResponse {
    pub pending: usize,
}

/// Response body for `POST /outbox/drain`.
#[derive(Debug, Clone, Serialize)]
pub struct DrainResponse {
    pub drained: usize,
    /// Oldest first
    pub items: Vec<OutboxItem>,
}

impl From<Vec<OutboxItem>> for DrainResponse {
    fn from(items: Vec<OutboxItem>) -> Self {
        Self {
            drained: items.len(),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("labs:p1", json!({ "ldl": 120 }));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({ "key": "labs:p1", "value": { "ldl": 120 } }));
    }

    #[test]
    fn test_set_and_delete_messages() {
        assert!(SetResponse::new("k").message.contains("set successfully"));
        assert!(DeleteResponse::new("k").message.contains("deleted successfully"));
    }

    #[test]
    fn test_stats_response_from_cache_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            evictions: 5,
            total_size: 1024,
            entries: 7,
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.total_size, 1024);
        assert_eq!(resp.entries, 7);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
