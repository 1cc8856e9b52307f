//! TTL Cache Module
//!
//! Main cache engine: HashMap storage, TTL expiry and size-bounded eviction
//! ordered by soonest expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_MAX_SIZE, DEFAULT_SWEEP_INTERVAL_MS,
    DEFAULT_TTL_MS,
};
use crate::external::{ErrorRecord, ErrorReporter, TracingReporter};

// == Cache Config ==
/// Construction parameters for a [`Cache`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Ceiling on the summed serialized size of all entries, in bytes
    pub max_size: usize,
    /// Interval of the background expiry sweep
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
            max_size: DEFAULT_MAX_SIZE,
            sweep_interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
        }
    }
}

// == Set Options ==
/// Per-entry overrides for [`Cache::set`].
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub ttl: Option<Duration>,
    pub metadata: Option<Value>,
}

impl SetOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// == Cache ==
/// Bounded, TTL-based memoization of serializable values.
///
/// Entries are sized by the length of their JSON serialization. When an
/// insert would push the total past `max_size`, entries are evicted in order
/// of soonest expiry until the new value fits.
pub struct Cache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Sum of `entry.size` over `entries`
    total_size: usize,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn ErrorReporter>,
}

impl<T> Cache<T> {
    // == Constructor ==
    /// Creates a cache using the wall clock and tracing-based error reporting.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_collaborators(config, Arc::new(SystemClock), Arc::new(TracingReporter))
    }

    /// Creates a cache with an explicit clock and error reporter.
    pub fn with_collaborators(
        config: CacheConfig,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            total_size: 0,
            stats: CacheStats::new(),
            config,
            clock,
            reporter,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Has ==
    /// Returns true if a live entry exists. Expired entries are dropped; counters are untouched.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.remove_entry(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.total_size = 0;
    }

    // == Purge Expired ==
    /// Removes every entry whose deadline has passed. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.is_expired_at(now))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the counters and footprint.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_size = self.total_size;
        stats.entries = self.entries.len();
        stats
    }

    /// Zeroes hit, miss and eviction counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset_counters();
    }

    // == Introspection ==
    /// Keys of live entries, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|entry| entry.key.as_str())
    }

    /// Values of live entries, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries().map(|entry| &entry.value)
    }

    /// Live entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry<T>> {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(move |entry| !entry.is_expired_at(now))
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.total_size = self.total_size.saturating_sub(entry.size);
        Some(entry)
    }

    // == Evict ==
    /// Evicts soonest-expiring entries until `incoming` more bytes fit or nothing is left.
    fn evict_for(&mut self, incoming: usize) {
        let mut order: Vec<(u64, u64, String)> = self
            .entries
            .values()
            .map(|entry| (entry.expires_at, entry.created_at, entry.key.clone()))
            .collect();
        order.sort();

        for (_, _, key) in order {
            if self.total_size + incoming <= self.config.max_size {
                break;
            }
            if self.remove_entry(&key).is_some() {
                self.stats.record_eviction();
                debug!(key = %key, "cache entry evicted");
            }
        }
    }
}

impl<T: Serialize> Cache<T> {
    // == Set ==
    /// Stores a value, evicting as needed.
    ///
    /// Returns false without storing anything when the value cannot be
    /// serialized (reported to the error collaborator) or when its size alone
    /// exceeds `max_size`.
    pub fn set(&mut self, key: impl Into<String>, value: T, options: SetOptions) -> bool {
        let key = key.into();

        let size = match serde_json::to_vec(&value) {
            Ok(bytes) => bytes.len(),
            Err(e) => {
                self.reporter.report(
                    ErrorRecord::new("CacheError", e.to_string(), "CACHE_SIZE_CALCULATION")
                        .with_context(json!({ "key": key })),
                );
                return false;
            }
        };

        if size > self.config.max_size {
            warn!(
                key = %key,
                size,
                max_size = self.config.max_size,
                "cache value larger than max size, not stored"
            );
            return false;
        }

        // An overwrite releases the old entry's footprint before sizing the new one
        self.remove_entry(&key);

        if self.total_size + size > self.config.max_size {
            self.evict_for(size);
        }

        let now = self.clock.now_ms();
        let ttl = options.ttl.unwrap_or(self.config.default_ttl);
        let entry = CacheEntry {
            key: key.clone(),
            value,
            size,
            created_at: now,
            expires_at: now.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)),
            metadata: options.metadata,
        };

        self.entries.insert(key, entry);
        self.total_size += size;
        true
    }
}

impl<T: Clone> Cache<T> {
    // == Get ==
    /// Returns a clone of the value if present and not expired.
    ///
    /// Absent and expired keys count as misses; expired entries are removed.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            Some(_) => {
                self.remove_entry(key);
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }
}
