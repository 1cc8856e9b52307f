//! Cache Module
//!
//! Generic in-memory memoization with TTL expiry and byte-size-bounded eviction.

mod clock;
mod entry;
mod stats;
mod ttl_cache;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use ttl_cache::{Cache, CacheConfig, SetOptions};

// == Public Constants ==
/// Default time-to-live applied when `set` is called without one (5 minutes)
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// Default ceiling on the summed serialized size of all entries (50 MB)
pub const DEFAULT_MAX_SIZE: usize = 50 * 1024 * 1024;

/// Default interval of the background expiry sweep (60 seconds)
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60 * 1000;
