//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::Cache;

/// Shortest period the sweep will tick at; a zero interval is raised to this.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that purges expired entries every `interval`.
///
/// The first sweep runs one full interval after spawning. An interval below
/// [`MIN_SWEEP_INTERVAL`] is raised to it with a warning. The returned handle
/// is aborted by [`crate::Portal::shutdown`].
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(Cache::<String>::new(CacheConfig::default())));
/// let sweep = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_sweep_task<T>(cache: Arc<RwLock<Cache<T>>>, interval: Duration) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    let interval = if interval < MIN_SWEEP_INTERVAL {
        warn!(
            requested = ?interval,
            minimum = ?MIN_SWEEP_INTERVAL,
            "cache sweep interval too short, using minimum"
        );
        MIN_SWEEP_INTERVAL
    } else {
        interval
    };

    tokio::spawn(async move {
        info!(interval = ?interval, "starting cache sweep task");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let removed = {
                let mut guard = cache.write().await;
                guard.purge_expired()
            };

            if removed > 0 {
                info!("cache sweep: removed {} expired entries", removed);
            } else {
                debug!("cache sweep: no expired entries found");
            }
        }
    })
}
