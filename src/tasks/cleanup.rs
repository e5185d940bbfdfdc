//! TTL Cleanup Task
//!
//! Background task that periodically purges expired cache entries and the
//! tag memberships they held.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically purges expired entries.
///
/// The task sleeps for `cleanup_interval_secs` between runs and takes the
/// write lock for each purge. Returns None without spawning when the
/// interval is zero; expiry then stays purely lazy.
///
/// # Arguments
/// * `cache` - Shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Example
/// ```ignore
/// let cache = TagCache::<String>::new(0).into_shared();
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 1);
/// // Later, during shutdown:
/// if let Some(handle) = cleanup_handle {
///     handle.abort();
/// }
/// ```
pub fn spawn_cleanup_task<V>(
    cache: SharedCache<V>,
    cleanup_interval_secs: u64,
) -> Option<JoinHandle<()>>
where
    V: Clone + Send + Sync + 'static,
{
    if cleanup_interval_secs == 0 {
        debug!("TTL cleanup disabled (interval is 0)");
        return None;
    }

    let interval = Duration::from_secs(cleanup_interval_secs);

    Some(tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.purge_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    }))
}
