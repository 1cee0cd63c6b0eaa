//! Refresh Task
//!
//! Refetches one owner's data set from upstream and stores it, acting on
//! the cache's near-expiry signal or on an explicit sync request.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{DataType, ScopedCache};
use crate::source::DataSource;

/// Fetches `data_type` for the owner and caches the result.
///
/// A successful store completes the key's pending refresh. When the fetch
/// fails the marker is cleared by hand so that a later stale read can
/// request another attempt; the stale entry stays readable until its TTL
/// runs out. Returns true if fresh data was cached.
pub async fn refresh_entry(
    cache: &ScopedCache<Value>,
    source: &dyn DataSource,
    owner_id: &str,
    data_type: DataType,
) -> bool {
    match source.fetch(owner_id, data_type).await {
        Ok(data) => {
            let stored = cache.set(owner_id, data_type, data);
            if stored {
                info!(owner = owner_id, %data_type, "Background refresh completed");
            }
            stored
        }
        Err(err) => {
            cache.complete_refresh(owner_id, data_type);
            warn!(owner = owner_id, %data_type, error = %err, "Background refresh failed");
            false
        }
    }
}

/// Spawns `refresh_entry` on the runtime.
pub fn spawn_refresh(
    cache: Arc<ScopedCache<Value>>,
    source: Arc<dyn DataSource>,
    owner_id: String,
    data_type: DataType,
) -> JoinHandle<bool> {
    info!(owner = %owner_id, %data_type, "Scheduling background refresh");
    tokio::spawn(async move { refresh_entry(&cache, source.as_ref(), &owner_id, data_type).await })
}
