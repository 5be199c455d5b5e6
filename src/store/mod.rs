pub mod disk;
pub mod memory;

use crate::core::cache::{CacheKey, CacheStore};
use crate::core::config::AppConfig;
use async_trait::async_trait;
use disk::DiskCache;
use memory::MemoryCache;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Stand-in when the durable medium is unavailable: reads are empty and
/// writes are dropped.
pub struct DisabledCache;

#[async_trait]
impl CacheStore for DisabledCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        debug!("Cache disabled, MISS for key: {}", key);
        None
    }

    async fn set(&self, key: CacheKey, _payload: Value) {
        debug!("Cache disabled, dropping PUT for key: {}", key);
    }
}

/// Builds the cache store for a session from configuration.
pub fn open_cache_store(config: &AppConfig) -> Arc<dyn CacheStore> {
    if !config.cache.persist {
        debug!("Using in-memory price cache");
        return Arc::new(MemoryCache::new());
    }

    let opened = config
        .default_data_path()
        .and_then(|path| DiskCache::open(&path.join("cache")));
    match opened {
        Ok(cache) => Arc::new(cache),
        Err(e) => {
            warn!(error = %e, "Price cache unavailable, continuing without it");
            Arc::new(DisabledCache)
        }
    }
}
