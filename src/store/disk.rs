use crate::core::cache::{CacheKey, CacheStore};
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "prices";

/// Durable cache stored in a fjall keyspace. Payloads are kept as JSON bytes.
pub struct DiskCache {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCache {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened disk cache at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl CacheStore for DiskCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        let res: Result<Option<Value>> = (|| {
            if let Some(bytes) = self.partition.get(key.to_string())? {
                debug!("Cache HIT for key: {}", key);
                return Ok(Some(serde_json::from_slice(&bytes)?));
            }
            debug!("Cache MISS for key: {}", key);
            Ok(None)
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                debug!("DiskCache get error for {}: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: CacheKey, payload: Value) {
        let res: Result<()> = (|| {
            self.partition
                .insert(key.to_string().as_bytes(), serde_json::to_vec(&payload)?)?;
            self.keyspace.persist(PersistMode::SyncAll)?;
            debug!("Cache PUT for key: {}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCache set error for {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::price::Coin;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_cache_get_set() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();

        assert!(cache.get(&CacheKey::Spot).await.is_none());

        let payload = json!({"bitcoin": {"eur": 50000}, "ethereum": {"eur": 3000}});
        cache.set(CacheKey::Spot, payload.clone()).await;
        assert_eq!(cache.get(&CacheKey::Spot).await, Some(payload));

        assert!(cache.get(&CacheKey::History(Coin::Bitcoin)).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_survives_reopen() {
        let dir = tempdir().unwrap();
        let key = CacheKey::History(Coin::Bitcoin);
        let pairs = json!([[1701561600000i64, 36712.34], [1701648000000i64, 37001.0]]);

        {
            let cache = DiskCache::open(dir.path()).unwrap();
            cache.set(key, pairs.clone()).await;
        }

        let reopened = DiskCache::open(dir.path()).unwrap();
        assert_eq!(reopened.get(&key).await, Some(pairs));
    }

    #[tokio::test]
    async fn test_disk_cache_corrupt_entry_reads_as_empty() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();

        cache
            .partition
            .insert("spot".as_bytes(), "not json".as_bytes())
            .unwrap();
        assert!(cache.get(&CacheKey::Spot).await.is_none());
    }
}
