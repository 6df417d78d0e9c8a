//! Live location cache

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use beacon_config::CacheConfig;
use beacon_protocol::MapLocation;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{CacheError, CacheMetrics, KvStore, Result, calculate_ttl};

/// Something that can report how many incidents are currently active
#[async_trait]
pub trait ActiveCounter: Send + Sync {
    async fn active_count(&self) -> Result<usize>;
}

/// Current map location per incident, with emulated per-entry expiry
///
/// Concurrent stores for the same id are last-write-wins on both the hash
/// field and the sentinel.
pub struct LocationCache<K> {
    kv: K,
    hash_key: String,
    sentinel_prefix: String,
    min_ttl: Duration,
    default_ttl: Duration,
    metrics: Arc<CacheMetrics>,
}

impl<K: KvStore> LocationCache<K> {
    pub fn new(kv: K, config: &CacheConfig, metrics: Arc<CacheMetrics>) -> Self {
        Self {
            kv,
            hash_key: config.hash_key.clone(),
            sentinel_prefix: config.sentinel_prefix.clone(),
            min_ttl: config.min_ttl,
            default_ttl: config.default_ttl,
            metrics,
        }
    }

    /// Key whose expiry marks the end of `id`'s entry
    pub fn sentinel_key(&self, id: &str) -> String {
        format!("{}:{}:expire", self.sentinel_prefix, id)
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Store or replace `location`, expiring when the incident ends
    ///
    /// # Errors
    ///
    /// Returns error if the location cannot be encoded or either write fails.
    /// A failed field write leaves only the sentinel behind, which expires
    /// on its own.
    pub async fn store(&self, location: &MapLocation, end: Option<DateTime<Utc>>) -> Result<()> {
        self.store_at(location, end, Utc::now()).await
    }

    /// [`store`](Self::store) with an explicit clock
    pub async fn store_at(
        &self,
        location: &MapLocation,
        end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let ttl = calculate_ttl(end, now, self.min_ttl, self.default_ttl);
        let result = self.write(location, ttl).await;
        match &result {
            Ok(()) => self.metrics.stores.inc(),
            Err(_) => self.metrics.store_errors.inc(),
        }
        result
    }

    async fn write(&self, location: &MapLocation, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(location).map_err(|source| CacheError::Encode {
            id: location.id.clone(),
            source,
        })?;

        // Sentinel first: a sweep between the two writes must not see a
        // field without its sentinel
        self.kv
            .set_ex(&self.sentinel_key(&location.id), "1", ttl)
            .await?;
        self.kv.hset(&self.hash_key, &location.id, &json).await?;

        debug!(id = %location.id, ttl_secs = ttl.as_secs(), "location cached");
        Ok(())
    }

    /// Current location of `id`, `None` when absent
    pub async fn get(&self, id: &str) -> Result<Option<MapLocation>> {
        let Some(json) = self.kv.hget(&self.hash_key, id).await? else {
            self.metrics.misses.inc();
            return Ok(None);
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| {
                self.metrics.decode_errors.inc();
                CacheError::Decode {
                    id: id.to_string(),
                    source,
                }
            })
    }

    /// Read `id`, retrying once after `delay` when it is not there yet
    ///
    /// Writes land in the cache before the durable store, but a reader that
    /// learned about an incident elsewhere can still race the cache write.
    pub async fn get_with_retry(&self, id: &str, delay: Duration) -> Result<Option<MapLocation>> {
        if let Some(location) = self.get(id).await? {
            return Ok(Some(location));
        }
        tokio::time::sleep(delay).await;
        self.get(id).await
    }

    /// Every active location, after removing expired entries
    ///
    /// Entries that fail to decode are logged and skipped.
    pub async fn get_all(&self) -> Result<Vec<MapLocation>> {
        self.sweep().await?;

        let values = self.kv.hvals(&self.hash_key).await?;
        let mut locations = Vec::with_capacity(values.len());
        for json in values {
            match serde_json::from_str::<MapLocation>(&json) {
                Ok(location) => locations.push(location),
                Err(e) => {
                    self.metrics.decode_errors.inc();
                    warn!(error = %e, "skipping undecodable cached location");
                }
            }
        }
        Ok(locations)
    }

    /// Remove `id` and its sentinel
    ///
    /// # Errors
    ///
    /// Returns error only if the hash field could not be removed; the
    /// sentinel delete is best effort.
    pub async fn remove(&self, id: &str) -> Result<()> {
        if let Err(e) = self.kv.hdel(&self.hash_key, id).await {
            self.metrics.remove_errors.inc();
            return Err(e);
        }
        self.metrics.removes.inc();

        if let Err(e) = self.kv.del(&self.sentinel_key(id)).await {
            debug!(id, error = %e, "failed to delete sentinel key");
        }
        Ok(())
    }

    /// Remove hash fields whose sentinel has expired
    ///
    /// Returns how many were removed. An id whose check or delete fails is
    /// left for the next sweep.
    pub async fn sweep(&self) -> Result<usize> {
        let start = Instant::now();
        let ids = self.kv.hkeys(&self.hash_key).await?;

        let mut expired = 0;
        for id in &ids {
            match self.kv.exists(&self.sentinel_key(id)).await {
                Ok(true) => {}
                Ok(false) => match self.kv.hdel(&self.hash_key, id).await {
                    Ok(_) => expired += 1,
                    Err(e) => debug!(id = %id, error = %e, "failed to remove expired location"),
                },
                Err(e) => debug!(id = %id, error = %e, "failed to check sentinel"),
            }
        }

        self.metrics.expired.add(expired as u64);
        self.metrics.sweep_duration.observe_duration(start.elapsed());
        if expired > 0 {
            debug!(expired, scanned = ids.len(), "swept expired locations");
        }
        Ok(expired)
    }

    /// Number of active locations, after removing expired entries
    pub async fn active_count(&self) -> Result<usize> {
        self.sweep().await?;
        self.kv.hlen(&self.hash_key).await
    }

    /// Connectivity check used at startup
    pub async fn ping(&self) -> Result<()> {
        self.kv.ping().await
    }

    /// Log final state; connections are released on drop
    pub async fn close(&self) -> Result<()> {
        let active = self.kv.hlen(&self.hash_key).await?;
        info!(
            active,
            stores = self.metrics.stores.get(),
            removes = self.metrics.removes.get(),
            "location cache closed"
        );
        Ok(())
    }
}

#[async_trait]
impl<K: KvStore> ActiveCounter for LocationCache<K> {
    async fn active_count(&self) -> Result<usize> {
        LocationCache::active_count(self).await
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
