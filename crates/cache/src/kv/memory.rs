//! In-process store with key expiry

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::KvStore;
use crate::{CacheError, Result};

/// Map-backed store
///
/// Expiry uses tokio's clock, so paused-time tests can advance past a TTL.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    strings: Mutex<HashMap<String, (String, Instant)>>,
    /// Keys whose commands fail
    broken: Mutex<HashSet<String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command touching `key` fail
    pub fn break_key(&self, key: impl Into<String>) {
        self.broken.lock().insert(key.into());
    }

    /// Remaining lifetime of a string key
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let strings = self.strings.lock();
        let (_, deadline) = strings.get(key)?;
        deadline.checked_duration_since(Instant::now())
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.broken.lock().contains(key) {
            return Err(CacheError::Unavailable(format!("key '{key}' marked broken")));
        }
        Ok(())
    }

    fn live_string(&self, key: &str) -> bool {
        let mut strings = self.strings.lock();
        match strings.get(key) {
            Some((_, deadline)) if *deadline > Instant::now() => true,
            Some(_) => {
                strings.remove(key);
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        self.check(key)?;
        self.hashes
            .lock()
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.check(key)?;
        Ok(self
            .hashes
            .lock()
            .get(key)
            .and_then(|h| h.get(field).cloned()))
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        self.check(key)?;
        let mut hashes = self.hashes.lock();
        let Some(hash) = hashes.get_mut(key) else {
            return Ok(false);
        };
        let removed = hash.remove(field).is_some();
        if hash.is_empty() {
            hashes.remove(key);
        }
        Ok(removed)
    }

    async fn hkeys(&self, key: &str) -> Result<Vec<String>> {
        self.check(key)?;
        Ok(self
            .hashes
            .lock()
            .get(key)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        self.check(key)?;
        Ok(self
            .hashes
            .lock()
            .get(key)
            .map(|h| h.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn hlen(&self, key: &str) -> Result<usize> {
        self.check(key)?;
        Ok(self.hashes.lock().get(key).map_or(0, HashMap::len))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.check(key)?;
        self.strings
            .lock()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check(key)?;
        Ok(self.live_string(key) || self.hashes.lock().contains_key(key))
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.check(key)?;
        let live = self.live_string(key);
        self.strings.lock().remove(key);
        let hash = self.hashes.lock().remove(key).is_some();
        Ok(live || hash)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
