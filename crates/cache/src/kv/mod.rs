//! Key-value store abstraction
//!
//! The handful of hash and string commands the location cache needs. The
//! Redis implementation is used in production; the in-memory one backs
//! tests and `--dry-run`.

mod memory;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

pub use memory::MemoryKvStore;
pub use redis_store::RedisStore;

/// Hash and expiring-string commands
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Set `field` in hash `key`, replacing any previous value
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()>;

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Returns whether the field existed
    async fn hdel(&self, key: &str, field: &str) -> Result<bool>;

    async fn hkeys(&self, key: &str) -> Result<Vec<String>>;

    async fn hvals(&self, key: &str) -> Result<Vec<String>>;

    async fn hlen(&self, key: &str) -> Result<usize>;

    /// Set a string key that expires after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns whether the key existed
    async fn del(&self, key: &str) -> Result<bool>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<()> {
        (**self).hset(key, field, value).await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>> {
        (**self).hget(key, field).await
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<bool> {
        (**self).hdel(key, field).await
    }

    async fn hkeys(&self, key: &str) -> Result<Vec<String>> {
        (**self).hkeys(key).await
    }

    async fn hvals(&self, key: &str) -> Result<Vec<String>> {
        (**self).hvals(key).await
    }

    async fn hlen(&self, key: &str) -> Result<usize> {
        (**self).hlen(key).await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set_ex(key, value, ttl).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        (**self).del(key).await
    }

    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }
}
