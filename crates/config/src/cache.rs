//! Live location cache configuration

use serde::Deserialize;
use std::time::Duration;

/// Redis/Valkey cache settings
///
/// # Example
///
/// ```toml
/// [cache]
/// url = "redis://localhost:6379/0"
/// hash_key = "map:incidents"
/// sentinel_prefix = "incident"
/// default_ttl = "24h"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Connection URL, database index in the path
    /// Default: redis://localhost:6379/0
    pub url: String,

    /// Hash holding every active location
    /// Default: map:incidents
    pub hash_key: String,

    /// Sentinel keys are `{prefix}:{id}:expire`
    /// Default: incident
    pub sentinel_prefix: String,

    /// TTL when the incident has no end time, and the TTL ceiling
    /// Default: 24h
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,

    /// TTL floor for incidents whose end time already passed
    /// Default: 1m
    #[serde(with = "humantime_serde")]
    pub min_ttl: Duration,

    /// Delay before a consumer's single retry on a missing location
    /// Default: 250ms
    #[serde(with = "humantime_serde")]
    pub read_retry_delay: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".into(),
            hash_key: "map:incidents".into(),
            sentinel_prefix: "incident".into(),
            default_ttl: Duration::from_secs(24 * 60 * 60),
            min_ttl: Duration::from_secs(60),
            read_retry_delay: Duration::from_millis(250),
        }
    }
}
