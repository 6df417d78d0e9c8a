//! Configuration validation
//!
//! Rejects values that would make the pipeline unusable:
//! - Zero-sized worker pool, queue, or batch
//! - Zero flush or reporting intervals
//! - QoS outside 0..=2 and unparseable broker addresses
//! - Empty cache keys and a TTL floor above the ceiling

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_mqtt(config)?;
    validate_clickhouse(config)?;
    validate_cache(config)?;
    validate_workers(config)?;
    validate_intervals(config)?;
    Ok(())
}

fn validate_mqtt(config: &Config) -> Result<()> {
    if config.mqtt.qos > 2 {
        return Err(ConfigError::invalid_value(
            "mqtt",
            "qos",
            format!("{} is not 0, 1 or 2", config.mqtt.qos),
        ));
    }
    if config.mqtt.topic.is_empty() {
        return Err(ConfigError::invalid_value("mqtt", "topic", "must not be empty"));
    }
    config.mqtt.host_port()?;
    Ok(())
}

fn validate_clickhouse(config: &Config) -> Result<()> {
    if config.clickhouse.batch_size == 0 {
        return Err(ConfigError::invalid_value(
            "clickhouse",
            "batch_size",
            "must be at least 1",
        ));
    }
    if config.clickhouse.table.is_empty() {
        return Err(ConfigError::invalid_value(
            "clickhouse",
            "table",
            "must not be empty",
        ));
    }
    Ok(())
}

fn validate_cache(config: &Config) -> Result<()> {
    let cache = &config.cache;
    if cache.hash_key.is_empty() {
        return Err(ConfigError::invalid_value("cache", "hash_key", "must not be empty"));
    }
    if cache.min_ttl < Duration::from_secs(1) {
        return Err(ConfigError::invalid_value(
            "cache",
            "min_ttl",
            "must be at least 1s",
        ));
    }
    if cache.min_ttl > cache.default_ttl {
        return Err(ConfigError::invalid_value(
            "cache",
            "min_ttl",
            "must not exceed default_ttl",
        ));
    }
    Ok(())
}

fn validate_workers(config: &Config) -> Result<()> {
    if config.workers.count == 0 {
        return Err(ConfigError::invalid_value("workers", "count", "must be at least 1"));
    }
    if config.workers.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "workers",
            "queue_size",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_intervals(config: &Config) -> Result<()> {
    if config.clickhouse.flush_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "clickhouse",
            "flush_interval",
            "must be greater than zero",
        ));
    }
    if config.metrics.enabled && config.metrics.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "metrics",
            "interval",
            "must be greater than zero",
        ));
    }
    if config.routing.enabled && config.routing.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "routing",
            "timeout",
            "must be greater than zero",
        ));
    }
    Ok(())
}
