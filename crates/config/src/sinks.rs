//! ClickHouse durable store configuration

use serde::Deserialize;
use std::time::Duration;

/// ClickHouse connection and batching
///
/// # Example
///
/// ```toml
/// [clickhouse]
/// url = "http://localhost:8123"
/// database = "beacon"
/// username = "default"
/// table = "traffic_incidents"
/// batch_size = 100
/// flush_interval = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClickHouseConfig {
    /// HTTP endpoint
    /// Default: http://localhost:8123
    pub url: String,

    /// Database name
    /// Default: beacon
    pub database: String,

    /// Default: default
    pub username: String,

    pub password: Option<String>,

    /// Incident history table
    /// Default: traffic_incidents
    pub table: String,

    /// Rows buffered before an immediate flush
    /// Default: 100
    pub batch_size: usize,

    /// Periodic flush interval
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// Server-side `max_execution_time` in seconds
    /// Default: 60
    pub max_execution_time: u64,
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".into(),
            database: "beacon".into(),
            username: "default".into(),
            password: None,
            table: "traffic_incidents".into(),
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
            max_execution_time: 60,
        }
    }
}
