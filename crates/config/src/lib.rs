//! Beacon Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use beacon_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[workers]\ncount = 4").unwrap();
//! assert_eq!(config.workers.count, 4);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [mqtt]
//! broker = "tcp://mosquitto:1883"
//!
//! [clickhouse]
//! url = "http://clickhouse:8123"
//! database = "beacon"
//!
//! [cache]
//! url = "redis://valkey:6379/0"
//!
//! [routing]
//! osrm_url = "http://osrm:5000"
//! ```
//!
//! Connection settings can also be overridden from the environment, see
//! [`Config::apply_env`].

mod cache;
mod env;
mod error;
mod global;
mod logging;
mod metrics;
mod ops;
mod routing;
mod sinks;
mod sources;
mod validation;
mod workers;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use cache::CacheConfig;
pub use error::{ConfigError, Result};
pub use global::GlobalConfig;
pub use logging::{CLIENT_TARGETS, LogConfig, LogFormat, LogLevel, LogOutput};
pub use metrics::{MetricsConfig, MetricsFormat};
pub use ops::OpsConfig;
pub use routing::RoutingConfig;
pub use sinks::ClickHouseConfig;
pub use sources::MqttConfig;
pub use workers::WorkersConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Process-wide settings (shutdown timeout)
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Metrics reporting configuration
    pub metrics: MetricsConfig,

    /// MQTT broker connection and subscription
    pub mqtt: MqttConfig,

    /// ClickHouse durable store
    pub clickhouse: ClickHouseConfig,

    /// Redis/Valkey live location cache
    pub cache: CacheConfig,

    /// OSRM route resolution
    pub routing: RoutingConfig,

    /// Worker pool sizing
    pub workers: WorkersConfig,

    /// Operational HTTP endpoints (health, metrics)
    pub ops: OpsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or contains invalid TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Override connection settings from process environment variables
    ///
    /// Recognised variables: `MQTT_BROKER`, `CLICKHOUSE_URL`,
    /// `CLICKHOUSE_DATABASE`, `CLICKHOUSE_USER`, `CLICKHOUSE_PASSWORD`,
    /// `REDIS_URL`, `OSRM_URL`, `METRICS_PORT`.
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an invalid value or the resulting
    /// configuration fails validation.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`apply_env`](Self::apply_env) with a custom variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        env::apply(self, lookup)?;
        self.validate()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
