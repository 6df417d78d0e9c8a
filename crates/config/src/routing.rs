//! Route resolution configuration

use serde::Deserialize;
use std::time::Duration;

/// OSRM route resolver settings
///
/// # Example
///
/// ```toml
/// [routing]
/// enabled = true
/// osrm_url = "http://localhost:5000"
/// timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// When false, segments get straight-line paths without contacting OSRM
    /// Default: true
    pub enabled: bool,

    /// OSRM base URL
    /// Default: http://localhost:5000
    pub osrm_url: String,

    /// Per-request timeout
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            osrm_url: "http://localhost:5000".into(),
            timeout: Duration::from_secs(5),
        }
    }
}
