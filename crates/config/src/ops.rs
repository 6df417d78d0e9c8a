//! Operational HTTP server configuration

use serde::Deserialize;

/// Health and metrics endpoints
///
/// # Example
///
/// ```toml
/// [ops]
/// enabled = true
/// host = "0.0.0.0"
/// port = 9091
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    /// Default: true
    pub enabled: bool,

    /// Default: 0.0.0.0
    pub host: String,

    /// Default: 9091
    pub port: u16,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".into(),
            port: 9091,
        }
    }
}

impl OpsConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
