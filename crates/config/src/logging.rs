//! Logging configuration
//!
//! Level, format and destination of the ingester's own tracing output. The
//! MQTT, Redis, HTTP and ClickHouse client crates log per-packet and
//! per-request detail at debug; by default they are held at `warn` so a
//! `debug` level shows the pipeline, not the wire.

use serde::Deserialize;

/// Client crates capped at `warn` unless `quiet_clients = false`
pub const CLIENT_TARGETS: &[&str] = &[
    "rumqttc",
    "redis",
    "hyper",
    "hyper_util",
    "reqwest",
    "clickhouse",
];

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    /// Per-message classification and cache writes
    Debug,
    /// Startup, shutdown and batch summaries
    #[default]
    Info,
    /// Dropped messages, degraded routing, failed batches
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines for a terminal
    #[default]
    Console,
    /// One JSON object per event, for log shippers
    Json,
}

/// Where log lines go
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "stderr"
/// quiet_clients = false
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default: info
    pub level: LogLevel,

    /// Default: console
    pub format: LogFormat,

    /// Default: stdout
    pub output: LogOutput,

    /// Hold the client crates in [`CLIENT_TARGETS`] at `warn`
    /// Default: true
    pub quiet_clients: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            quiet_clients: true,
        }
    }
}

impl LogConfig {
    /// `EnvFilter` directive for `level` (a CLI override or the configured level)
    ///
    /// A `level` that already names targets (contains `=`) is used as given.
    pub fn filter_directive(&self, level: &str) -> String {
        if !self.quiet_clients || level.contains('=') {
            return level.to_string();
        }

        let mut directive = level.to_string();
        for target in CLIENT_TARGETS {
            directive.push_str(&format!(",{target}=warn"));
        }
        directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
        assert_eq!(config.output, LogOutput::Stdout);
        assert!(config.quiet_clients);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "warn"
format = "json"
output = "stderr"
quiet_clients = false
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.level.as_str(), "warn");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
        assert!(!config.quiet_clients);
    }

    #[test]
    fn test_deserialize_unknown_level() {
        let result: Result<LogConfig, _> = toml::from_str("level = \"loud\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_directive_quiets_clients() {
        let directive = LogConfig::default().filter_directive("debug");
        assert!(directive.starts_with("debug,"));
        assert!(directive.contains("rumqttc=warn"));
        assert!(directive.contains("redis=warn"));
    }

    #[test]
    fn test_filter_directive_passthrough() {
        let loud = LogConfig {
            quiet_clients: false,
            ..Default::default()
        };
        assert_eq!(loud.filter_directive("debug"), "debug");

        // Explicit per-target directives are left alone
        let custom = "info,beacon_pipeline=trace";
        assert_eq!(LogConfig::default().filter_directive(custom), custom);
    }
}
