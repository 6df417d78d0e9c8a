//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - invalid value
    #[error("[{section}] has invalid {field}: {message}")]
    InvalidValue {
        /// Config section
        section: &'static str,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// Environment variable holds a value that cannot be used
    #[error("environment variable {name} is invalid: {message}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create an InvalidValue error
    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            field,
            message: message.into(),
        }
    }

    /// Create an InvalidEnv error
    pub fn invalid_env(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidEnv {
            name,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("workers", "count", "must be at least 1");
        assert!(err.to_string().contains("[workers]"));
        assert!(err.to_string().contains("count"));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_invalid_env_error() {
        let err = ConfigError::invalid_env("METRICS_PORT", "not a port number");
        assert!(err.to_string().contains("METRICS_PORT"));
    }
}
