//! Source error types

use std::time::Duration;

use beacon_config::ConfigError;
use thiserror::Error;

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors that stop a source from starting
#[derive(Debug, Error)]
pub enum SourceError {
    /// Broker address or options are invalid
    #[error("invalid mqtt configuration: {0}")]
    Config(#[from] ConfigError),

    /// No CONNACK within the connect timeout
    #[error("timed out connecting to {broker} after {timeout:?}")]
    ConnectTimeout { broker: String, timeout: Duration },

    /// Broker answered CONNACK with a failure code
    #[error("broker {broker} refused connection: {code}")]
    Refused { broker: String, code: String },

    /// Network or protocol failure while connecting
    #[error("mqtt connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    /// Request could not be queued to the event loop
    #[error("mqtt client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}
