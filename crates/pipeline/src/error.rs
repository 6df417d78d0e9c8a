//! Pipeline error types

use beacon_cache::CacheError;
use beacon_protocol::ProtocolError;
use beacon_sinks::StoreError;
use thiserror::Error;

/// Errors from processing a single message
///
/// None of these stop a worker; they are logged and counted per message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload could not be decoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Live location cache command failed
    #[error("cache: {0}")]
    Cache(#[from] CacheError),

    /// Durable store command failed
    #[error("store: {0}")]
    Store(#[from] StoreError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
