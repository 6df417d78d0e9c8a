//! Cache error types

use thiserror::Error;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors from the live location cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backing store command failed
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Location could not be encoded for storage
    #[error("failed to encode location '{id}': {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Stored value is not a valid location
    #[error("failed to decode location '{id}': {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backing store is not reachable
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
