//! Routing error types
//!
//! Resolution itself never fails (it degrades to a straight line); these
//! errors cover construction and the internal request path.

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur while building or querying a route provider
#[derive(Debug, Error)]
pub enum RoutingError {
    /// HTTP client could not be built or the request failed
    #[error("osrm request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL is unusable
    #[error("invalid osrm url '{url}': {message}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Why it was rejected
        message: &'static str,
    },
}
