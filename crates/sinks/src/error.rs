//! Store errors

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from an incident store
#[derive(Debug, Error)]
pub enum StoreError {
    /// ClickHouse client error
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    /// Store rejected or could not take the request
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Store was closed
    #[error("store is closed")]
    Closed,
}
