//! Protocol error types
//!
//! Errors that can occur when decoding inbound payloads.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload is not valid JSON for the expected schema
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        /// Which schema was expected ("situation" or "deletion")
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Payload is not valid UTF-8
    #[error("payload is not valid utf-8")]
    InvalidUtf8,

    /// Payload decoded but carries no identifier
    #[error("payload is missing an id")]
    MissingId,
}

impl ProtocolError {
    /// Create an invalid payload error
    #[inline]
    pub fn invalid_payload(kind: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidPayload { kind, source }
    }
}
