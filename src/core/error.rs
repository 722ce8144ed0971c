//! Failure taxonomy for rate retrieval and conversion

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FxError {
    /// API unreachable or answered with a non-2xx status.
    #[error("Network failure: {0}")]
    Network(String),

    /// Response body is not JSON or lacks the `rates` mapping.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Corrupt or unreadable cache record. Callers treat this as a cold cache.
    #[error("Cache read failure: {0}")]
    CacheRead(String),
}
