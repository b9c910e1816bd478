//! Error types for position sources.

use thiserror::Error;

/// Errors produced while obtaining a position sample.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The device did not answer within the request timeout.
    #[error("Device request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The device answered with a non-success status.
    #[error("Device responded with status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("Failed to parse device response: {0}")]
    Json(String),

    /// The reading was decoded but is not a usable position.
    #[error("Invalid sample: {0}")]
    InvalidSample(String),
}

impl SourceError {
    /// Returns true if the source itself is unreachable.
    ///
    /// Unavailability flips the connection to disconnected. An invalid sample
    /// only discards the reading.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, SourceError::InvalidSample(_))
    }
}
