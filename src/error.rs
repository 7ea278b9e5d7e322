//! Error types for ait-link-client.

use thiserror::Error;

/// Main error type for all link operations.
///
/// None of these cross the handshake boundary: a poll round reports its
/// failures through logging and a [`RoundReport`](crate::RoundReport),
/// never by returning an error.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The poll request failed (connect, timeout, HTTP status).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The poll response was not a JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The poll document parsed but lacks required link-state fields.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A unit exceeds what the 7-bit frame length can carry.
    #[error("Payload too large: {len} octets (max {max})")]
    PayloadTooLarge {
        /// Offered payload length.
        len: usize,
        /// Largest accepted payload length.
        max: usize,
    },

    /// Inbound payload failed the frame check and was discarded.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// A configuration value was outside its accepted range.
    #[error("Configuration out of range: {0}")]
    ConfigurationOutOfRange(String),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;
