//! Error types for the FileDrop wire format.

use thiserror::Error;

/// Errors that can occur when encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Payload was not a JSON object with a string `type` discriminator
    #[error("invalid message format")]
    InvalidFormat,

    /// The `type` discriminator is not a known command
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// An identifier failed validation
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = WireError::UnknownType("dance".to_string());
        assert_eq!(err.to_string(), "unknown message type: dance");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WireError>();
    }
}
