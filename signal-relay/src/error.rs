//! Error types for signal-relay.

/// Main error type for signal-relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Command-level failures, reported only to the offending connection.
///
/// The `Display` strings are exactly what goes out in the `error` envelope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// Payload was not a structured message.
    #[error("Invalid JSON message format.")]
    InvalidFormat,

    /// join_room arrived without a share code.
    #[error("Share code is required to join a room.")]
    CodeMissing,

    /// Referenced room code is not currently open.
    #[error("Room not found.")]
    RoomNotFound,

    /// Relay command referenced a room code that is not currently open.
    #[error("Room not found for signaling.")]
    RoomNotFoundForSignaling,

    /// The responder slot is already occupied.
    #[error("Room is full.")]
    RoomFull,

    /// Relay command from a connection that occupies neither slot.
    #[error("Not a participant in this room.")]
    NotAParticipant,

    /// Target slot is empty or its connection has closed.
    #[error("Peer not available to relay message.")]
    PeerUnavailable,

    /// Unrecognized `type` discriminator.
    #[error("Unknown message type: {0}")]
    UnknownType(String),
}

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_error_messages_are_client_facing() {
        assert_eq!(
            SignalError::RoomFull.to_string(),
            "Room is full."
        );
        assert_eq!(
            SignalError::UnknownType("dance".to_string()).to_string(),
            "Unknown message type: dance"
        );
        assert_eq!(
            SignalError::PeerUnavailable.to_string(),
            "Peer not available to relay message."
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RelayError>();
        assert_send_sync::<SignalError>();
    }
}
