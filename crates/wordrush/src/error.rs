//! Unified error type for the Wordrush server.

use wordrush_protocol::ProtocolError;
use wordrush_room::RoomError;
use wordrush_transport::TransportError;
use wordrush_words::SupplyError;

/// Top-level error that wraps all crate-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum WordrushError {
    /// Binding, accepting, sending, or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room refused a request.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The word catalogue couldn't be loaded.
    #[error(transparent)]
    Supply(#[from] SupplyError),

    /// A `WORDRUSH_*` variable couldn't be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: WordrushError = TransportError::InvalidFrame.into();
        assert!(matches!(err, WordrushError::Transport(_)));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: WordrushError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, WordrushError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err: WordrushError = RoomError::NotHost.into();
        assert!(matches!(err, WordrushError::Room(_)));
        assert_eq!(err.to_string(), "only the host can do that");
    }

    #[test]
    fn test_from_supply_error() {
        let err: WordrushError = SupplyError::Empty.into();
        assert!(matches!(err, WordrushError::Supply(_)));
    }

    #[test]
    fn test_from_config_error() {
        let err: WordrushError = config::ConfigError::Message("bad port".into()).into();
        assert!(matches!(err, WordrushError::Config(_)));
        assert!(err.to_string().contains("bad port"));
    }
}
