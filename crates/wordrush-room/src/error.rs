//! Error types for the room layer.

use wordrush_protocol::{ErrorCode, PlayerId, RoomCode};
use wordrush_words::SupplyError;

/// Errors that can occur during room operations.
///
/// None of these change room state: a refused request leaves the room
/// exactly as it was, and only the requester hears about it.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The nickname was empty after normalization.
    #[error("nickname must not be empty")]
    InvalidNickname,

    /// No room with this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room is past the lobby and no longer accepts players.
    #[error("room {0} is not accepting players")]
    NotJoinable(RoomCode),

    /// The room has no free player slot.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// A current member already uses this nickname (case-insensitively).
    #[error("nickname {0:?} is already taken in this room")]
    DuplicateNickname(String),

    /// The server already tracks its maximum number of rooms.
    #[error("server is at its limit of {0} rooms")]
    CapacityExceeded(usize),

    /// New rooms and games are administratively disabled.
    #[error("new games are paused")]
    GamePaused,

    /// Only the host can start a game or play again.
    #[error("only the host can do that")]
    NotHost,

    /// A game can only start from the lobby.
    #[error("game already started")]
    AlreadyStarted,

    /// Play-again is only possible once the game is over.
    #[error("game has not finished")]
    NotFinished,

    /// The word catalogue couldn't be loaded; the room stays in the lobby.
    #[error(transparent)]
    Supply(#[from] SupplyError),

    /// The player hasn't created or joined any room.
    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// The player is already in a room. A connection is in at most one.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// The room's actor is gone (destroyed while the request was in
    /// flight).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

/// Broad class of a [`RoomError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// The request is well-formed but not allowed right now.
    Policy,
    /// The word catalogue is unavailable.
    Supply,
    /// Plumbing: the room vanished mid-request.
    Internal,
}

impl RoomError {
    /// The wire code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidNickname => ErrorCode::InvalidNickname,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::NotJoinable(_) => ErrorCode::NotJoinable,
            Self::RoomFull(_) => ErrorCode::RoomFull,
            Self::DuplicateNickname(_) => ErrorCode::DuplicateNickname,
            Self::CapacityExceeded(_) => ErrorCode::CapacityExceeded,
            Self::GamePaused => ErrorCode::GamePaused,
            Self::NotHost => ErrorCode::NotHost,
            Self::AlreadyStarted => ErrorCode::AlreadyStarted,
            Self::NotFinished => ErrorCode::NotFinished,
            Self::Supply(_) => ErrorCode::SupplyUnavailable,
            Self::NotInRoom(_) => ErrorCode::NotInRoom,
            Self::AlreadyInRoom(..) => ErrorCode::AlreadyInRoom,
            Self::Unavailable(_) => ErrorCode::Unavailable,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidNickname => ErrorKind::Validation,
            Self::Supply(_) => ErrorKind::Supply,
            Self::Unavailable(_) => ErrorKind::Internal,
            _ => ErrorKind::Policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_error_maps_to_supply_unavailable() {
        let err: RoomError = SupplyError::Empty.into();
        assert_eq!(err.code(), ErrorCode::SupplyUnavailable);
        assert_eq!(err.kind(), ErrorKind::Supply);
    }

    #[test]
    fn test_policy_errors_are_classified() {
        assert_eq!(RoomError::NotHost.kind(), ErrorKind::Policy);
        assert_eq!(
            RoomError::RoomFull(RoomCode::new("ABCDEF")).code(),
            ErrorCode::RoomFull
        );
        assert_eq!(RoomError::InvalidNickname.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_display_includes_room_code() {
        let err = RoomError::NotFound(RoomCode::new("ZZZZZZ"));
        assert_eq!(err.to_string(), "room ZZZZZZ not found");
    }
}
