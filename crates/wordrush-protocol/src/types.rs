//! Core protocol types for Wordrush's wire format.
//!
//! Everything in this module travels on the wire: it is serialized by the
//! server, sent over a WebSocket, and parsed by a browser client (or the
//! other way around). The JSON shapes are part of the client contract, so
//! the tests at the bottom pin them down.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// A player id is minted per connection: a browser tab that reconnects is a
/// new player. The newtype keeps it from being confused with any other
/// `u64` (sequence numbers, timestamps) in function signatures.
///
/// `#[serde(transparent)]` serializes `PlayerId(42)` as the plain number
/// `42`, which is what the client expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short, human-enterable code that identifies a room (e.g. `K7QX3M`).
///
/// Codes are always stored uppercase. Anything a user types goes through
/// [`RoomCode::parse`] so that `" k7qx3m "` finds the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps an already-canonical code. Used by the code generator.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Normalizes user input into a code: trims surrounding whitespace and
    /// uppercases. Does not validate the alphabet; an unknown code simply
    /// won't be found.
    pub fn parse(input: &str) -> Self {
        Self(input.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Room lifecycle and snapshots
// ---------------------------------------------------------------------------

/// The lifecycle status of a room.
///
/// ```text
/// Lobby ──(start)──→ InGame ──(end)──→ Finished ──(play again)──→ Lobby
/// ```
///
/// A room in any status is destroyed once nobody in it is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Waiting for players; the host may start.
    Lobby,
    /// A game is running: rounds are being issued and the clock ticks.
    InGame,
    /// The game ended; rankings are final until the host plays again.
    Finished,
}

impl RoomStatus {
    /// Returns `true` if new players may join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Returns `true` while a game is running.
    pub fn is_in_game(&self) -> bool {
        matches!(self, Self::InGame)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::InGame => write!(f, "in_game"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// One player as seen by every member of the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub nickname: String,
    pub score: u32,
    pub connected: bool,
    pub is_host: bool,
}

/// A full picture of a room, broadcast whenever membership, host, status
/// or scores change. Players are listed in join order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_code: RoomCode,
    pub status: RoomStatus,
    pub host: Option<PlayerId>,
    pub players: Vec<PlayerView>,
}

// ---------------------------------------------------------------------------
// Inbound: client → server
// ---------------------------------------------------------------------------

/// An action a player asks the server to perform.
///
/// `#[serde(tag = "action")]` produces internally tagged JSON:
/// `{ "action": "join_room", "room_code": "K7QX3M", "nickname": "Bob" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Open a new room with the sender as host.
    CreateRoom { nickname: String },

    /// Join an existing room in the lobby.
    JoinRoom { room_code: String, nickname: String },

    /// Host only: begin a game.
    StartGame,

    /// Submit a guess for the current round. Never acknowledged.
    SubmitGuess { guess: String },

    /// Host only: return a finished room to the lobby.
    PlayAgain,
}

/// A client request: an action plus an optional correlation id.
///
/// When `id` is present the reply echoes it back as `request_id`, which is
/// how the client matches acknowledgements to requests. The action fields
/// are flattened into the same JSON object:
/// `{ "id": 7, "action": "start_game" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub action: ClientAction,
}

// ---------------------------------------------------------------------------
// Outbound: server → client
// ---------------------------------------------------------------------------

/// Machine-readable reason a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The frame could not be decoded.
    BadRequest,
    /// The nickname was empty after normalization.
    InvalidNickname,
    /// No room with that code.
    NotFound,
    /// The room is not in the lobby.
    NotJoinable,
    /// The room already has the maximum number of players.
    RoomFull,
    /// Someone in the room already uses that nickname.
    DuplicateNickname,
    /// The server is at its room ceiling.
    CapacityExceeded,
    /// New rooms and games are administratively disabled.
    GamePaused,
    /// Only the host may do that.
    NotHost,
    /// The room is not in the lobby, so a game can't start.
    AlreadyStarted,
    /// The game hasn't finished yet.
    NotFinished,
    /// The word catalogue could not be loaded.
    SupplyUnavailable,
    /// The connection hasn't created or joined a room.
    NotInRoom,
    /// The connection is already in a room.
    AlreadyInRoom,
    /// The room went away while the request was in flight.
    Unavailable,
}

/// A direct answer to one request. Only the requester receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Answer to `create_room` / `join_room`.
    RoomJoined {
        request_id: Option<u64>,
        room_code: RoomCode,
        player_id: PlayerId,
    },

    /// Answer to `start_game` / `play_again`.
    Ok { request_id: Option<u64> },

    /// The request was refused; nothing changed.
    Error {
        request_id: Option<u64>,
        code: ErrorCode,
        message: String,
    },
}

/// Why a round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEndReason {
    Guessed,
    TimedOut,
}

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    TimeUp,
    WordPoolExhausted,
    AllPlayersLeft,
}

impl fmt::Display for GameEndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeUp => write!(f, "time_up"),
            Self::WordPoolExhausted => write!(f, "word_pool_exhausted"),
            Self::AllPlayersLeft => write!(f, "all_players_left"),
        }
    }
}

/// The player who solved a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundWinner {
    pub player_id: PlayerId,
    pub nickname: String,
}

/// Something that happened in a room. Broadcast to every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Membership, host, status or scores changed.
    RoomState(RoomSnapshot),

    /// The host started a game lasting `duration_ms`.
    GameStarted { duration_ms: u64 },

    /// A new word is up. `ends_at_ms` is wall-clock Unix milliseconds.
    RoundStarted {
        masked_word: String,
        hint: String,
        length: usize,
        duration_ms: u64,
        ends_at_ms: u64,
    },

    /// Remaining game time, once per second.
    Tick { remaining_ms: u64 },

    /// A round was solved or ran out of time.
    RoundEnded {
        reason: RoundEndReason,
        word: String,
        winner: Option<RoundWinner>,
        points_awarded: u32,
    },

    /// The game is over. `rankings` is sorted by score, highest first;
    /// `winner_ids` lists everyone tied for the top score.
    GameEnded {
        reason: GameEndReason,
        rankings: Vec<PlayerView>,
        winner_ids: Vec<PlayerId>,
    },
}

/// Anything the server sends: either a reply to this connection or a room
/// event.
///
/// Adjacently tagged: `{ "type": "event", "data": { "type": "tick", ... } }`.
/// The client checks the outer tag first to know whether to resolve a
/// pending request or update the room view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Reply(Reply),
    Event(ServerEvent),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wrapper for every frame in either direction.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ seq: 42                      │  ← per-sender ordering
/// │ timestamp: 15000             │  ← ms since the sender started
/// │ ┌──────────────────────────┐ │
/// │ │ payload: Request / Server│ │
/// │ └──────────────────────────┘ │
/// └──────────────────────────────┘
/// ```
///
/// Clients send `Envelope<Request>`; the server sends
/// `Envelope<ServerMessage>`. Clients that don't track sequence numbers may
/// omit `seq` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub timestamp: u64,
    pub payload: P,
}

// =========================================================================
// Tests
// =========================================================================
