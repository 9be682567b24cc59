//! Wire protocol for Wordrush.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`Request`], [`ServerMessage`], [`ServerEvent`],
//!   [`RoomSnapshot`], ...): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how they become text
//!   frames.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about connections, timers or rooms: it only describes
//! messages.
//!
//! ```text
//! Transport (text frames) → Protocol (Envelope) → Room engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientAction, Envelope, ErrorCode, GameEndReason, PlayerId, PlayerView, Reply, Request,
    RoomCode, RoomSnapshot, RoomStatus, RoundEndReason, RoundWinner, ServerEvent, ServerMessage,
};
