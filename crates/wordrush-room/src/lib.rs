//! Room lifecycle and game rules for Wordrush.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns a
//! [`GameSession`], a game ticker, and a round deadline. The
//! [`RoomRegistry`] creates rooms, finds them by code, and destroys them
//! once nobody in them is connected.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, routes players
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`GameSession`]: the synchronous game state machine of one room
//! - [`GameConfig`] / [`RegistryConfig`]: limits and timings
//! - [`FeatureGate`]: administrative on/off switch for new games

mod code;
mod config;
mod deck;
mod error;
mod manager;
mod mask;
mod roster;
mod room;
mod scoring;
mod session;
mod text;

pub use code::{CODE_ALPHABET, CODE_LENGTH, generate_code, generate_unique_code, is_valid_code};
pub use config::{FeatureGate, GameConfig, RegistryConfig};
pub use deck::WordDeck;
pub use error::{ErrorKind, RoomError};
pub use manager::{JoinTicket, RegistryStatus, RoomRegistry};
pub use mask::mask_word;
pub use roster::{Player, Roster};
pub use room::{PlayerSender, RoomHandle, RoomInfo};
pub use scoring::points_for;
pub use session::{GameSession, GuessOutcome, Round};
pub use text::{nickname_key, normalize_guess, normalize_nickname};
