//! # Wordrush
//!
//! Real-time multiplayer word-guessing server.
//!
//! Players open or join a room with a six-character code, the host starts a
//! timed game, and everyone races to guess masked words. The server is
//! authoritative: it owns the clock, the words and the scores, and pushes
//! every change to the clients over WebSocket.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordrush::prelude::*;
//!
//! # async fn run() -> Result<(), WordrushError> {
//! let source = StaticWordSource::from_pairs([("apple", "A fruit"), ("bridge", "Crosses a river")]);
//! let server = WordrushServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(source)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod settings;

pub use error::WordrushError;
pub use server::{AdminHandle, WordrushServer, WordrushServerBuilder};
pub use settings::{DEFAULT_BIND, ServerConfig};

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::{
        AdminHandle, ServerConfig, WordrushError, WordrushServer, WordrushServerBuilder,
    };
    pub use wordrush_protocol::{
        ClientAction, Codec, Envelope, ErrorCode, JsonCodec, PlayerId, Reply, Request,
        RoomCode, ServerEvent, ServerMessage,
    };
    pub use wordrush_room::{GameConfig, RegistryConfig, RegistryStatus};
    pub use wordrush_words::{
        JsonFileWordSource, StaticWordSource, SupplyError, WordCacheConfig, WordRecord,
        WordSource,
    };
}
