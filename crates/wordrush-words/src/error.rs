//! Error types for the word supply.

/// Why the word catalogue couldn't be produced.
///
/// Every variant means the same thing to a room trying to start a game:
/// the supply is unavailable and the room stays in the lobby.
#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    /// The backing store couldn't be reached.
    #[error("word supply unavailable: {0}")]
    Unavailable(String),

    /// The store answered with zero usable records.
    #[error("word supply returned no words")]
    Empty,

    /// Reading the catalogue file failed.
    #[error("word supply unavailable: {0}")]
    Io(#[from] std::io::Error),

    /// The catalogue file isn't valid JSON of the expected shape.
    #[error("word catalogue is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}
