//! Codec trait and implementations for turning wire types into text frames.
//!
//! Browsers speak WebSocket text frames, so a codec here produces and
//! consumes `String`s rather than raw bytes. The protocol layer only needs
//! something that implements [`Codec`]; [`JsonCodec`] is the one we ship.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to text and decodes text back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task on the runtime.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or doesn't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use wordrush_protocol::{ClientAction, Codec, Envelope, JsonCodec, Request};
///
/// let codec = JsonCodec;
/// let envelope = Envelope {
///     seq: 1,
///     timestamp: 0,
///     payload: Request { id: Some(1), action: ClientAction::StartGame },
/// };
///
/// let text = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<Request> = codec.decode(&text).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
