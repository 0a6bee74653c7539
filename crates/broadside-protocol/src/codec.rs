//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The server doesn't care HOW envelopes become bytes; it only needs
//! something implementing [`Codec`]. The handler decodes every inbound
//! frame into an `Envelope<ClientEvent>` and encodes every outbound
//! `Envelope<ServerEvent>`, and nothing else in the server touches bytes.
//!
//! [`JsonCodec`] is the one browsers speak natively: a client can build a
//! frame with `JSON.stringify` and read ours with `JSON.parse`, with no
//! schema or generated code on its side. A compact binary codec could be
//! added next to it without changing the handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds
///
/// - `Send + Sync`: one codec instance lives in the shared server state
///   and is used concurrently by every reader and writer task, on
///   whichever Tokio worker thread they happen to run.
/// - `'static`: the codec owns everything it needs, so it can sit inside
///   an `Arc` for the whole life of the server.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the message type rather than
/// tied to the Broadside events, so the same codec serves both
/// directions (`Envelope<ClientEvent>` in, `Envelope<ServerEvent>` out).
///
/// `decode` asks for `DeserializeOwned` instead of plain `Deserialize`:
/// the decoded value must not borrow from the frame, because the frame
/// buffer is dropped as soon as the event is handed to the lobby.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Frames are plain UTF-8 JSON. The handler accepts them in either a
/// text or a binary WebSocket frame and always answers in binary frames.
/// Unknown `"type"` tags and missing fields fail with
/// [`ProtocolError::Decode`]; the handler logs those and skips the frame.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use broadside_protocol::{ClientEvent, Codec, Envelope, JsonCodec};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(1, ClientEvent::WatchHosts);
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope<ClientEvent> = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
