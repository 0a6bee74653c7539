//! Error types for the protocol layer.
//!
//! Each crate in Broadside defines its own error enum, so a
//! `ProtocolError` always means a framing problem, never a lobby
//! decision. Lobby rejections (name taken, host gone) are not errors at
//! all: they travel back to the client as acknowledgments.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `"type"` tag, missing
    /// fields, or a truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
