//! Wire protocol for Broadside.
//!
//! This crate defines what crosses the boundary between a player's client
//! and the lobby:
//!
//! - **Types** ([`Envelope`], [`ClientEvent`], [`ServerEvent`],
//!   [`AckValue`], ...): the message structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   turned into frames and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Request / acknowledgment overlay
//!
//! The stream is event-driven, not request/response, but every
//! state-advancing client event is answered by exactly one
//! [`ServerEvent::Ack`] carrying the `seq` of the envelope it answers.
//! Clients block their own local state on that specific reply.
//!
//! ```text
//! Transport (frames) → Protocol (Envelope) → Lobby (phases)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AckValue, ClientEvent, Coords, Envelope, EventKind, HostEntry, HostId,
    RelayId, ServerEvent, ShotResult,
};
