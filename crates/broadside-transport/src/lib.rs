//! Connection primitive for Broadside.
//!
//! The lobby never touches sockets. It only needs a connection that can
//! send frames, yield the next inbound frame, and report when it is gone.
//! This crate provides the three traits that stand between the network
//! and everything above it:
//!
//! - [`Transport`] owns the listener and hands out raw incoming peers.
//! - [`Handshake`] turns one raw peer into a usable connection (for
//!   WebSocket, the HTTP upgrade).
//! - [`Connection`] is the full-duplex frame pipe itself.
//!
//! ## Why accepting is split in two
//!
//! Accepting a TCP stream is instant, but the upgrade that follows waits
//! on the peer. A peer that connects and then says nothing would hold the
//! accept loop hostage if both steps ran there. So [`Transport::accept`]
//! only takes the stream, and the server runs [`Handshake::complete`] in
//! the peer's own task, under a deadline.
//!
//! ```text
//!   accept loop           per-peer task
//!   ───────────           ─────────────────────────────────────
//!   accept() ──spawn──▶   complete() ──▶ Connection ──▶ lobby
//!   accept() ──spawn──▶   complete()  (stalled: times out alone)
//! ```
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`.
//!   Without it only the traits and [`ConnectionId`] are compiled, which
//!   is enough for code that wants to plug in another transport.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
///
/// Unique for the lifetime of the process. The lobby keys its registry
/// on it and hands it out to clients as the id of an open host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming peers.
///
/// ## Associated types
///
/// - `Incoming` is a peer whose stream exists but whose handshake has not
///   run yet. It is `Send` so it can be moved into a spawned task.
/// - `Connection` is what a finished handshake yields.
///
/// Both share the transport's `Error` so callers handle one error type.
pub trait Transport: Send + Sync + 'static {
    /// A freshly accepted peer that still has to complete its handshake.
    type Incoming: Handshake<Connection = Self::Connection, Error = Self::Error>;
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next incoming peer.
    ///
    /// This must not wait on the peer itself: it returns as soon as the
    /// underlying stream is accepted.
    async fn accept(&mut self) -> Result<Self::Incoming, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;

    /// Gracefully shuts down the transport, stopping new connections.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// The second half of accepting a peer.
///
/// `complete` may wait on the remote side for as long as it likes, so
/// callers run it off the accept loop and bound it with a timeout.
pub trait Handshake: Send + 'static {
    /// The connection type produced on success.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// The id the connection will carry once the handshake completes.
    ///
    /// Available up front so a stalled handshake can still be logged.
    fn id(&self) -> ConnectionId;

    /// Runs the handshake and yields the connection.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single full-duplex connection.
///
/// `send` and `recv` may be called concurrently from different tasks: a
/// pending `recv` must never hold up a `send`, because pushes to a player
/// (an opponent's shot, a host list change) arrive while that player's
/// reader is parked waiting for input.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the remote address, if the transport knows it.
    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}
