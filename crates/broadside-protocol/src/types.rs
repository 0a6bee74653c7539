//! Core protocol types for Broadside's wire format.
//!
//! Every frame on the wire is an [`Envelope`]. Clients send
//! `Envelope<ClientEvent>`, the server sends `Envelope<ServerEvent>`.

use std::fmt;

use broadside_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Public id of an open host, as shown in host listings.
///
/// It is the host's connection id; the newtype keeps transport internals
/// out of the wire format. Serializes as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct HostId(pub u64);

impl From<ConnectionId> for HostId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

impl From<HostId> for ConnectionId {
    fn from(id: HostId) -> Self {
        ConnectionId::new(id.0)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H-{}", self.0)
    }
}

/// Server-assigned id of a shot relayed to its target.
///
/// The target echoes it back in [`ClientEvent::ShotResult`] so the lobby
/// can resume exactly the shot it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayId(pub u64);

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Game payloads
// ---------------------------------------------------------------------------

/// A cell on the target board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub row: u8,
    pub col: u8,
}

/// The outcome of a shot, computed by the side that was shot at.
///
/// The lobby never inspects the board. It only reads
/// `fleet_destroyed` to decide whether the battle is over; the rest is
/// passed through to the shooter untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResult {
    /// Whether the shot hit a ship.
    pub hit: bool,

    /// The cells of the ship this shot sank, if it sank one.
    #[serde(default)]
    pub sunk_ship: Option<Vec<Coords>>,

    /// Whether this shot destroyed the last ship of the target's fleet.
    #[serde(default)]
    pub fleet_destroyed: bool,
}

impl ShotResult {
    /// A shot that hit nothing.
    pub fn miss() -> Self {
        Self {
            hit: false,
            sunk_ship: None,
            fleet_destroyed: false,
        }
    }

    /// A hit that sank nothing.
    pub fn hit() -> Self {
        Self {
            hit: true,
            ..Self::miss()
        }
    }
}

/// One open game in a host listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub id: HostId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Events a client can send.
///
/// Which of these the lobby acts on depends on the sender's current
/// phase; the rest are dropped without a reply.
///
/// Internally tagged: `{ "type": "JoinHost", "host": 12 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Claim a display name. Must be the first thing a connection does.
    Register { name: String },

    /// Open a game and wait for someone to join it.
    Host,

    /// Subscribe to the open-host list.
    WatchHosts,

    /// Unsubscribe from the open-host list.
    UnwatchHosts,

    /// Join the open game with this id.
    JoinHost { host: HostId },

    /// Ships are placed.
    Ready,

    /// Fire at the opponent's board.
    Shot { coords: Coords },

    /// Reply to an [`ServerEvent::IncomingShot`].
    ShotResult { relay: RelayId, result: ShotResult },

    /// Ask for a rematch with the same opponent.
    WantsRegame,

    /// Leave the current game or listing voluntarily.
    Abort,

    /// Keep-alive; answered with [`ServerEvent::HeartbeatAck`].
    Heartbeat { client_time: u64 },
}

/// Tag of a [`ClientEvent`], without its payload.
///
/// The lobby's dispatch table is keyed by `(phase, EventKind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Register,
    Host,
    WatchHosts,
    UnwatchHosts,
    JoinHost,
    Ready,
    Shot,
    ShotResult,
    WantsRegame,
    Abort,
    Heartbeat,
}

impl ClientEvent {
    /// Returns the tag of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Register { .. } => EventKind::Register,
            Self::Host => EventKind::Host,
            Self::WatchHosts => EventKind::WatchHosts,
            Self::UnwatchHosts => EventKind::UnwatchHosts,
            Self::JoinHost { .. } => EventKind::JoinHost,
            Self::Ready => EventKind::Ready,
            Self::Shot { .. } => EventKind::Shot,
            Self::ShotResult { .. } => EventKind::ShotResult,
            Self::WantsRegame => EventKind::WantsRegame,
            Self::Abort => EventKind::Abort,
            Self::Heartbeat { .. } => EventKind::Heartbeat,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Register => "register",
            Self::Host => "host",
            Self::WatchHosts => "watch hosts",
            Self::UnwatchHosts => "unwatch hosts",
            Self::JoinHost => "join host",
            Self::Ready => "ready",
            Self::Shot => "shot",
            Self::ShotResult => "shot result",
            Self::WantsRegame => "wants regame",
            Self::Abort => "abort",
            Self::Heartbeat => "heartbeat",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The value carried by an acknowledgment.
///
/// Adjacently tagged: `{ "kind": "Accepted", "value": true }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum AckValue {
    /// Plain success/failure. For `Ready` it means "the opponent was
    /// already waiting"; for `WantsRegame`, "the regame has started".
    Accepted(bool),

    /// The open-host list at the moment watching started.
    Hosts(Vec<HostEntry>),

    /// The opponent's verdict on a shot, or `None` if the shot was
    /// refused because the previous one is still unanswered.
    Shot(Option<ShotResult>),
}

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Reply to the client request whose envelope had this `seq`.
    Ack { seq: u64, value: AckValue },

    /// A game was opened (sent to host watchers).
    HostAdded { host: HostEntry },

    /// A game is no longer open (sent to host watchers).
    HostRemoved { host: HostId },

    /// Someone joined the game this connection was hosting.
    OpponentJoined { name: String },

    /// The opponent finished placing ships; the battle starts.
    OpponentReady,

    /// The opponent fired. Answer with [`ClientEvent::ShotResult`].
    IncomingShot { relay: RelayId, coords: Coords },

    /// The opponent asked for a regame.
    OpponentWantsRegame,

    /// The opponent left, voluntarily or not. This connection is back in
    /// the lobby.
    OpponentAborted,

    /// Reply to [`ClientEvent::Heartbeat`].
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// The server is closing this connection.
    Disconnect { reason: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The top-level wire wrapper.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ seq: 42                      │  ← request id (client) / counter (server)
/// │ timestamp: 15000             │  ← ms since sender's start
/// │ payload: { "type": ... }     │
/// └──────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// Sequence number. For client envelopes this doubles as the request
    /// id that the matching [`ServerEvent::Ack`] refers to.
    pub seq: u64,

    /// Milliseconds since the sender started. Optional on input.
    #[serde(default)]
    pub timestamp: u64,

    pub payload: P,
}

impl<P> Envelope<P> {
    /// Creates an envelope with a zero timestamp.
    pub fn new(seq: u64, payload: P) -> Self {
        Self {
            seq,
            timestamp: 0,
            payload,
        }
    }
}
