//! The player record: one per registered connection.

use broadside_protocol::{RelayId, ServerEvent};
use broadside_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::Phase;

/// Channel through which the lobby pushes events to one connection.
///
/// The connection's writer task owns the receiving half. Dropping every
/// sender ends that task and closes the connection.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// A shot relayed to this record's player that has not been answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingShot {
    pub(crate) relay: RelayId,
    pub(crate) shooter: ConnectionId,
    /// `seq` of the shooter's request, answered once the result is in.
    pub(crate) shooter_seq: u64,
}

/// A registered player.
///
/// `opponent` is a link into the registry, not ownership: pairing sets it
/// on both records and unpairing clears it on both, so
/// `a.opponent == Some(b)` implies `b.opponent == Some(a)` whenever a
/// handler is not running.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    name: String,
    connection: ConnectionId,
    pub(crate) phase: Phase,
    pub(crate) opponent: Option<ConnectionId>,
    pub(crate) incoming_shot: Option<PendingShot>,
}

impl PlayerRecord {
    /// A freshly registered player, in the lobby, unpaired.
    pub(crate) fn new(connection: ConnectionId, name: String) -> Self {
        Self {
            name,
            connection,
            phase: Phase::InLobby,
            opponent: None,
            incoming_shot: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn opponent(&self) -> Option<ConnectionId> {
        self.opponent
    }

    /// Whether a shot at this player is waiting for its result.
    pub fn has_incoming_shot(&self) -> bool {
        self.incoming_shot.is_some()
    }
}
