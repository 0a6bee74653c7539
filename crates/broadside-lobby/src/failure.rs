//! Involuntary exits: disconnect, transport error, idle timeout, shutdown.

use std::fmt;

use broadside_transport::ConnectionId;

use crate::Lobby;
use crate::phase::Cleanup;

/// Why a connection is being torn down.
///
/// The lobby treats every cause the same way; the cause only shows up in
/// logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The peer closed the connection.
    Disconnected,
    /// Reading from or writing to the connection failed.
    TransportError(String),
    /// Nothing arrived within the idle timeout.
    IdleTimeout,
    /// The lobby is shutting down.
    Shutdown,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::TransportError(reason) => write!(f, "transport error: {reason}"),
            Self::IdleTimeout => f.write_str("idle timeout"),
            Self::Shutdown => f.write_str("shutdown"),
        }
    }
}

impl Lobby {
    /// Removes `connection` from the lobby.
    ///
    /// Runs the cleanup for the player's current phase (close its listing,
    /// leave the watchers, or unpair and send the opponent home), then
    /// deletes its record. Calling this again for the same connection does
    /// nothing. Returns whether there was anything to remove.
    pub fn fail(&mut self, connection: ConnectionId, cause: FailureCause) -> bool {
        let was_attached = self.outboxes.remove(&connection).is_some();

        let Some(phase) = self.phase_of(connection) else {
            if was_attached {
                tracing::debug!(%connection, %cause, "unregistered connection detached");
            }
            return was_attached;
        };

        match phase.failure_cleanup() {
            Some(Cleanup::LeaveWatchers) => {
                self.watchers.leave(connection);
            }
            Some(Cleanup::CloseListing) => self.close_listing(connection),
            Some(Cleanup::Unpair) => self.unpair(connection),
            None => {}
        }
        let record = self.registry.remove(connection);

        tracing::info!(
            %connection,
            name = record.as_ref().map(|r| r.name()).unwrap_or_default(),
            %phase,
            %cause,
            "player removed"
        );
        true
    }
}
