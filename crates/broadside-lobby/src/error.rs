//! Error types for the lobby layer.

use broadside_transport::ConnectionId;

/// Errors that can occur while talking to the lobby.
///
/// A rejected request (name taken, host no longer open) is not one of
/// these; it is answered with a negative acknowledgment.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The lobby actor has stopped or its command channel is closed.
    #[error("lobby is unavailable")]
    Unavailable,

    /// The connection was attached twice.
    #[error("connection {0} is already attached")]
    AlreadyAttached(ConnectionId),
}
