//! Unified error type for Broadside.

use broadside_lobby::LobbyError;
use broadside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically. Rejected requests never show up here; they are
/// answered with a negative acknowledgment on the wire. Undecodable
/// frames do not either: the handler logs and skips them.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The lobby actor is gone or refused an attach.
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use broadside_transport::ConnectionId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let broadside_err: BroadsideError = err.into();
        assert!(matches!(broadside_err, BroadsideError::Transport(_)));
        assert!(broadside_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_lobby_error() {
        let err = LobbyError::AlreadyAttached(ConnectionId::new(3));
        let broadside_err: BroadsideError = err.into();
        assert!(matches!(broadside_err, BroadsideError::Lobby(_)));
        assert!(broadside_err.to_string().contains("conn-3"));
    }
}
