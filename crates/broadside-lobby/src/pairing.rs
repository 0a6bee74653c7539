//! Pairing and unpairing of two player records.

use broadside_protocol::ServerEvent;
use broadside_transport::ConnectionId;

use crate::{Lobby, Phase};

impl Lobby {
    /// Links `joiner` and `host` as opponents.
    ///
    /// The joiner stops watching hosts and the host's listing is closed.
    /// Phases are left to the caller.
    pub(crate) fn pair(&mut self, joiner: ConnectionId, host: ConnectionId) {
        if let Some(record) = self.registry.lookup_mut(joiner) {
            record.opponent = Some(host);
        }
        if let Some(record) = self.registry.lookup_mut(host) {
            record.opponent = Some(joiner);
        }
        self.watchers.leave(joiner);
        self.close_listing(host);
        tracing::info!(%joiner, %host, "players paired");
    }

    /// Severs `player` from its opponent.
    ///
    /// Both links are cleared, any shot in flight between them is
    /// discarded, and the opponent is told and sent back to the lobby.
    /// `player`'s own phase is left to the caller.
    pub(crate) fn unpair(&mut self, player: ConnectionId) {
        let Some(opponent) = self
            .registry
            .lookup_mut(player)
            .and_then(|r| r.opponent.take())
        else {
            return;
        };

        self.discard_incoming_shot(player);
        self.discard_incoming_shot(opponent);

        if let Some(record) = self.registry.lookup_mut(opponent) {
            record.opponent = None;
        }
        self.send(opponent, ServerEvent::OpponentAborted);
        self.transition_to(opponent, Phase::InLobby);
        tracing::info!(%player, %opponent, "players unpaired");
    }
}
