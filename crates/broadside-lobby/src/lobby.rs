//! The lobby state machine.

use std::collections::HashMap;

use broadside_protocol::{AckValue, ClientEvent, HostEntry, RelayId, ServerEvent};
use broadside_transport::ConnectionId;

use crate::phase::handler_for;
use crate::{
    BroadcastGroup, FailureCause, LobbyConfig, LobbyError, Outbox, Phase,
    Registry,
};

/// Every player, every open listing, every pairing.
///
/// `Lobby` is plain synchronous state. In a server it is owned by the
/// actor started with [`spawn_lobby`](crate::spawn_lobby); tests can drive
/// it directly.
///
/// Connections are attached with an [`Outbox`] before their first event.
/// A connection becomes a player by sending [`ClientEvent::Register`];
/// from then on its [`Phase`] decides which events reach a handler.
#[derive(Debug)]
pub struct Lobby {
    config: LobbyConfig,
    pub(crate) registry: Registry,
    pub(crate) watchers: BroadcastGroup,
    pub(crate) outboxes: HashMap<ConnectionId, Outbox>,
    next_relay: u64,
}

impl Lobby {
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            config,
            registry: Registry::new(),
            watchers: BroadcastGroup::new("host watchers"),
            outboxes: HashMap::new(),
            next_relay: 1,
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Starts delivering pushes for `connection` to `outbox`.
    pub fn attach(
        &mut self,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), LobbyError> {
        if self.outboxes.contains_key(&connection) {
            return Err(LobbyError::AlreadyAttached(connection));
        }
        self.outboxes.insert(connection, outbox);
        tracing::debug!(%connection, "connection attached");
        Ok(())
    }

    pub fn is_attached(&self, connection: ConnectionId) -> bool {
        self.outboxes.contains_key(&connection)
    }

    /// Handles one client event from `connection`.
    ///
    /// `seq` is the request id the acknowledgment will refer to. Events
    /// the sender's phase does not accept are dropped without a reply.
    pub fn handle_event(
        &mut self,
        connection: ConnectionId,
        seq: u64,
        event: ClientEvent,
    ) {
        if let ClientEvent::Register { name } = &event {
            let accepted = self.register(connection, name);
            self.ack(connection, seq, AckValue::Accepted(accepted));
            return;
        }

        let kind = event.kind();
        let Some(phase) = self.phase_of(connection) else {
            tracing::debug!(
                %connection,
                event = %kind,
                "event from unregistered connection, dropping"
            );
            return;
        };

        let Some(handler) = handler_for(phase, kind) else {
            tracing::debug!(
                %connection,
                %phase,
                event = %kind,
                "event not accepted in this phase, dropping"
            );
            return;
        };

        if let Some(value) = handler(self, connection, seq, event) {
            self.ack(connection, seq, value);
        }
    }

    fn register(&mut self, connection: ConnectionId, requested: &str) -> bool {
        if self.registry.lookup(connection).is_some() {
            tracing::debug!(%connection, "already registered");
            return false;
        }
        let Some(name) = self.config.normalize_name(requested) else {
            tracing::debug!(%connection, "invalid name rejected");
            return false;
        };
        if !self.registry.register(connection, &name) {
            tracing::debug!(%connection, %name, "name taken");
            return false;
        }
        tracing::info!(%connection, %name, "player registered");
        true
    }

    /// Moves `connection` to `next` if that is a legal transition.
    ///
    /// Leaving a battle discards any shot still waiting on this player.
    pub(crate) fn transition_to(
        &mut self,
        connection: ConnectionId,
        next: Phase,
    ) -> bool {
        let Some(record) = self.registry.lookup_mut(connection) else {
            return false;
        };
        let current = record.phase;
        if !current.can_transition_to(next) {
            tracing::warn!(
                %connection,
                from = %current,
                to = %next,
                "illegal phase transition refused"
            );
            return false;
        }
        record.phase = next;
        tracing::debug!(%connection, from = %current, to = %next, "phase changed");

        if current == Phase::InBattle {
            self.discard_incoming_shot(connection);
        }
        true
    }

    /// Pushes an event to one connection. Silently drops if it is gone.
    pub(crate) fn send(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(outbox) = self.outboxes.get(&connection) {
            let _ = outbox.send(event);
        }
    }

    pub(crate) fn ack(&self, connection: ConnectionId, seq: u64, value: AckValue) {
        self.send(connection, ServerEvent::Ack { seq, value });
    }

    /// Pushes an event to every host watcher.
    pub(crate) fn broadcast_watchers(&self, event: ServerEvent) {
        for member in self.watchers.members() {
            self.send(member, event.clone());
        }
    }

    pub(crate) fn next_relay(&mut self) -> RelayId {
        let relay = RelayId(self.next_relay);
        self.next_relay += 1;
        relay
    }

    /// Drops the unanswered shot aimed at `connection`, if any, and tells
    /// its shooter the shot went nowhere.
    pub(crate) fn discard_incoming_shot(&mut self, connection: ConnectionId) {
        let pending = self
            .registry
            .lookup_mut(connection)
            .and_then(|r| r.incoming_shot.take());
        if let Some(pending) = pending {
            tracing::debug!(
                target_player = %connection,
                shooter = %pending.shooter,
                relay = %pending.relay,
                "pending shot discarded"
            );
            self.ack(pending.shooter, pending.shooter_seq, AckValue::Shot(None));
        }
    }

    /// Tells watchers that `host`'s game is no longer open.
    pub(crate) fn close_listing(&self, host: ConnectionId) {
        self.broadcast_watchers(ServerEvent::HostRemoved { host: host.into() });
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn watchers(&self) -> &BroadcastGroup {
        &self.watchers
    }

    pub fn phase_of(&self, connection: ConnectionId) -> Option<Phase> {
        self.registry.lookup(connection).map(|r| r.phase())
    }

    pub fn opponent_of(&self, connection: ConnectionId) -> Option<ConnectionId> {
        self.registry.lookup(connection).and_then(|r| r.opponent())
    }

    /// A point-in-time copy of the lobby, ordered by connection id.
    pub fn snapshot(&self) -> LobbySnapshot {
        let mut players: Vec<PlayerSummary> = self
            .registry
            .iter()
            .map(|r| PlayerSummary {
                connection: r.connection(),
                name: r.name().to_string(),
                phase: r.phase(),
                opponent: r.opponent(),
            })
            .collect();
        players.sort_by_key(|p| p.connection);

        LobbySnapshot {
            players,
            watchers: self.watchers.members().collect(),
            open_hosts: self.registry.open_hosts(),
            attached: self.outboxes.len(),
        }
    }

    /// Disconnects everyone.
    ///
    /// Every attached connection is sent [`ServerEvent::Disconnect`] and
    /// loses its outbox, then every record goes through the failure
    /// handler. Returns the number of connections that were attached.
    pub fn shutdown(&mut self, reason: &str) -> usize {
        let outboxes: Vec<(ConnectionId, Outbox)> =
            self.outboxes.drain().collect();
        for (_, outbox) in &outboxes {
            let _ = outbox.send(ServerEvent::Disconnect {
                reason: reason.to_string(),
            });
        }

        let mut players: Vec<ConnectionId> =
            self.registry.iter().map(|r| r.connection()).collect();
        players.sort();
        for player in players {
            self.fail(player, FailureCause::Shutdown);
        }

        tracing::info!(connections = outboxes.len(), %reason, "lobby shut down");
        outboxes.len()
    }
}

/// One player as seen by [`Lobby::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    pub connection: ConnectionId,
    pub name: String,
    pub phase: Phase,
    pub opponent: Option<ConnectionId>,
}

/// A copy of the lobby's state at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    /// Registered players, ordered by connection id.
    pub players: Vec<PlayerSummary>,
    /// Host watchers, ordered by connection id.
    pub watchers: Vec<ConnectionId>,
    pub open_hosts: Vec<HostEntry>,
    /// Connections with an outbox, registered or not.
    pub attached: usize,
}

impl LobbySnapshot {
    pub fn player(&self, connection: ConnectionId) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.connection == connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    fn attached(
        lobby: &mut Lobby,
        id: u64,
    ) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        lobby.attach(cid(id), tx).unwrap();
        rx
    }

    #[test]
    fn test_attach_twice_is_an_error() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let _rx = attached(&mut lobby, 1);
        let (tx, _rx2) = mpsc::unbounded_channel();

        let err = lobby.attach(cid(1), tx).unwrap_err();
        assert!(matches!(err, LobbyError::AlreadyAttached(c) if c == cid(1)));
    }

    #[test]
    fn test_register_acks_with_request_seq() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let mut rx = attached(&mut lobby, 1);

        lobby.handle_event(cid(1), 7, ClientEvent::Register { name: " Ann ".into() });

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Ack {
                seq: 7,
                value: AckValue::Accepted(true)
            }
        );
        assert_eq!(lobby.registry().lookup(cid(1)).unwrap().name(), "Ann");
    }

    #[test]
    fn test_register_twice_on_one_connection_is_refused() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let mut rx = attached(&mut lobby, 1);
        lobby.handle_event(cid(1), 1, ClientEvent::Register { name: "Ann".into() });
        let _ = rx.try_recv();

        lobby.handle_event(cid(1), 2, ClientEvent::Register { name: "Bob".into() });

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Ack {
                seq: 2,
                value: AckValue::Accepted(false)
            }
        );
        assert_eq!(lobby.registry().lookup(cid(1)).unwrap().name(), "Ann");
    }

    #[test]
    fn test_register_blank_name_is_refused() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let mut rx = attached(&mut lobby, 1);

        lobby.handle_event(cid(1), 1, ClientEvent::Register { name: "  ".into() });

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerEvent::Ack {
                seq: 1,
                value: AckValue::Accepted(false)
            }
        );
        assert!(lobby.registry().is_empty());
    }

    #[test]
    fn test_events_before_register_are_dropped() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let mut rx = attached(&mut lobby, 1);

        lobby.handle_event(cid(1), 1, ClientEvent::Host);

        assert!(rx.try_recv().is_err());
        assert!(lobby.registry().is_empty());
    }

    #[test]
    fn test_transition_refuses_skipping_phases() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        lobby.registry.register(cid(1), "Ann");

        assert!(!lobby.transition_to(cid(1), Phase::InBattle));
        assert_eq!(lobby.phase_of(cid(1)), Some(Phase::InLobby));
        assert!(lobby.transition_to(cid(1), Phase::OpenedGame));
        assert_eq!(lobby.phase_of(cid(1)), Some(Phase::OpenedGame));
    }

    #[test]
    fn test_relay_ids_are_unique() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let a = lobby.next_relay();
        let b = lobby.next_relay();
        assert_ne!(a, b);
    }

    #[test]
    fn test_shutdown_disconnects_attached_connections() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        let mut rx1 = attached(&mut lobby, 1);
        let mut rx2 = attached(&mut lobby, 2);
        lobby.handle_event(cid(1), 1, ClientEvent::Register { name: "Ann".into() });
        let _ = rx1.try_recv();

        let closed = lobby.shutdown("maintenance");

        assert_eq!(closed, 2);
        assert_eq!(
            rx1.try_recv().unwrap(),
            ServerEvent::Disconnect {
                reason: "maintenance".into()
            }
        );
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerEvent::Disconnect {
                reason: "maintenance".into()
            }
        );
        let snapshot = lobby.snapshot();
        assert!(snapshot.players.is_empty());
        assert_eq!(snapshot.attached, 0);
    }

    #[test]
    fn test_snapshot_orders_players_by_connection() {
        let mut lobby = Lobby::new(LobbyConfig::default());
        lobby.registry.register(cid(2), "Bob");
        lobby.registry.register(cid(1), "Ann");

        let snapshot = lobby.snapshot();

        let ids: Vec<_> = snapshot.players.iter().map(|p| p.connection).collect();
        assert_eq!(ids, vec![cid(1), cid(2)]);
        assert_eq!(snapshot.player(cid(2)).unwrap().name, "Bob");
        assert_eq!(snapshot.attached, 0);
    }
}
