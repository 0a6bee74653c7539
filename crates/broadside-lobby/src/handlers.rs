//! Phase handlers.
//!
//! Each function here is installed for one or more phases in the table in
//! `phase.rs` and is only ever called when the sender's phase accepts the
//! event. The returned value, if any, becomes the acknowledgment for the
//! request.

use broadside_protocol::{AckValue, ClientEvent, HostEntry, ServerEvent};
use broadside_transport::ConnectionId;

use crate::player::PendingShot;
use crate::{Lobby, Phase};

impl Lobby {
    pub(crate) fn on_host(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        if !self.transition_to(conn, Phase::OpenedGame) {
            return Some(AckValue::Accepted(false));
        }
        if let Some(record) = self.registry.lookup(conn) {
            let host = HostEntry {
                id: conn.into(),
                name: record.name().to_string(),
            };
            tracing::info!(%conn, host = %host.id, "game opened");
            self.broadcast_watchers(ServerEvent::HostAdded { host });
        }
        Some(AckValue::Accepted(true))
    }

    pub(crate) fn on_watch_hosts(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        let hosts = self.registry.open_hosts();
        self.watchers.join(conn);
        self.transition_to(conn, Phase::WatchingHosts);
        Some(AckValue::Hosts(hosts))
    }

    pub(crate) fn on_unwatch_hosts(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        self.watchers.leave(conn);
        let moved = self.transition_to(conn, Phase::InLobby);
        Some(AckValue::Accepted(moved))
    }

    pub(crate) fn on_join_host(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        event: ClientEvent,
    ) -> Option<AckValue> {
        let ClientEvent::JoinHost { host } = event else {
            return None;
        };
        let host: ConnectionId = host.into();

        let open = host != conn
            && self.phase_of(host) == Some(Phase::OpenedGame);
        if !open {
            tracing::debug!(%conn, %host, "join target is not an open host");
            return Some(AckValue::Accepted(false));
        }

        self.pair(conn, host);
        self.transition_to(conn, Phase::PlacingShips);
        self.transition_to(host, Phase::PlacingShips);

        let joiner = self
            .registry
            .lookup(conn)
            .map(|r| r.name().to_string())
            .unwrap_or_default();
        self.send(host, ServerEvent::OpponentJoined { name: joiner });
        Some(AckValue::Accepted(true))
    }

    pub(crate) fn on_ready(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        let opponent = self.opponent_of(conn)?;

        if self.phase_of(opponent) == Some(Phase::AwaitingPlacement) {
            self.transition_to(conn, Phase::InBattle);
            self.transition_to(opponent, Phase::InBattle);
            self.send(opponent, ServerEvent::OpponentReady);
            tracing::info!(%conn, %opponent, "battle started");
            Some(AckValue::Accepted(true))
        } else {
            self.transition_to(conn, Phase::AwaitingPlacement);
            Some(AckValue::Accepted(false))
        }
    }

    /// Relays a shot to the opponent. The shooter's acknowledgment is
    /// deferred until the opponent answers with a matching
    /// [`ClientEvent::ShotResult`].
    pub(crate) fn on_shot(
        &mut self,
        conn: ConnectionId,
        seq: u64,
        event: ClientEvent,
    ) -> Option<AckValue> {
        let ClientEvent::Shot { coords } = event else {
            return None;
        };
        let opponent = self.opponent_of(conn)?;

        let busy = self
            .registry
            .lookup(opponent)
            .is_none_or(|r| r.has_incoming_shot());
        if busy {
            tracing::debug!(%conn, %opponent, "previous shot unanswered, refusing");
            return Some(AckValue::Shot(None));
        }

        let relay = self.next_relay();
        if let Some(target) = self.registry.lookup_mut(opponent) {
            target.incoming_shot = Some(PendingShot {
                relay,
                shooter: conn,
                shooter_seq: seq,
            });
        }
        self.send(opponent, ServerEvent::IncomingShot { relay, coords });
        None
    }

    /// Resumes the shot this result answers and acknowledges its shooter.
    /// A result for any other relay is dropped.
    pub(crate) fn on_shot_result(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        event: ClientEvent,
    ) -> Option<AckValue> {
        let ClientEvent::ShotResult { relay, result } = event else {
            return None;
        };

        let record = self.registry.lookup_mut(conn)?;
        let pending = match record.incoming_shot {
            Some(pending) if pending.relay == relay => pending,
            _ => {
                tracing::debug!(%conn, %relay, "result for unknown relay, dropping");
                return None;
            }
        };
        record.incoming_shot = None;

        let destroyed = result.fleet_destroyed;
        self.ack(
            pending.shooter,
            pending.shooter_seq,
            AckValue::Shot(Some(result)),
        );

        if destroyed {
            self.transition_to(conn, Phase::DecidingOnRegame);
            self.transition_to(pending.shooter, Phase::DecidingOnRegame);
            tracing::info!(winner = %pending.shooter, loser = %conn, "battle over");
        }
        None
    }

    pub(crate) fn on_wants_regame(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        let opponent = self.opponent_of(conn)?;
        self.send(opponent, ServerEvent::OpponentWantsRegame);

        if self.phase_of(opponent) == Some(Phase::WantsRegame) {
            self.transition_to(conn, Phase::PlacingShips);
            self.transition_to(opponent, Phase::PlacingShips);
            tracing::info!(%conn, %opponent, "regame started");
            Some(AckValue::Accepted(true))
        } else {
            self.transition_to(conn, Phase::WantsRegame);
            Some(AckValue::Accepted(false))
        }
    }

    pub(crate) fn on_abort(
        &mut self,
        conn: ConnectionId,
        _seq: u64,
        _event: ClientEvent,
    ) -> Option<AckValue> {
        match self.phase_of(conn)? {
            Phase::OpenedGame => {
                self.close_listing(conn);
                tracing::info!(%conn, "game closed by host");
            }
            phase if phase.is_paired() => self.unpair(conn),
            _ => {}
        }
        let moved = self.transition_to(conn, Phase::InLobby);
        Some(AckValue::Accepted(moved))
    }
}
