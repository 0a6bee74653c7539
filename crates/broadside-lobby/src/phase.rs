//! Player phases and the dispatch table that goes with them.
//!
//! ```text
//!                  ┌──────────── abort ─────────────┐
//!                  ▼                                │
//!   register ─→ InLobby ─ host ─→ OpenedGame ─ joined ─┐
//!               │    ▲                              │  │
//!     watch hosts  unwatch hosts                    │  │
//!               ▼    │                              │  ▼
//!           WatchingHosts ─ join host ─→ PlacingShips ◀───────────┐
//!                                          │ ready  │ ready       │
//!                                          ▼        │(other ready)│
//!                               AwaitingPlacement ─→ InBattle     │
//!                                                      │ fleet    │
//!                                                      ▼ destroyed│
//!                                        DecidingOnRegame ────────┤
//!                                          │ wants regame         │
//!                                          ▼                      │
//!                                       WantsRegame ─(other asks)─┘
//! ```
//!
//! Every paired phase also returns to `InLobby` on abort, or when the
//! opponent leaves. Leaving the system is not a phase: the failure
//! handler removes the record from whatever phase it is in.

use std::fmt;

use broadside_protocol::{AckValue, ClientEvent, EventKind};
use broadside_transport::ConnectionId;

use crate::Lobby;

/// Where a registered player is in the match flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    InLobby,
    WatchingHosts,
    OpenedGame,
    PlacingShips,
    AwaitingPlacement,
    InBattle,
    DecidingOnRegame,
    WantsRegame,
}

impl Phase {
    /// Every phase, in flow order.
    pub const ALL: [Phase; 8] = [
        Self::InLobby,
        Self::WatchingHosts,
        Self::OpenedGame,
        Self::PlacingShips,
        Self::AwaitingPlacement,
        Self::InBattle,
        Self::DecidingOnRegame,
        Self::WantsRegame,
    ];

    /// Whether a player in this phase has an opponent.
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            Self::PlacingShips
                | Self::AwaitingPlacement
                | Self::InBattle
                | Self::DecidingOnRegame
                | Self::WantsRegame
        )
    }

    /// Returns `true` if moving from `self` to `target` is a documented
    /// transition. Staying in place is not a transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        use Phase::*;
        match (self, target) {
            (InLobby, WatchingHosts | OpenedGame) => true,
            (WatchingHosts, InLobby | PlacingShips) => true,
            (OpenedGame, InLobby | PlacingShips) => true,
            (PlacingShips, AwaitingPlacement | InBattle | InLobby) => true,
            (AwaitingPlacement, InBattle | InLobby) => true,
            (InBattle, DecidingOnRegame | InLobby) => true,
            (DecidingOnRegame, WantsRegame | PlacingShips | InLobby) => true,
            (WantsRegame, PlacingShips | InLobby) => true,
            _ => false,
        }
    }

    /// Whether an event of this kind reaches a handler in this phase.
    pub fn accepts(self, kind: EventKind) -> bool {
        listeners(self).iter().any(|(k, _)| *k == kind)
    }

    /// The event kinds this phase acts on.
    pub fn accepted_events(self) -> Vec<EventKind> {
        listeners(self).iter().map(|(k, _)| *k).collect()
    }

    /// What the failure handler must undo for a player leaving from this
    /// phase, before the record is deleted.
    pub(crate) fn failure_cleanup(self) -> Option<Cleanup> {
        match self {
            Self::InLobby => None,
            Self::WatchingHosts => Some(Cleanup::LeaveWatchers),
            Self::OpenedGame => Some(Cleanup::CloseListing),
            Self::PlacingShips
            | Self::AwaitingPlacement
            | Self::InBattle
            | Self::DecidingOnRegame
            | Self::WantsRegame => Some(Cleanup::Unpair),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InLobby => "in lobby",
            Self::WatchingHosts => "watching hosts",
            Self::OpenedGame => "opened game",
            Self::PlacingShips => "placing ships",
            Self::AwaitingPlacement => "awaiting placement",
            Self::InBattle => "in battle",
            Self::DecidingOnRegame => "deciding on regame",
            Self::WantsRegame => "wants regame",
        };
        f.write_str(name)
    }
}

/// Phase-specific teardown run by the failure handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cleanup {
    /// Stop receiving host list changes.
    LeaveWatchers,
    /// Tell watchers this game is no longer open.
    CloseListing,
    /// Notify the opponent, sever the pairing, send the opponent home.
    Unpair,
}

/// A phase handler. Returns the acknowledgment to send for the request,
/// or `None` when the reply is deferred or there is none.
pub(crate) type Handler =
    fn(&mut Lobby, ConnectionId, u64, ClientEvent) -> Option<AckValue>;

const IN_LOBBY: &[(EventKind, Handler)] = &[
    (EventKind::Host, Lobby::on_host as Handler),
    (EventKind::WatchHosts, Lobby::on_watch_hosts as Handler),
];

const WATCHING_HOSTS: &[(EventKind, Handler)] = &[
    (EventKind::UnwatchHosts, Lobby::on_unwatch_hosts as Handler),
    (EventKind::JoinHost, Lobby::on_join_host as Handler),
];

const OPENED_GAME: &[(EventKind, Handler)] =
    &[(EventKind::Abort, Lobby::on_abort as Handler)];

const PLACING_SHIPS: &[(EventKind, Handler)] = &[
    (EventKind::Abort, Lobby::on_abort as Handler),
    (EventKind::Ready, Lobby::on_ready as Handler),
];

const AWAITING_PLACEMENT: &[(EventKind, Handler)] =
    &[(EventKind::Abort, Lobby::on_abort as Handler)];

const IN_BATTLE: &[(EventKind, Handler)] = &[
    (EventKind::Shot, Lobby::on_shot as Handler),
    (EventKind::ShotResult, Lobby::on_shot_result as Handler),
    (EventKind::Abort, Lobby::on_abort as Handler),
];

const DECIDING_ON_REGAME: &[(EventKind, Handler)] = &[
    (EventKind::WantsRegame, Lobby::on_wants_regame as Handler),
    (EventKind::Abort, Lobby::on_abort as Handler),
];

const WANTS_REGAME: &[(EventKind, Handler)] =
    &[(EventKind::Abort, Lobby::on_abort as Handler)];

/// The listener set installed for a phase.
pub(crate) fn listeners(phase: Phase) -> &'static [(EventKind, Handler)] {
    match phase {
        Phase::InLobby => IN_LOBBY,
        Phase::WatchingHosts => WATCHING_HOSTS,
        Phase::OpenedGame => OPENED_GAME,
        Phase::PlacingShips => PLACING_SHIPS,
        Phase::AwaitingPlacement => AWAITING_PLACEMENT,
        Phase::InBattle => IN_BATTLE,
        Phase::DecidingOnRegame => DECIDING_ON_REGAME,
        Phase::WantsRegame => WANTS_REGAME,
    }
}

/// The handler for `kind` in `phase`, if that event is legal there.
pub(crate) fn handler_for(phase: Phase, kind: EventKind) -> Option<Handler> {
    listeners(phase)
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, handler)| *handler)
}
