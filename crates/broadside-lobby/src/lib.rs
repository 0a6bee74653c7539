//! The Broadside lobby: players, phases, pairing.
//!
//! Every connection that registers a name gets a [`PlayerRecord`] in the
//! [`Registry`]. The record's [`Phase`] decides which client events the
//! lobby will act on (see [`Phase::accepts`]); anything else is dropped
//! before it reaches a handler. Handlers move records between phases,
//! pair and unpair opponents, and publish open-host changes to the
//! [`BroadcastGroup`] of host watchers.
//!
//! All of this state lives in one [`Lobby`] owned by a single actor task
//! ([`spawn_lobby`] / [`LobbyHandle`]). Commands are processed one at a
//! time to completion, so no handler ever observes another half-done.
//!
//! # Key types
//!
//! - [`Lobby`]: the state machine itself, usable synchronously
//! - [`LobbyHandle`]: send commands to the running lobby actor
//! - [`Phase`]: per-player state, plus the dispatch table
//! - [`FailureCause`]: why a connection is being torn down

mod actor;
mod config;
mod error;
mod failure;
mod handlers;
mod lobby;
mod pairing;
mod phase;
mod player;
mod registry;
mod watchers;

pub use actor::{LobbyHandle, spawn_lobby};
pub use config::LobbyConfig;
pub use error::LobbyError;
pub use failure::FailureCause;
pub use lobby::{Lobby, LobbySnapshot, PlayerSummary};
pub use phase::Phase;
pub use player::{Outbox, PlayerRecord};
pub use registry::Registry;
pub use watchers::BroadcastGroup;
