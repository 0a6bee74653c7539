//! The connection registry: connection id → player record.
//!
//! The registry is a plain `HashMap`, not a concurrent map. It is owned by
//! the lobby actor and only ever touched from that one task.

use std::collections::HashMap;

use broadside_protocol::HostEntry;
use broadside_transport::ConnectionId;

use crate::{Phase, PlayerRecord};

/// All registered players, keyed by connection.
///
/// Opponent links are connection ids, so a record never holds a
/// reference into another record.
#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<ConnectionId, PlayerRecord>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record for `connection` in [`Phase::InLobby`].
    ///
    /// Returns `false` and changes nothing if the connection already has
    /// a record or if `name` is in use (case-sensitive).
    ///
    /// Uniqueness is checked against the records present right now and
    /// never revalidated later.
    pub fn register(&mut self, connection: ConnectionId, name: &str) -> bool {
        if self.records.contains_key(&connection) || self.name_taken(name) {
            return false;
        }
        self.records
            .insert(connection, PlayerRecord::new(connection, name.into()));
        true
    }

    /// Looks up a record by connection id.
    pub fn lookup(&self, connection: ConnectionId) -> Option<&PlayerRecord> {
        self.records.get(&connection)
    }

    pub(crate) fn lookup_mut(
        &mut self,
        connection: ConnectionId,
    ) -> Option<&mut PlayerRecord> {
        self.records.get_mut(&connection)
    }

    /// Deletes a record unconditionally.
    pub(crate) fn remove(
        &mut self,
        connection: ConnectionId,
    ) -> Option<PlayerRecord> {
        self.records.remove(&connection)
    }

    /// Whether any registered player uses exactly this name.
    pub fn name_taken(&self, name: &str) -> bool {
        self.records.values().any(|r| r.name() == name)
    }

    /// Every player currently in [`Phase::OpenedGame`], ordered by id.
    pub fn open_hosts(&self) -> Vec<HostEntry> {
        let mut hosts: Vec<HostEntry> = self
            .records
            .values()
            .filter(|r| r.phase() == Phase::OpenedGame)
            .map(|r| HostEntry {
                id: r.connection().into(),
                name: r.name().to_string(),
            })
            .collect();
        hosts.sort_by_key(|h| h.id);
        hosts
    }

    /// Iterates over all records in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
