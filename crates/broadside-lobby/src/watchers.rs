//! Named multicast set of connections.

use std::collections::BTreeSet;

use broadside_transport::ConnectionId;

/// A named set of connections that receive the same pushes.
///
/// The lobby keeps one, `"host watchers"`, whose members get every
/// open-host addition and removal. Membership is the only state; the
/// lobby does the actual sending.
#[derive(Debug)]
pub struct BroadcastGroup {
    name: &'static str,
    members: BTreeSet<ConnectionId>,
}

impl BroadcastGroup {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds a member. Returns `false` if it was already in the group.
    pub fn join(&mut self, connection: ConnectionId) -> bool {
        self.members.insert(connection)
    }

    /// Removes a member. Returns `false` if it was not in the group.
    pub fn leave(&mut self, connection: ConnectionId) -> bool {
        self.members.remove(&connection)
    }

    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.members.contains(&connection)
    }

    /// Current members, ordered by id.
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
