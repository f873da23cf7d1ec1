//! Connection tracking.
//!
//! Maps ephemeral connection handles (a socket id, a browser tab) to stable
//! player identities. Several connections may point at the same player; the
//! player counts as connected while any of them remains.

use std::collections::HashMap;

use super::player::PlayerId;

/// Ephemeral connection handle, changes on every refresh.
pub type ConnectionId = String;

/// Connection handle to player identity index.
#[derive(Debug, Default, Clone)]
pub struct ConnectionMap {
    connections: HashMap<ConnectionId, PlayerId>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to a player. Returns the player it was bound to
    /// before, if any.
    pub fn bind(&mut self, connection: ConnectionId, player_id: PlayerId) -> Option<PlayerId> {
        self.connections.insert(connection, player_id)
    }

    /// Remove a connection, returning the player it was bound to.
    pub fn unbind(&mut self, connection: &str) -> Option<PlayerId> {
        self.connections.remove(connection)
    }

    /// Get the player for a connection.
    pub fn player_for(&self, connection: &str) -> Option<&PlayerId> {
        self.connections.get(connection)
    }

    /// Check if any connection still targets a player.
    pub fn has_connections(&self, player_id: &str) -> bool {
        self.connections.values().any(|pid| pid == player_id)
    }

    /// Drop every binding to a player. Returns how many were removed.
    pub fn purge_player(&mut self, player_id: &str) -> usize {
        let before = self.connections.len();
        self.connections.retain(|_, pid| pid != player_id);
        before - self.connections.len()
    }

    /// Count bindings.
    #[cfg(test)]
    pub fn count(&self) -> usize {
        self.connections.len()
    }
}
