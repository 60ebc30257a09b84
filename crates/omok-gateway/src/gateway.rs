//! The gateway: who is connected, and who hears what.
//!
//! Tracks one outbound event channel per connected player plus the room
//! broadcast groups. The coordinator mutates game state and then tells
//! the gateway *who* should see the results; the gateway never looks at
//! game state itself, and fan-out projection (host sees every board,
//! challengers only their own) is decided by the caller picking targets.
//!
//! # Concurrency note
//!
//! `Gateway` is not thread-safe and doesn't need to be: it is owned by
//! the single coordinator task, the same task that owns the room
//! directory. Only the cheap `UnboundedSender` handles cross task
//! boundaries.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use omok_protocol::{PlayerId, RoomId, ServerEvent};
use tokio::sync::mpsc;

/// Counter for assigning player identities to new connections.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Channel sender for delivering events to one player's writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Per-connection identity, delivery, and room grouping.
pub struct Gateway {
    /// Outbound channels, keyed by the identity assigned at registration.
    peers: HashMap<PlayerId, EventSender>,

    /// Room broadcast groups. Membership here mirrors room membership
    /// and is maintained by the coordinator alongside directory changes.
    groups: HashMap<RoomId, HashSet<PlayerId>>,
}

impl Gateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self {
            peers: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Registers a new connection: assigns the next player identity and
    /// returns it together with the receiving end of that player's
    /// outbound event stream.
    ///
    /// The identity is stable for the connection's lifetime and is the
    /// sole key the rest of the system uses for this player.
    pub fn register(
        &mut self,
    ) -> (PlayerId, mpsc::UnboundedReceiver<ServerEvent>) {
        let player_id =
            PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.peers.insert(player_id, tx);
        tracing::debug!(%player_id, "peer registered");
        (player_id, rx)
    }

    /// Removes a connection: drops its sender (ending its writer task)
    /// and any group membership.
    pub fn unregister(&mut self, player_id: PlayerId) {
        self.peers.remove(&player_id);
        self.groups.retain(|_, members| {
            members.remove(&player_id);
            !members.is_empty()
        });
        tracing::debug!(%player_id, "peer unregistered");
    }

    /// Adds a player to a room's broadcast group.
    pub fn join_group(&mut self, room_id: &RoomId, player_id: PlayerId) {
        self.groups
            .entry(room_id.clone())
            .or_default()
            .insert(player_id);
    }

    /// Removes a player from a room's broadcast group.
    pub fn leave_group(&mut self, room_id: &RoomId, player_id: PlayerId) {
        if let Some(members) = self.groups.get_mut(room_id) {
            members.remove(&player_id);
            if members.is_empty() {
                self.groups.remove(room_id);
            }
        }
    }

    /// Evicts everyone from a room's broadcast group (room teardown).
    /// The peers themselves stay connected, just roomless now.
    pub fn drop_group(&mut self, room_id: &RoomId) {
        self.groups.remove(room_id);
    }

    /// Sends an event to one player. Silently drops it if the player is
    /// gone; a departed peer is not an error.
    pub fn send(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.peers.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    /// Sends an event to every member of a room's broadcast group.
    pub fn broadcast_group(&self, room_id: &RoomId, event: &ServerEvent) {
        if let Some(members) = self.groups.get(room_id) {
            for player_id in members {
                self.send(*player_id, event.clone());
            }
        }
    }

    /// Sends an event to every connected player (lobby-wide pushes).
    pub fn broadcast_all(&self, event: &ServerEvent) {
        for sender in self.peers.values() {
            let _ = sender.send(event.clone());
        }
    }

    /// Number of connected peers.
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Size of a room's broadcast group (0 if it doesn't exist).
    pub fn group_size(&self, room_id: &RoomId) -> usize {
        self.groups.get(room_id).map_or(0, HashSet::len)
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
