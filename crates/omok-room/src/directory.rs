//! The room directory: every live room, plus a participant reverse index.
//!
//! Two maps, one owner. `rooms` is authoritative; `player_rooms` is a
//! derived index so a command can be routed to its room by the acting
//! identity alone. Every mutation goes through directory methods that
//! update both together; nothing else can touch the maps.

use std::collections::HashMap;

use omok_protocol::{Participant, PlayerId, RoomId, RoomSummary};
use rand::Rng;

use crate::{Room, RoomError};

/// Alphabet for generated room codes.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Length of a generated room code.
const CODE_LEN: usize = 6;

/// What happened when a participant left their room.
#[derive(Debug)]
pub enum Departure {
    /// The host left. The room was torn down and is returned (owned) so
    /// the caller can still notify its former members.
    Host(Room),
    /// A challenger left the given room, which lives on.
    Challenger(RoomId),
}

/// Registry of all rooms and the participant → room routing index.
pub struct RoomDirectory {
    rooms: HashMap<RoomId, Room>,
    /// A player is in at most one room at a time (key invariant).
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Creates a room with a fresh code; `host` becomes its fixed host.
    ///
    /// Rejects a host who is already in some room: a participant holds
    /// at most one membership, host or challenger.
    pub fn create_room(
        &mut self,
        name: &str,
        host: Participant,
    ) -> Result<&Room, RoomError> {
        if let Some(current) = self.player_rooms.get(&host.id) {
            return Err(RoomError::AlreadyInRoom(host.id, current.clone()));
        }

        let room_id = self.generate_room_id();
        let host_id = host.id;
        self.rooms
            .insert(room_id.clone(), Room::new(room_id.clone(), name, host));
        self.player_rooms.insert(host_id, room_id.clone());

        tracing::info!(%room_id, %host_id, "room created");
        Ok(self.rooms.get(&room_id).expect("just inserted"))
    }

    /// Draws random 6-character codes until one is unused. Collisions are
    /// rare (36^6 codes) so the loop is effectively a single draw.
    fn generate_room_id(&self) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| {
                    CODE_CHARS[rng.random_range(0..CODE_CHARS.len())]
                        as char
                })
                .collect();
            let room_id = RoomId(code);
            if !self.rooms.contains_key(&room_id) {
                return room_id;
            }
        }
    }

    /// Looks up a room by its code.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Looks up the room a participant is in, if any.
    pub fn room_by_participant(&self, player: PlayerId) -> Option<&Room> {
        let room_id = self.player_rooms.get(&player)?;
        self.rooms.get(room_id)
    }

    /// Mutable variant of [`Self::room_by_participant`].
    pub fn room_by_participant_mut(
        &mut self,
        player: PlayerId,
    ) -> Option<&mut Room> {
        let room_id = self.player_rooms.get(&player)?;
        self.rooms.get_mut(room_id)
    }

    /// Adds `participant` to the room as a challenger and indexes them.
    pub fn join_room(
        &mut self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<&Room, RoomError> {
        if let Some(current) = self.player_rooms.get(&participant.id) {
            return Err(RoomError::AlreadyInRoom(
                participant.id,
                current.clone(),
            ));
        }

        let player_id = participant.id;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        if !room.add_challenger(participant) {
            return Err(RoomError::NotJoinable(room_id.clone()));
        }
        self.player_rooms.insert(player_id, room_id.clone());

        tracing::info!(
            %room_id,
            %player_id,
            challengers = room.challengers().len(),
            "challenger joined"
        );
        Ok(room)
    }

    /// Removes a participant from their room.
    ///
    /// A departing host tears the whole room down: every member's index
    /// entry is dropped and the room is removed (and returned, so the
    /// caller can notify its former members). A departing challenger
    /// only removes themself. Returns `None` if the player was in no
    /// room.
    pub fn leave_room(&mut self, player: PlayerId) -> Option<Departure> {
        let room_id = self.player_rooms.get(&player)?.clone();
        let room = self.rooms.get_mut(&room_id)?;

        if room.is_host(player) {
            let room =
                self.rooms.remove(&room_id).expect("present just above");
            self.player_rooms.remove(&player);
            for challenger in room.challengers() {
                self.player_rooms.remove(&challenger.id);
            }
            tracing::info!(%room_id, "host left, room closed");
            Some(Departure::Host(room))
        } else {
            room.remove_challenger(player);
            self.player_rooms.remove(&player);
            tracing::info!(%room_id, %player, "challenger left");
            Some(Departure::Challenger(room_id))
        }
    }

    /// Explicitly removes a room, dropping every member's index entry:
    /// the same cascade as a host departure.
    pub fn delete_room(&mut self, room_id: &RoomId) -> Option<Room> {
        let room = self.rooms.remove(room_id)?;
        self.player_rooms.remove(&room.host().id);
        for challenger in room.challengers() {
            self.player_rooms.remove(&challenger.id);
        }
        tracing::info!(%room_id, "room deleted");
        Some(room)
    }

    /// Lobby listing: summaries of rooms still accepting challengers.
    pub fn waiting_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .values()
            .filter(|room| room.status().is_joinable())
            .map(Room::to_summary)
            .collect()
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}
