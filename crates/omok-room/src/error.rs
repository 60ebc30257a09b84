//! Error types for the room layer.

use omok_protocol::{PlayerId, RoomId};

/// Why a room operation was rejected.
///
/// Every variant is a rejected command, never a fault: nothing here
/// indicates corrupted state, and no state changes when one is returned.
/// The display strings are what clients see in error notifications.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The acting player already belongs to a room.
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The room exists but is not accepting challengers (already playing
    /// or finished, or this identity is already a member).
    #[error("room {0} is not accepting challengers")]
    NotJoinable(RoomId),

    /// The acting player is in no room.
    #[error("player {0} is not in any room")]
    NotInRoom(PlayerId),

    /// A host-only command came from a challenger.
    #[error("only the host can do that")]
    NotHost(PlayerId),

    /// The game cannot start with an empty challenger list.
    #[error("cannot start the game without challengers")]
    NoChallengers,

    /// Start was requested again after the game already began.
    #[error("the game has already started")]
    AlreadyStarted(RoomId),

    /// A stone was placed while the room was not playing.
    #[error("the game is not in progress")]
    NotPlaying(RoomId),

    /// The move was rejected: occupied or out-of-bounds cell, out of
    /// turn, or no match for the acting player.
    #[error("invalid move")]
    InvalidMove,
}
