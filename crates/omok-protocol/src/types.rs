//! Core protocol types for the omok-arena wire format.
//!
//! Everything in this module travels on the wire: these are the structures
//! that get serialized to JSON text frames, sent over the WebSocket, and
//! deserialized on the other side. The client and server agree on these
//! shapes and nothing else.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player.
///
/// Assigned by the gateway when a connection is accepted and stable for the
/// lifetime of that connection. This is the sole key used to resolve a
/// participant to their room and match.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as the bare
/// number `42`, not as `{"0": 42}`: the client sees a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A room code: six uppercase alphanumeric characters, shown to players so
/// they can tell others which room to join.
///
/// Serializes as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the room code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// ---------------------------------------------------------------------------
// Board vocabulary
// ---------------------------------------------------------------------------

/// The board dimension. Boards are always `BOARD_SIZE` × `BOARD_SIZE`.
pub const BOARD_SIZE: usize = 15;

/// A placed stone. The host always plays black, challengers white.
///
/// There is no `Empty` variant: an empty cell is `Option<Stone>::None`
/// on the board, so "check whether an empty stone won" cannot even be
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stone {
    Black,
    White,
}

/// A board coordinate: `(row, col)`, 0-indexed, each in `[0, BOARD_SIZE)`.
///
/// Out-of-range values are representable (they arrive from the network)
/// and are rejected by move validation, never by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A full board: a row-major grid of cells, each empty or holding a stone.
///
/// Serialized as nested arrays of `"black" | "white" | null`, which is
/// exactly what the client renders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub cells: [[Option<Stone>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Returns the stone at `position`, or `None` for an empty cell.
    ///
    /// Callers are expected to pass in-bounds positions; this indexes
    /// directly and panics on out-of-range input like any slice access.
    pub fn stone_at(&self, position: Position) -> Option<Stone> {
        self.cells[position.row][position.col]
    }

    /// Places a stone at `position`, overwriting whatever was there.
    /// Validity gating is the caller's job.
    pub fn place(&mut self, position: Position, stone: Stone) {
        self.cells[position.row][position.col] = Some(stone);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// Whether a participant hosts the room or challenges the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Challenger,
}

/// A player as seen inside a room: identity, display name, and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
}

impl Participant {
    pub fn host(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: Role::Host,
        }
    }

    pub fn challenger(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: Role::Challenger,
        }
    }

    /// Returns `true` for the room's host.
    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }
}

// ---------------------------------------------------------------------------
// Match state
// ---------------------------------------------------------------------------

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    HostWin,
    ChallengerWin,
    Draw,
}

/// The turn/result state of one match, as a single tagged variant.
///
/// Folding the turn flag and the result into one enum means the illegal
/// state "result set but it is still somebody's turn" cannot be
/// represented. Wire shapes:
///
/// ```json
/// {"state": "host-to-move"}
/// {"state": "finished", "outcome": "host-win"}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum MatchPhase {
    /// The host has not yet replicated a move onto this board.
    HostToMove,
    /// This board's challenger owes a reply.
    ChallengerToMove,
    /// Terminal. No further moves are accepted on this board.
    Finished { outcome: Outcome },
}

impl MatchPhase {
    /// Returns `true` once the match has a result.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Everything a client needs to render one match: whose board it is, the
/// grid, the turn/result state, and the most recent move.
///
/// The host receives one of these per challenger; each challenger receives
/// only their own. That projection is applied by the serving layer; the
/// snapshot itself is always the full match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub challenger_id: PlayerId,
    pub board: Board,
    pub phase: MatchPhase,
    pub last_move: Option<Position>,
}

// ---------------------------------------------------------------------------
// Room summaries
// ---------------------------------------------------------------------------

/// The lifecycle state of a room. Transitions are monotonic:
/// `waiting → playing → finished`, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Accepting challengers; the game has not started.
    Waiting,
    /// Game in progress. Joining is no longer possible.
    Playing,
    /// Every match has a result.
    Finished,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting challengers.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("waiting"),
            Self::Playing => f.write_str("playing"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// The only room data exposed to parties outside the room (lobby listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub host_name: String,
    pub challenger_count: usize,
    pub status: RoomStatus,
}

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

/// Commands a client sends to the server, one per frame.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{"type": "PlaceStone", "position": {"row": 7, "col": 7}}`, flat and
/// easy to build from a JavaScript client.
///
/// The acting player is never part of the payload: identity comes from the
/// connection the command arrived on, so a client cannot speak for anyone
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Create a room and become its host.
    CreateRoom {
        room_name: String,
        player_name: String,
    },

    /// Join an existing room as a challenger.
    JoinRoom {
        room_id: RoomId,
        player_name: String,
    },

    /// Leave the current room. From the host this tears the room down.
    LeaveRoom,

    /// Start the game. Host only; requires at least one challenger.
    StartGame,

    /// Place a stone. Routed to the host or challenger path by role.
    PlaceStone { position: Position },

    /// Request the lobby listing of waiting rooms.
    ListRooms,
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// To the creator: the room now exists and you are its host.
    RoomCreated { room: RoomSummary },

    /// To the joiner: you are in, and this is who you are in the room.
    RoomJoined {
        room: RoomSummary,
        player: Participant,
    },

    /// To the rest of the room: someone joined.
    PlayerJoined { player: Participant },

    /// To the rest of the room: a challenger left.
    PlayerLeft { player_id: PlayerId },

    /// To the whole room: the game has started.
    GameStarted,

    /// A match snapshot. The host gets one per challenger; each
    /// challenger only their own.
    GameState { state: MatchSnapshot },

    /// To the whole room: the host placed a stone at this position.
    HostMoved { position: Position },

    /// To the host: this challenger replied at this position.
    ChallengerMoved {
        challenger_id: PlayerId,
        position: Position,
    },

    /// A match just became terminal; carries its final snapshot.
    GameOver { state: MatchSnapshot },

    /// To the host: every pending challenger has now replied.
    AllChallengersResponded,

    /// The lobby listing. Pushed to everyone whenever it changes and
    /// sent directly in reply to [`ClientCommand::ListRooms`].
    RoomList { rooms: Vec<RoomSummary> },

    /// A rejected command or a room teardown notice, with the reason.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
