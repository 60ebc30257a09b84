//! One room: a host, its challengers, and an independent match per
//! challenger.
//!
//! The host's stones are replicated onto every live board through
//! [`Room::place_host_stone`]; each challenger's replies land only on
//! their own board. Boards diverge after the first differing reply, so a
//! host move can legitimately apply on some boards and be skipped on
//! others.

use std::collections::{HashMap, HashSet};

use omok_protocol::{
    Board, MatchPhase, MatchSnapshot, Outcome, Participant, PlayerId,
    Position, RoomId, RoomStatus, RoomSummary, Stone,
};

use crate::board;

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// One host-vs-one-challenger game: a board plus its turn/result state.
///
/// Owned exclusively by a [`Room`], keyed by challenger id. Once the
/// phase is `Finished`, every mutation path rejects: the board and the
/// result are frozen.
#[derive(Debug, Clone)]
pub(crate) struct Match {
    challenger_id: PlayerId,
    board: Board,
    phase: MatchPhase,
    last_move: Option<Position>,
}

impl Match {
    fn new(challenger_id: PlayerId) -> Self {
        Self {
            challenger_id,
            board: Board::empty(),
            phase: MatchPhase::HostToMove,
            last_move: None,
        }
    }

    fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            challenger_id: self.challenger_id,
            board: self.board.clone(),
            phase: self.phase,
            last_move: self.last_move,
        }
    }

    /// Attempts to apply the host's stone (black) to this board.
    ///
    /// Rejected without any state change unless the match is waiting on
    /// the host and the cell is a valid move *on this board*.
    fn apply_host_move(&mut self, position: Position) -> bool {
        if !matches!(self.phase, MatchPhase::HostToMove) {
            return false;
        }
        if !board::is_valid_move(&self.board, position) {
            return false;
        }

        self.board.place(position, Stone::Black);
        self.last_move = Some(position);
        self.phase = if board::check_win(&self.board, position, Stone::Black)
        {
            MatchPhase::Finished {
                outcome: Outcome::HostWin,
            }
        } else if board::is_board_full(&self.board) {
            MatchPhase::Finished {
                outcome: Outcome::Draw,
            }
        } else {
            MatchPhase::ChallengerToMove
        };
        true
    }

    /// Attempts to apply the challenger's stone (white). Symmetric to
    /// [`Self::apply_host_move`].
    fn apply_challenger_move(&mut self, position: Position) -> bool {
        if !matches!(self.phase, MatchPhase::ChallengerToMove) {
            return false;
        }
        if !board::is_valid_move(&self.board, position) {
            return false;
        }

        self.board.place(position, Stone::White);
        self.last_move = Some(position);
        self.phase = if board::check_win(&self.board, position, Stone::White)
        {
            MatchPhase::Finished {
                outcome: Outcome::ChallengerWin,
            }
        } else if board::is_board_full(&self.board) {
            MatchPhase::Finished {
                outcome: Outcome::Draw,
            }
        } else {
            MatchPhase::HostToMove
        };
        true
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A lobby/match grouping owned by one host.
///
/// The room is the sole mutation boundary for its matches: nothing
/// outside this type touches a [`Match`]. Challenger order is insertion
/// order and only affects display/broadcast ordering, never gameplay.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    host: Participant,
    challengers: Vec<Participant>,
    matches: HashMap<PlayerId, Match>,
    status: RoomStatus,
    /// Challengers who have not yet replied to the host's latest move.
    pending: HashSet<PlayerId>,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        name: impl Into<String>,
        host: Participant,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            host,
            challengers: Vec::new(),
            matches: HashMap::new(),
            status: RoomStatus::Waiting,
            pending: HashSet::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &Participant {
        &self.host
    }

    /// Challengers in join order.
    pub fn challengers(&self) -> &[Participant] {
        &self.challengers
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn is_host(&self, player: PlayerId) -> bool {
        self.host.id == player
    }

    /// Returns `true` if `player` is the host or one of the challengers.
    pub fn is_member(&self, player: PlayerId) -> bool {
        self.is_host(player)
            || self.challengers.iter().any(|c| c.id == player)
    }

    /// Adds a challenger. Rejected once the room has left `Waiting` or if
    /// the identity is already present (as host or challenger).
    pub fn add_challenger(&mut self, participant: Participant) -> bool {
        if self.status != RoomStatus::Waiting {
            return false;
        }
        if self.is_member(participant.id) {
            return false;
        }
        self.challengers.push(participant);
        true
    }

    /// Removes a challenger along with their match and pending entry.
    /// Returns `false` if the identity is not a challenger here.
    pub fn remove_challenger(&mut self, player: PlayerId) -> bool {
        let Some(index) =
            self.challengers.iter().position(|c| c.id == player)
        else {
            return false;
        };
        self.challengers.remove(index);
        self.matches.remove(&player);
        self.pending.remove(&player);
        true
    }

    /// Starts the game: one fresh match per challenger present right now,
    /// each waiting on the host. Fails with no state change if there are
    /// no challengers or the room is not `Waiting`.
    pub fn start_game(&mut self) -> bool {
        if self.challengers.is_empty() || self.status != RoomStatus::Waiting
        {
            return false;
        }

        self.status = RoomStatus::Playing;
        self.matches = self
            .challengers
            .iter()
            .map(|c| (c.id, Match::new(c.id)))
            .collect();
        self.pending.clear();

        tracing::info!(
            room_id = %self.id,
            boards = self.matches.len(),
            "game started"
        );
        true
    }

    /// Replicates the host's stone onto every live board at once.
    ///
    /// Each non-terminal match attempts the move independently: a board
    /// that is not waiting on the host, or whose target cell is already
    /// occupied, skips it. Boards diverge, so partial application is
    /// normal. Returns `true` only if every attempted board accepted the
    /// move; state changes are per-board regardless of the return value.
    ///
    /// Afterwards the pending set is recomputed from scratch as exactly
    /// the challengers whose board is now waiting on them.
    pub fn place_host_stone(&mut self, position: Position) -> bool {
        if self.status != RoomStatus::Playing {
            return false;
        }

        let mut all_applied = true;
        for game in self.matches.values_mut() {
            if game.is_finished() {
                continue;
            }
            if !game.apply_host_move(position) {
                all_applied = false;
            }
        }

        self.pending = self
            .matches
            .iter()
            .filter(|(_, game)| {
                matches!(game.phase, MatchPhase::ChallengerToMove)
            })
            .map(|(id, _)| *id)
            .collect();

        all_applied
    }

    /// Applies a challenger's stone to their own board only.
    ///
    /// Fails if the identity has no match here, the match is terminal or
    /// not waiting on the challenger, or the cell is invalid. Any
    /// accepted reply settles the pending debt, whatever the outcome.
    pub fn place_challenger_stone(
        &mut self,
        player: PlayerId,
        position: Position,
    ) -> bool {
        let Some(game) = self.matches.get_mut(&player) else {
            return false;
        };
        if !game.apply_challenger_move(position) {
            return false;
        }
        self.pending.remove(&player);
        true
    }

    /// Returns `true` once no challenger owes a reply to the host's
    /// latest move.
    pub fn all_challengers_responded(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns `true` once at least one match exists and every match has
    /// a result. The caller is expected to [`Room::finish`] the room.
    pub fn is_game_over(&self) -> bool {
        !self.matches.is_empty()
            && self.matches.values().all(Match::is_finished)
    }

    /// The `playing → finished` step. Monotonic: calling it in any other
    /// status is a no-op.
    pub fn finish(&mut self) {
        if self.status == RoomStatus::Playing {
            self.status = RoomStatus::Finished;
            tracing::info!(room_id = %self.id, "room finished");
        }
    }

    /// Full state of one challenger's match, if it exists.
    pub fn match_snapshot(
        &self,
        challenger: PlayerId,
    ) -> Option<MatchSnapshot> {
        self.matches.get(&challenger).map(Match::snapshot)
    }

    /// Full state of every match, in challenger join order.
    pub fn snapshots(&self) -> Vec<MatchSnapshot> {
        self.challengers
            .iter()
            .filter_map(|c| self.matches.get(&c.id))
            .map(Match::snapshot)
            .collect()
    }

    /// The lobby-visible projection of this room.
    pub fn to_summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            host_name: self.host.name.clone(),
            challenger_count: self.challengers.len(),
            status: self.status,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
