//! Pure board rules: move validation, win detection, full-board check.
//!
//! These are free functions over [`Board`] with no state of their own.
//! Every match in every room applies them identically. Placing the stone
//! is the caller's job once validity is confirmed; the rules here never
//! mutate anything.

use omok_protocol::{Board, Position, Stone, BOARD_SIZE};

/// The four axes a five-in-a-row can lie on, as `(row, col)` steps.
/// Each axis is scanned in both directions from the placed stone.
const AXES: [(isize, isize); 4] = [
    (0, 1),  // horizontal
    (1, 0),  // vertical
    (1, 1),  // diagonal
    (1, -1), // anti-diagonal
];

/// Returns `true` iff `position` is on the board and the cell is empty.
pub fn is_valid_move(board: &Board, position: Position) -> bool {
    position.row < BOARD_SIZE
        && position.col < BOARD_SIZE
        && board.stone_at(position).is_none()
}

/// Returns `true` iff the stone just placed at `last_move` completes a
/// contiguous run of five or more `stone` cells along any axis.
///
/// Only runs through `last_move` are examined: a move that doesn't touch
/// a five-in-a-row cannot have created one, so the rest of the board is
/// irrelevant.
pub fn check_win(board: &Board, last_move: Position, stone: Stone) -> bool {
    for (dr, dc) in AXES {
        // 1 for the placed stone itself, plus the run on either side.
        let run = 1
            + run_length(board, last_move, stone, dr, dc)
            + run_length(board, last_move, stone, -dr, -dc);
        if run >= 5 {
            return true;
        }
    }
    false
}

/// Counts contiguous `stone` cells stepping `(dr, dc)` outward from
/// `from` (exclusive), stopping at a board edge, a non-matching cell, or
/// four steps out. Further stones cannot extend a run through `from`
/// past five.
fn run_length(
    board: &Board,
    from: Position,
    stone: Stone,
    dr: isize,
    dc: isize,
) -> usize {
    let mut count = 0;
    for step in 1..5 {
        let row = from.row as isize + dr * step;
        let col = from.col as isize + dc * step;
        if row < 0
            || row >= BOARD_SIZE as isize
            || col < 0
            || col >= BOARD_SIZE as isize
        {
            break;
        }
        let position = Position::new(row as usize, col as usize);
        if board.stone_at(position) != Some(stone) {
            break;
        }
        count += 1;
    }
    count
}

/// Returns `true` iff no empty cell remains.
pub fn is_board_full(board: &Board) -> bool {
    board
        .cells
        .iter()
        .all(|row| row.iter().all(|cell| cell.is_some()))
}
