//! Draw detection for quantum tic-tac-toe.

use super::super::{Board, QuantumMove, Square};
use super::win::check_winner;
use tracing::instrument;

/// Checks if every cell holds a collapsed move.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// A quantum move needs two empty cells.
#[instrument(skip(board))]
pub fn has_room_for_move(board: &Board) -> bool {
    board.empty_count() >= 2
}

/// No winner and no room left for another quantum move.
#[instrument(skip(board, moves))]
pub fn is_draw(board: &Board, moves: &[QuantumMove]) -> bool {
    check_winner(board, moves).is_none() && !has_room_for_move(board)
}
