//! Win detection for quantum tic-tac-toe, including simultaneous wins.
//!
//! A single collapse can complete lines for both players at once. The line
//! whose earliest move has the lower sequence number takes the full point;
//! the other player is credited half a point.

use super::super::{Board, Player, QuantumMove, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A completed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    /// Owner of all three cells.
    pub player: Player,
    /// The three cells.
    pub line: [usize; 3],
    /// Lowest per-player sequence number among the moves resolved into the
    /// line. `u32::MAX` if a cell has no matching move in the ledger.
    pub earliest_seq: u32,
}

/// The decided winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    /// Player credited with the full point.
    pub winner: Player,
    /// The line that decided it.
    pub winning_line: [usize; 3],
    /// Both players completed a line.
    pub simultaneous: bool,
}

impl Victory {
    /// Points for a player: 1 for the winner, 0.5 for the other player on a
    /// simultaneous win, otherwise 0.
    pub fn points(&self, player: Player) -> f32 {
        if player == self.winner {
            1.0
        } else if self.simultaneous {
            0.5
        } else {
            0.0
        }
    }
}

/// Sequence number of the move that resolved into `cell`.
fn resolved_seq(moves: &[QuantumMove], cell: usize) -> Option<u32> {
    moves
        .iter()
        .find(|m| *m.resolved_cell() == Some(cell))
        .map(|m| m.move_id().seq())
}

/// Every line fully held by one player, in line order.
#[instrument(skip(board, moves))]
pub fn winning_lines(board: &Board, moves: &[QuantumMove]) -> Vec<LineWin> {
    let mut wins = Vec::new();
    for line in LINES {
        let [a, b, c] = line;
        let sq = board.get(a);
        if sq != board.get(b) || sq != board.get(c) {
            continue;
        }
        if let Some(Square::Occupied(player)) = sq {
            let earliest_seq = line
                .iter()
                .map(|&cell| resolved_seq(moves, cell).unwrap_or(u32::MAX))
                .min()
                .unwrap_or(u32::MAX);
            debug!(?player, ?line, earliest_seq, "Completed line");
            wins.push(LineWin {
                player,
                line,
                earliest_seq,
            });
        }
    }
    wins
}

/// Best line of a player: the lowest earliest sequence, first in line order.
fn best_line(wins: &[LineWin], player: Player) -> Option<LineWin> {
    wins.iter()
        .filter(|w| w.player == player)
        .fold(None, |best: Option<LineWin>, w| match best {
            Some(b) if b.earliest_seq <= w.earliest_seq => Some(b),
            _ => Some(*w),
        })
}

/// Checks for a winner, applying the simultaneous-win tie-break.
///
/// Equal earliest sequence numbers go to X.
#[instrument(skip(board, moves))]
pub fn check_winner(board: &Board, moves: &[QuantumMove]) -> Option<Victory> {
    let wins = winning_lines(board, moves);
    match (best_line(&wins, Player::X), best_line(&wins, Player::O)) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(Victory {
            winner: only.player,
            winning_line: only.line,
            simultaneous: false,
        }),
        (Some(x), Some(o)) => {
            let first = if o.earliest_seq < x.earliest_seq { o } else { x };
            debug!(
                x_seq = x.earliest_seq,
                o_seq = o.earliest_seq,
                winner = ?first.player,
                "Simultaneous win"
            );
            Some(Victory {
                winner: first.player,
                winning_line: first.line,
                simultaneous: true,
            })
        }
    }
}
