//! Error types for moves and collapses.
//!
//! Rejected moves never mutate state. Collapse errors are mostly per-entry:
//! the engine records them as skips and keeps applying the rest of a batch.

use crate::types::{CELL_COUNT, MoveId, Player};
use serde::{Deserialize, Serialize};

/// Error raised when a quantum move cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    /// A cell index is outside the board.
    #[display("Cell {} is out of range (must be 0-{})", _0, CELL_COUNT - 1)]
    CellOutOfRange(#[error(not(source))] usize),

    /// Both candidate cells are the same.
    #[display("Cells must be different (got {} twice)", _0)]
    DuplicateCells(#[error(not(source))] usize),

    /// A classical mark already sits in the cell.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(#[error(not(source))] usize),

    /// A winner or a draw has been reached.
    #[display("Game is already over")]
    GameOver,

    /// A cycle is waiting for this player to pick its collapse.
    ///
    /// The one rejection outside the listed invalid-move reasons: a pending
    /// cycle must resolve before the next quantum move.
    #[display("Waiting for {} to choose how the cycle collapses", _0)]
    CollapsePending(#[error(not(source))] Player),
}

/// Reason a single collapse entry was not applied.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Error,
)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CollapseError {
    /// No move carries this label.
    #[display("No move {}", move_id)]
    UnknownMove {
        /// Requested move.
        move_id: MoveId,
    },

    /// The move collapsed earlier.
    #[display("Move {} has already collapsed", move_id)]
    AlreadyCollapsed {
        /// Requested move.
        move_id: MoveId,
    },

    /// The chosen cell is not one of the move's candidates.
    #[display("Invalid choice: {} cannot collapse to {}", move_id, cell)]
    NotACandidate {
        /// Requested move.
        move_id: MoveId,
        /// Requested cell.
        cell: usize,
    },

    /// Another move already resolved into the cell.
    #[display("Cell {} is already occupied, {} left uncollapsed", cell, move_id)]
    CellOccupied {
        /// Requested move.
        move_id: MoveId,
        /// Requested cell.
        cell: usize,
    },

    /// Two entries of one option target the same cell.
    #[display("Cell {} is assigned twice (second time to {})", cell, move_id)]
    CellReused {
        /// Move whose assignment repeats a cell.
        move_id: MoveId,
        /// Repeated cell.
        cell: usize,
    },

    /// Collapses are refused once the game has ended.
    #[display("Game is already over")]
    GameOver,
}

/// A stem whose forced cell and fallback cell were both taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("Stem {} has no free cell (tried {} and {})", move_id, cells[0], cells[1])]
pub struct StemConflict {
    /// The stem left uncollapsed.
    pub move_id: MoveId,
    /// Forced cell, then fallback cell.
    pub cells: [usize; 2],
}

/// A move label that does not look like `X1` or `O3`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid move label {:?} (expected e.g. X1 or O2)", label)]
pub struct MoveIdParseError {
    /// The rejected input.
    pub label: String,
}

impl MoveIdParseError {
    /// Creates a parse error for the given input.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}
