//! Contract-based validation for quantum moves.
//!
//! Contracts define correctness through preconditions and postconditions:
//! {P(state, action)} action {Q(before, after)}. Preconditions run before any
//! mutation so a rejected move leaves no trace.

use crate::action::MoveError;
use crate::invariants::{GameInvariants, InvariantSet, InvariantViolation};
use crate::phases::TurnPhase;
use crate::state::GameState;
use crate::types::CELL_COUNT;
use tracing::{instrument, warn};

/// A contract over a state transition.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks that the transition kept every invariant.
    fn post(before: &S, after: &S) -> Result<(), Vec<InvariantViolation>>;
}

/// A requested quantum move: two candidate cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Cells in the order given.
    pub cells: [usize; 2],
}

// ─────────────────────────────────────────────────────────────
//  Placement Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not ended and no collapse is pending.
pub struct GameInPlay;

impl GameInPlay {
    /// Rejects the move outside the move phase.
    #[instrument(skip(state))]
    pub fn check(state: &GameState) -> Result<(), MoveError> {
        match state.phase() {
            TurnPhase::AwaitingMove(_) => Ok(()),
            TurnPhase::AwaitingCollapseChoice(chooser) => {
                Err(MoveError::CollapsePending(*chooser))
            }
            TurnPhase::GameOver => Err(MoveError::GameOver),
        }
    }
}

/// Precondition: both cells are on the board.
pub struct CellsInRange;

impl CellsInRange {
    /// Reports the first cell past the board.
    #[instrument]
    pub fn check(placement: &Placement) -> Result<(), MoveError> {
        match placement.cells.iter().find(|&&c| c >= CELL_COUNT) {
            Some(&cell) => Err(MoveError::CellOutOfRange(cell)),
            None => Ok(()),
        }
    }
}

/// Precondition: the two cells differ.
pub struct CellsDistinct;

impl CellsDistinct {
    /// Rejects a move naming the same cell twice.
    #[instrument]
    pub fn check(placement: &Placement) -> Result<(), MoveError> {
        let [a, b] = placement.cells;
        if a == b {
            Err(MoveError::DuplicateCells(a))
        } else {
            Ok(())
        }
    }
}

/// Precondition: no move has collapsed into either cell.
///
/// Any number of quantum moves may share a cell.
pub struct CellsUnoccupied;

impl CellsUnoccupied {
    /// Reports the first classical cell.
    #[instrument(skip(state))]
    pub fn check(placement: &Placement, state: &GameState) -> Result<(), MoveError> {
        match placement
            .cells
            .iter()
            .find(|&&c| state.board().is_occupied(c))
        {
            Some(&cell) => Err(MoveError::CellOccupied(cell)),
            None => Ok(()),
        }
    }
}

/// Composite precondition for placing a quantum move.
pub struct LegalPlacement;

impl LegalPlacement {
    /// Validates all preconditions, game state first.
    #[instrument(skip(state))]
    pub fn check(placement: &Placement, state: &GameState) -> Result<(), MoveError> {
        GameInPlay::check(state)?;
        CellsInRange::check(placement)?;
        CellsDistinct::check(placement)?;
        CellsUnoccupied::check(placement, state)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Placement Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for placing a quantum move.
///
/// Postconditions are the full invariant set over the aggregate.
pub struct PlacementContract;

impl Contract<GameState, Placement> for PlacementContract {
    fn pre(state: &GameState, action: &Placement) -> Result<(), MoveError> {
        LegalPlacement::check(action, state).inspect_err(|e| {
            warn!(cells = ?action.cells, error = %e, "Rejected quantum move");
        })
    }

    fn post(before: &GameState, after: &GameState) -> Result<(), Vec<InvariantViolation>> {
        GameInvariants::check_all(after)?;
        if after.moves().len() < before.moves().len() {
            return Err(vec![InvariantViolation::new("Move ledger shrank")]);
        }
        Ok(())
    }
}
