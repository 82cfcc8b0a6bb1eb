//! Board/ledger agreement: a cell is filled iff exactly one move resolved there.

use super::Invariant;
use crate::{Board, GameState};

/// Invariant: the board is exactly the set of collapsed moves.
///
/// Rebuilds the board from the ledger. Two moves resolving into one cell, or
/// a filled cell with no collapsed move behind it, both break it.
pub struct BoardMatchesLedgerInvariant;

impl Invariant<GameState> for BoardMatchesLedgerInvariant {
    fn holds(state: &GameState) -> bool {
        let mut rebuilt = Board::new();
        for mv in state.moves() {
            if let Some(cell) = *mv.resolved_cell() {
                if !rebuilt.is_empty(cell) {
                    return false;
                }
                rebuilt.occupy(cell, mv.player());
            }
        }
        rebuilt == *state.board()
    }

    fn description() -> &'static str {
        "Board matches the collapsed moves of the ledger"
    }
}
