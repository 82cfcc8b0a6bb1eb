//! Entanglement records point at real moves that share the recorded cell.

use super::Invariant;
use crate::GameState;

/// Invariant: each entanglement links an earlier move to a later one and
/// both contain its cell.
pub struct EntanglementsConsistentInvariant;

impl Invariant<GameState> for EntanglementsConsistentInvariant {
    fn holds(state: &GameState) -> bool {
        let moves = state.moves();
        state.entanglements().iter().all(|ent| {
            ent.existing < ent.placed
                && [ent.existing, ent.placed]
                    .iter()
                    .all(|&idx| moves.get(idx).is_some_and(|m| m.has_cell(ent.cell)))
        })
    }

    fn description() -> &'static str {
        "Entanglements reference existing moves sharing the recorded cell"
    }
}
