//! Entanglement tracking between uncollapsed moves.

use crate::types::QuantumMove;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Two moves sharing a candidate cell.
///
/// Moves are referenced by their position in the ledger. An entanglement
/// whose endpoints have since collapsed stays in the record but is ignored
/// by every graph built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entanglement {
    /// Ledger index of the move that was already on the board.
    pub existing: usize,
    /// Ledger index of the move that created the entanglement.
    pub placed: usize,
    /// The cell both moves contain.
    pub cell: usize,
}

impl Entanglement {
    /// Whether both endpoints are still uncollapsed.
    pub fn is_live(&self, moves: &[QuantumMove]) -> bool {
        [self.existing, self.placed]
            .iter()
            .all(|&idx| moves.get(idx).is_some_and(QuantumMove::is_quantum))
    }
}

/// Finds the entanglements created by the move at `new_index`.
///
/// Emits one record per shared cell per uncollapsed earlier move, in ledger
/// order and then ascending cell order.
#[instrument(skip(moves))]
pub fn detect(new_index: usize, moves: &[QuantumMove]) -> Vec<Entanglement> {
    let Some(new_move) = moves.get(new_index) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    for (idx, existing) in moves.iter().enumerate() {
        if idx == new_index || !existing.is_quantum() {
            continue;
        }

        let mut shared: Vec<usize> = existing
            .cells()
            .iter()
            .copied()
            .filter(|cell| new_move.has_cell(*cell))
            .collect();
        shared.sort_unstable();
        shared.dedup();

        for cell in shared {
            debug!(
                existing = %existing.move_id(),
                placed = %new_move.move_id(),
                cell,
                "Entanglement formed"
            );
            found.push(Entanglement {
                existing: idx,
                placed: new_index,
                cell,
            });
        }
    }

    found
}
