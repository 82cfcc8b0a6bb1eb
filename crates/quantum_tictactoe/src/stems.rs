//! Stem resolution: moves hanging off a cycle whose cell becomes forced.
//!
//! A stem has exactly one candidate outside the cycle's cells and collapses
//! there once the cycle resolves. A complex stem has both candidates inside
//! the cycle's cells and is left alone. Moves with two outside candidates are
//! not stems.

use crate::action::StemConflict;
use crate::types::{Board, CELL_COUNT, QuantumMove};
use tracing::{debug, instrument, warn};

/// A forced collapse for one stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemResolution {
    /// Ledger index of the stem.
    pub index: usize,
    /// Cell it collapses to.
    pub cell: usize,
    /// True when the forced cell was taken and the other candidate was used.
    pub fallback: bool,
}

/// Everything the resolver decided for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StemPlan {
    /// Collapses to apply, in ledger order.
    pub resolutions: Vec<StemResolution>,
    /// Ledger indices of complex stems, left uncollapsed.
    pub complex: Vec<usize>,
    /// Stems skipped because neither candidate was free.
    pub conflicts: Vec<StemConflict>,
}

/// Cells used by any move of the cycle.
pub fn cycle_cells(moves: &[QuantumMove], cycle: &[usize]) -> [bool; CELL_COUNT] {
    let mut cells = [false; CELL_COUNT];
    for mv in cycle.iter().filter_map(|&idx| moves.get(idx)) {
        for &cell in mv.cells() {
            if let Some(slot) = cells.get_mut(cell) {
                *slot = true;
            }
        }
    }
    cells
}

/// Plans the forced collapses of every stem of `cycle`.
///
/// Occupancy is tracked as the plan is built, so two stems forced into the
/// same cell do not both land there: the second one falls back or is skipped.
#[instrument(skip(moves, board))]
pub fn resolve_stems(moves: &[QuantumMove], cycle: &[usize], board: &Board) -> StemPlan {
    let in_cycle = cycle_cells(moves, cycle);
    let mut taken: [bool; CELL_COUNT] = std::array::from_fn(|cell| board.is_occupied(cell));
    let mut plan = StemPlan::default();

    for (idx, mv) in moves.iter().enumerate() {
        if !mv.is_quantum() || cycle.contains(&idx) {
            continue;
        }

        let free: Vec<usize> = mv
            .cells()
            .iter()
            .copied()
            .filter(|&cell| !in_cycle.get(cell).copied().unwrap_or(false))
            .collect();

        match free.as_slice() {
            [forced] => {
                let forced = *forced;
                let resolution = if !taken[forced] {
                    Some(StemResolution {
                        index: idx,
                        cell: forced,
                        fallback: false,
                    })
                } else {
                    mv.other_cell(forced)
                        .filter(|&other| !taken[other])
                        .map(|other| StemResolution {
                            index: idx,
                            cell: other,
                            fallback: true,
                        })
                };

                match resolution {
                    Some(res) => {
                        debug!(stem = %mv.move_id(), cell = res.cell, fallback = res.fallback, "Stem forced");
                        taken[res.cell] = true;
                        plan.resolutions.push(res);
                    }
                    None => {
                        let conflict = StemConflict {
                            move_id: *mv.move_id(),
                            cells: [forced, mv.other_cell(forced).unwrap_or(forced)],
                        };
                        warn!(%conflict, "Stem left uncollapsed");
                        plan.conflicts.push(conflict);
                    }
                }
            }
            [] => {
                debug!(stem = %mv.move_id(), "Complex stem left unresolved");
                plan.complex.push(idx);
            }
            _ => {}
        }
    }

    plan
}
