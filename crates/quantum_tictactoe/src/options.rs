//! Collapse option generation.
//!
//! Every way of sending each target move to one of its candidate cells,
//! without reusing a cell, is a valid option. When there are more than the
//! caller wants to show, a greedy pass picks a spread-out subset.

use crate::action::CollapseError;
use crate::types::{Board, MoveId, QuantumMove};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Options shown to the chooser when no limit is configured.
pub const DEFAULT_MAX_OPTIONS: usize = 3;

/// A proposed cell for each of a set of moves.
///
/// Serialized as a JSON object such as `{"X1": 0, "O1": 4}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseOption {
    assignments: BTreeMap<MoveId, usize>,
}

impl CollapseOption {
    /// Wraps a move-to-cell map.
    pub fn new(assignments: BTreeMap<MoveId, usize>) -> Self {
        Self { assignments }
    }

    /// Proposed cell for a move.
    pub fn get(&self, move_id: &MoveId) -> Option<usize> {
        self.assignments.get(move_id).copied()
    }

    /// Entries in label order.
    pub fn iter(&self) -> impl Iterator<Item = (MoveId, usize)> + '_ {
        self.assignments.iter().map(|(id, cell)| (*id, *cell))
    }

    /// Number of moves covered.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Covers no moves.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The underlying map.
    pub fn assignments(&self) -> &BTreeMap<MoveId, usize> {
        &self.assignments
    }

    /// Checks that every move exists, every cell is one of that move's
    /// candidates, and no cell is used twice.
    pub fn validate(&self, moves: &[QuantumMove]) -> Result<(), CollapseError> {
        let mut used = BTreeSet::new();
        for (move_id, cell) in self.iter() {
            let mv = moves
                .iter()
                .find(|m| *m.move_id() == move_id)
                .ok_or(CollapseError::UnknownMove { move_id })?;
            if !mv.has_cell(cell) {
                return Err(CollapseError::NotACandidate { move_id, cell });
            }
            if !used.insert(cell) {
                return Err(CollapseError::CellReused { move_id, cell });
            }
        }
        Ok(())
    }
}

impl FromIterator<(MoveId, usize)> for CollapseOption {
    fn from_iter<T: IntoIterator<Item = (MoveId, usize)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Ledger indices of every uncollapsed move, for the general-purpose mode.
pub fn uncollapsed_indices(moves: &[QuantumMove]) -> Vec<usize> {
    moves
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_quantum())
        .map(|(idx, _)| idx)
        .collect()
}

/// Enumerates every complete assignment of `targets`, as cells in target
/// order. Cells already occupied on the board count as used.
#[instrument(skip(moves, board))]
pub fn enumerate_assignments(
    moves: &[QuantumMove],
    targets: &[usize],
    board: &Board,
) -> Vec<Vec<usize>> {
    if targets.is_empty() {
        return Vec::new();
    }

    let used = (0..crate::types::CELL_COUNT)
        .filter(|&cell| board.is_occupied(cell))
        .fold(0u16, |mask, cell| mask | (1 << cell));

    let mut out = Vec::new();
    let mut current = Vec::with_capacity(targets.len());
    backtrack(moves, targets, used, &mut current, &mut out);
    debug!(count = out.len(), "Enumerated collapse assignments");
    out
}

fn backtrack(
    moves: &[QuantumMove],
    targets: &[usize],
    used: u16,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    let Some(&idx) = targets.get(current.len()) else {
        out.push(current.clone());
        return;
    };
    let Some(mv) = moves.get(idx) else {
        return;
    };

    for &cell in mv.cells() {
        let bit = 1u16 << cell;
        if used & bit != 0 {
            continue;
        }
        current.push(cell);
        backtrack(moves, targets, used | bit, current, out);
        current.pop();
    }
}

/// Number of positions where two assignments differ.
fn disagreement(a: &[usize], b: &[usize]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Greedy spread: seed with the first assignment, then repeatedly take the
/// one with the largest summed disagreement against everything picked so
/// far. Ties go to the earlier assignment.
pub fn select_diverse(all: Vec<Vec<usize>>, max_options: usize) -> Vec<Vec<usize>> {
    if all.len() <= max_options {
        return all;
    }
    if max_options == 0 {
        return Vec::new();
    }

    let mut picked = vec![0];
    let mut remaining: Vec<usize> = (1..all.len()).collect();

    while picked.len() < max_options && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = None;
        for (pos, &candidate) in remaining.iter().enumerate() {
            let score: usize = picked
                .iter()
                .map(|&p| disagreement(&all[candidate], &all[p]))
                .sum();
            if best_score.is_none_or(|best| score > best) {
                best_score = Some(score);
                best_pos = pos;
            }
        }
        picked.push(remaining.remove(best_pos));
    }

    let mut all: Vec<Option<Vec<usize>>> = all.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|idx| all.get_mut(idx).and_then(Option::take))
        .collect()
}

/// Generates at most `max_options` collapse options for `targets`.
#[instrument(skip(moves, board))]
pub fn generate_options(
    moves: &[QuantumMove],
    targets: &[usize],
    board: &Board,
    max_options: usize,
) -> Vec<CollapseOption> {
    let all = enumerate_assignments(moves, targets, board);
    let total = all.len();
    let chosen = select_diverse(all, max_options);
    debug!(total, shown = chosen.len(), "Collapse options selected");

    chosen
        .into_iter()
        .map(|cells| {
            targets
                .iter()
                .zip(cells)
                .filter_map(|(&idx, cell)| moves.get(idx).map(|m| (*m.move_id(), cell)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    fn mv(player: Player, seq: u32, cells: [usize; 2]) -> QuantumMove {
        QuantumMove::new(MoveId::new(player, seq), cells)
    }

    fn triangle() -> Vec<QuantumMove> {
        vec![
            mv(Player::X, 1, [0, 4]),
            mv(Player::O, 1, [4, 8]),
            mv(Player::X, 2, [8, 0]),
        ]
    }

    #[test]
    fn test_triangle_has_two_assignments() {
        let moves = triangle();
        let all = enumerate_assignments(&moves, &[0, 1, 2], &Board::new());
        assert_eq!(all, vec![vec![0, 4, 8], vec![4, 8, 0]]);
    }

    #[test]
    fn test_options_are_valid_bijections() {
        let moves = triangle();
        let options = generate_options(&moves, &[0, 1, 2], &Board::new(), 5);
        assert_eq!(options.len(), 2);
        for option in &options {
            assert_eq!(option.len(), 3);
            option.validate(&moves).unwrap();
        }
    }

    #[test]
    fn test_no_targets_no_options() {
        let moves = triangle();
        assert!(generate_options(&moves, &[], &Board::new(), 3).is_empty());
    }

    #[test]
    fn test_occupied_cells_are_excluded() {
        let moves = triangle();
        let mut board = Board::new();
        board.occupy(0, Player::O);
        // X1 must take 4, O1 then 8, X2 has nowhere to go.
        assert!(enumerate_assignments(&moves, &[0, 1, 2], &board).is_empty());
    }

    #[test]
    fn test_diverse_selection_order() {
        let moves = vec![
            mv(Player::X, 1, [0, 1]),
            mv(Player::O, 1, [2, 3]),
            mv(Player::X, 2, [4, 5]),
        ];
        let all = enumerate_assignments(&moves, &[0, 1, 2], &Board::new());
        assert_eq!(all.len(), 8);
        let picked = select_diverse(all, 3);
        assert_eq!(picked, vec![vec![0, 2, 4], vec![1, 3, 5], vec![0, 2, 5]]);
    }

    #[test]
    fn test_validate_rejects_reuse_and_foreign_cells() {
        let moves = triangle();
        let reused: CollapseOption = [(MoveId::new(Player::X, 1), 4), (MoveId::new(Player::O, 1), 4)]
            .into_iter()
            .collect();
        assert!(matches!(
            reused.validate(&moves),
            Err(CollapseError::CellReused { cell: 4, .. })
        ));

        let foreign: CollapseOption = [(MoveId::new(Player::X, 1), 7)].into_iter().collect();
        assert!(matches!(
            foreign.validate(&moves),
            Err(CollapseError::NotACandidate { cell: 7, .. })
        ));

        let unknown: CollapseOption = [(MoveId::new(Player::O, 9), 7)].into_iter().collect();
        assert!(matches!(
            unknown.validate(&moves),
            Err(CollapseError::UnknownMove { .. })
        ));
    }

    #[test]
    fn test_option_serializes_as_object() {
        let option: CollapseOption = [(MoveId::new(Player::X, 1), 0), (MoveId::new(Player::O, 1), 4)]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&option).unwrap();
        assert_eq!(json, serde_json::json!({"O1": 4, "X1": 0}));
        let back: CollapseOption = serde_json::from_value(json).unwrap();
        assert_eq!(back, option);
    }
}
