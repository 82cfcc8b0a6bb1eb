//! Collapsed moves resolve into one of their own candidates.

use super::Invariant;
use crate::GameState;

/// Invariant: collapsed iff resolved, and the resolved cell is a candidate.
pub struct ResolutionWithinCandidatesInvariant;

impl Invariant<GameState> for ResolutionWithinCandidatesInvariant {
    fn holds(state: &GameState) -> bool {
        state.moves().iter().all(|mv| match *mv.resolved_cell() {
            Some(cell) => *mv.collapsed() && mv.has_cell(cell),
            None => !*mv.collapsed(),
        })
    }

    fn description() -> &'static str {
        "Every resolved cell belongs to its move's candidate pair"
    }
}
