//! First-class invariants for quantum tic-tac-toe.
//!
//! Invariants are logical properties of the game-state aggregate that must
//! hold after every mutation. They are checked in debug builds and can be
//! tested independently.

pub mod board_matches_ledger;
pub mod entanglements_consistent;
pub mod resolution_within_candidates;
pub mod sequence_numbers;

pub use board_matches_ledger::BoardMatchesLedgerInvariant;
pub use entanglements_consistent::EntanglementsConsistentInvariant;
pub use resolution_within_candidates::ResolutionWithinCandidatesInvariant;
pub use sequence_numbers::SequenceNumbersInvariant;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implemented for tuples of invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn collect(violations: Vec<InvariantViolation>) -> Result<(), Vec<InvariantViolation>> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_one<S, I: Invariant<S>>(state: &S, violations: &mut Vec<InvariantViolation>) {
    if !I::holds(state) {
        violations.push(InvariantViolation::new(I::description()));
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check_one::<S, I1>(state, &mut violations);
        check_one::<S, I2>(state, &mut violations);
        collect(violations)
    }
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        check_one::<S, I1>(state, &mut violations);
        check_one::<S, I2>(state, &mut violations);
        check_one::<S, I3>(state, &mut violations);
        check_one::<S, I4>(state, &mut violations);
        collect(violations)
    }
}

/// Every invariant of the game-state aggregate.
pub type GameInvariants = (
    BoardMatchesLedgerInvariant,
    ResolutionWithinCandidatesInvariant,
    EntanglementsConsistentInvariant,
    SequenceNumbersInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameState, Player, QuantumGame};

    #[test]
    fn test_invariant_set_holds_for_empty_game() {
        assert!(GameInvariants::check_all(&GameState::new()).is_ok());
    }

    #[test]
    fn test_invariant_set_holds_after_cycle_and_collapse() {
        let mut game = QuantumGame::new();
        game.make_move(0, 4).unwrap();
        game.make_move(4, 8).unwrap();
        let outcome = game.make_move(8, 0).unwrap();
        let option = outcome.collapse_options[0].clone();
        game.apply_collapse_choice(option.assignments()).unwrap();
        assert!(GameInvariants::check_all(game.state()).is_ok());
    }

    #[test]
    fn test_invariant_set_detects_violations() {
        let mut game = QuantumGame::new();
        game.make_move(0, 4).unwrap();
        let mut state = game.state().clone();
        state.board_mut().occupy(7, Player::O);

        let violations = GameInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].description.contains("Board"));
    }

    #[test]
    fn test_two_invariants_as_set() {
        type TwoInvariants = (BoardMatchesLedgerInvariant, SequenceNumbersInvariant);
        assert!(TwoInvariants::check_all(&GameState::new()).is_ok());
    }
}
