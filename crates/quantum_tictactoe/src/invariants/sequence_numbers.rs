//! Per-player sequence numbers count up from 1 in ledger order.

use super::Invariant;
use crate::{GameState, Player};

/// Invariant: each player's moves are numbered 1, 2, 3... in the order they
/// were placed, and the move counter matches the ledger.
pub struct SequenceNumbersInvariant;

impl Invariant<GameState> for SequenceNumbersInvariant {
    fn holds(state: &GameState) -> bool {
        let mut next = [1u32, 1u32];
        for mv in state.moves() {
            let slot = match mv.player() {
                Player::X => 0,
                Player::O => 1,
            };
            if mv.move_id().seq() != next[slot] {
                return false;
            }
            next[slot] += 1;
        }
        *state.move_count() == state.moves().len()
    }

    fn description() -> &'static str {
        "Per-player sequence numbers are contiguous from 1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuantumGame;

    #[test]
    fn test_labels_follow_each_player() {
        let mut game = QuantumGame::new();
        game.make_move(0, 1).unwrap();
        game.make_move(2, 3).unwrap();
        game.make_move(5, 6).unwrap();
        let labels: Vec<String> = game
            .state()
            .moves()
            .iter()
            .map(|m| m.move_id().to_string())
            .collect();
        assert_eq!(labels, vec!["X1", "O1", "X2"]);
        assert!(SequenceNumbersInvariant::holds(game.state()));
    }
}
