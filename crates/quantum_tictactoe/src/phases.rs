//! Turn phases of a quantum tic-tac-toe game.

use super::Player;
use serde::{Deserialize, Serialize};

/// Who acts next, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", content = "player", rename_all = "snake_case")]
pub enum TurnPhase {
    /// The player places a quantum move.
    AwaitingMove(Player),
    /// A cycle formed; this player (the opponent of its creator) picks how it
    /// collapses.
    AwaitingCollapseChoice(Player),
    /// A winner or a draw was reached.
    GameOver,
}

impl TurnPhase {
    /// The phase of a new game.
    pub fn start() -> Self {
        TurnPhase::AwaitingMove(Player::X)
    }

    /// The player expected to act, if any.
    pub fn actor(&self) -> Option<Player> {
        match self {
            TurnPhase::AwaitingMove(p) | TurnPhase::AwaitingCollapseChoice(p) => Some(*p),
            TurnPhase::GameOver => None,
        }
    }

    /// Returns true once the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self, TurnPhase::GameOver)
    }
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnPhase::AwaitingMove(player) => write!(f, "{player} to move"),
            TurnPhase::AwaitingCollapseChoice(player) => {
                write!(f, "{player} to choose a collapse")
            }
            TurnPhase::GameOver => write!(f, "Game over"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(TurnPhase::AwaitingCollapseChoice(Player::O)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"phase": "awaiting_collapse_choice", "player": "O"})
        );
        let over = serde_json::to_value(TurnPhase::GameOver).unwrap();
        assert_eq!(over, serde_json::json!({"phase": "game_over"}));
    }
}
