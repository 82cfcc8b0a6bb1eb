//! Quantum tic-tac-toe engine.
//!
//! Each move marks two cells in superposition. Moves sharing a cell are
//! entangled; when entanglements close a cycle, the opponent of the player
//! who closed it chooses how the cycle collapses into classical marks.
//!
//! # Architecture
//!
//! - **Types**: board, players, move labels and quantum moves
//! - **Entanglement / Cycle**: graph of shared cells and cycle detection
//! - **Stems / Options**: collapse resolution and option generation
//! - **Rules**: win and draw evaluation with the simultaneous-win tie-break
//! - **Game**: the turn state machine tying it together
//!
//! # Example
//!
//! ```
//! use quantum_tictactoe::{Player, QuantumGame};
//!
//! let mut game = QuantumGame::new();
//! game.make_move(0, 4).unwrap();
//! game.make_move(4, 8).unwrap();
//! let outcome = game.make_move(8, 0).unwrap();
//! assert!(outcome.cycle_detected);
//! assert_eq!(outcome.collapse_chooser, Some(Player::O));
//!
//! let choice = outcome.collapse_options[0].clone();
//! game.apply_collapse_choice(choice.assignments()).unwrap();
//! assert!(game.state().moves().iter().all(|m| !m.is_quantum()));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod coin;
mod contracts;
mod cycle;
mod entanglement;
mod game;
mod invariants;
mod options;
mod phases;
mod rules;
mod state;
mod stems;
mod types;

// Crate-level exports - Core types
pub use types::{Board, CELL_COUNT, MoveId, Player, QuantumMove, Square};

// Crate-level exports - Errors
pub use action::{CollapseError, MoveError, MoveIdParseError, StemConflict};

// Crate-level exports - Game engine
pub use game::{
    CollapseCause, CollapseOutcome, CollapseRecord, GameConfig, MoveOutcome, QuantumGame, Scores,
    WinnerReport,
};
pub use phases::TurnPhase;
pub use state::{EntanglementRecord, GameSnapshot, GameState};

// Crate-level exports - Algorithms
pub use cycle::{Cycle, EntanglementGraph, detect_cycles};
pub use entanglement::{Entanglement, detect as detect_entanglements};
pub use options::{
    CollapseOption, DEFAULT_MAX_OPTIONS, enumerate_assignments, generate_options, select_diverse,
};
pub use rules::{
    LINES, LineWin, Victory, check_winner, has_room_for_move, is_draw, is_full, winning_lines,
};
pub use stems::{StemPlan, StemResolution, cycle_cells, resolve_stems};

// Crate-level exports - Randomness
pub use coin::{FairCoin, RandomCoin, ScriptedCoin};

// Crate-level exports - Validation
pub use contracts::{Contract, Placement, PlacementContract};
pub use invariants::{GameInvariants, Invariant, InvariantSet, InvariantViolation};
