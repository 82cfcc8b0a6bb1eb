//! The game-state aggregate: move ledger, entanglement record, board, turn.

use crate::action::{CollapseError, MoveError};
use crate::contracts::{Contract, Placement, PlacementContract};
use crate::cycle::Cycle;
use crate::entanglement::Entanglement;
use crate::options::{CollapseOption, generate_options};
use crate::phases::TurnPhase;
use crate::types::{Board, MoveId, Player, QuantumMove};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Complete state of one game.
///
/// The ledger is append-only and in chronological order. The board changes
/// only when a move collapses.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameState {
    /// Every move placed, quantum or collapsed.
    moves: Vec<QuantumMove>,
    /// Every entanglement ever recorded, including inert ones.
    entanglements: Vec<Entanglement>,
    /// The classical board.
    board: Board,
    /// Whose turn it is and what they must do.
    phase: TurnPhase,
    /// Player who acts next (or would have, once the game is over).
    current_player: Player,
    /// Number of moves placed.
    move_count: usize,
    /// Cycle awaiting a collapse choice.
    pending_cycle: Option<Cycle>,
}

impl GameState {
    /// Creates an empty game with X to move.
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            entanglements: Vec::new(),
            board: Board::new(),
            phase: TurnPhase::start(),
            current_player: Player::X,
            move_count: 0,
            pending_cycle: None,
        }
    }

    /// Looks a move up by label.
    pub fn find_move(&self, move_id: &MoveId) -> Option<&QuantumMove> {
        self.moves.iter().find(|m| m.move_id() == move_id)
    }

    /// Labels of the moves in the pending cycle.
    pub fn pending_cycle_ids(&self) -> Vec<MoveId> {
        self.pending_cycle
            .iter()
            .flatten()
            .filter_map(|&idx| self.moves.get(idx).map(|m| *m.move_id()))
            .collect()
    }

    /// Sequence number the player's next move will get.
    fn next_seq(&self, player: Player) -> u32 {
        let made = self.moves.iter().filter(|m| m.player() == player).count();
        made as u32 + 1
    }

    /// Places a quantum move for the current player.
    ///
    /// Validates before touching anything, so a rejected move leaves the
    /// state as it was. Returns the new move's ledger index.
    #[instrument(skip(self), fields(player = %self.current_player))]
    pub(crate) fn place(&mut self, cell1: usize, cell2: usize) -> Result<usize, MoveError> {
        let placement = Placement {
            cells: [cell1, cell2],
        };
        PlacementContract::pre(self, &placement)?;

        let player = self.current_player;
        let move_id = MoveId::new(player, self.next_seq(player));
        self.moves.push(QuantumMove::new(move_id, placement.cells));
        self.move_count += 1;

        info!(%move_id, cell1, cell2, "Quantum move placed");
        Ok(self.moves.len() - 1)
    }

    /// Collapses a move into `cell` and writes the board in the same step.
    #[instrument(skip(self))]
    pub(crate) fn resolve(&mut self, move_id: MoveId, cell: usize) -> Result<(), CollapseError> {
        let occupied = self.board.is_occupied(cell);
        let Some(mv) = self.moves.iter_mut().find(|m| *m.move_id() == move_id) else {
            return Err(CollapseError::UnknownMove { move_id });
        };
        if !mv.is_quantum() {
            return Err(CollapseError::AlreadyCollapsed { move_id });
        }
        if !mv.has_cell(cell) {
            return Err(CollapseError::NotACandidate { move_id, cell });
        }
        if occupied {
            return Err(CollapseError::CellOccupied { move_id, cell });
        }

        mv.collapse_to(cell);
        let player = mv.player();
        self.board.occupy(cell, player);
        info!(%move_id, cell, "Move collapsed");
        Ok(())
    }

    pub(crate) fn record_entanglements(&mut self, found: &[Entanglement]) {
        self.entanglements.extend_from_slice(found);
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        if let Some(actor) = phase.actor() {
            self.current_player = actor;
        }
        self.phase = phase;
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn set_pending_cycle(&mut self, cycle: Option<Cycle>) {
        self.pending_cycle = cycle;
    }

    /// Serializable view, with options regenerated for any pending cycle.
    pub fn snapshot(&self, max_options: usize) -> GameSnapshot {
        let collapse_options = self
            .pending_cycle
            .as_ref()
            .map(|cycle| generate_options(&self.moves, cycle, &self.board, max_options))
            .unwrap_or_default();

        GameSnapshot {
            moves: self.moves.clone(),
            entanglements: self
                .entanglements
                .iter()
                .filter_map(|e| EntanglementRecord::from_entanglement(e, &self.moves))
                .collect(),
            board: self.board.clone(),
            current_player: self.current_player,
            phase: self.phase,
            move_count: self.move_count,
            pending_cycle: self.pending_cycle_ids(),
            collapse_options,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// An entanglement with move labels instead of ledger indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntanglementRecord {
    /// The move already on the board.
    pub move1_id: MoveId,
    /// The move that created the entanglement.
    pub move2_id: MoveId,
    /// The cell both contain.
    pub shared_cell: usize,
}

impl EntanglementRecord {
    /// Resolves ledger indices to labels.
    pub fn from_entanglement(ent: &Entanglement, moves: &[QuantumMove]) -> Option<Self> {
        Some(Self {
            move1_id: *moves.get(ent.existing)?.move_id(),
            move2_id: *moves.get(ent.placed)?.move_id(),
            shared_cell: ent.cell,
        })
    }
}

/// Plain view of the whole game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Move ledger in chronological order.
    pub moves: Vec<QuantumMove>,
    /// Every recorded entanglement.
    pub entanglements: Vec<EntanglementRecord>,
    /// Classical board.
    pub board: Board,
    /// Player who acts next.
    pub current_player: Player,
    /// Turn phase.
    pub phase: TurnPhase,
    /// Moves placed so far.
    pub move_count: usize,
    /// Moves of the cycle awaiting a collapse choice.
    pub pending_cycle: Vec<MoveId>,
    /// Options for the pending cycle.
    pub collapse_options: Vec<CollapseOption>,
}
