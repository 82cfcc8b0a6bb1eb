//! Quantum tic-tac-toe game engine.
//!
//! A move flows through placement, entanglement tracking and cycle
//! detection. When a cycle closes, the opponent of its creator picks how it
//! collapses; the collapse then forces any stems and the board is scored.

use crate::action::{CollapseError, MoveError, StemConflict};
use crate::coin::FairCoin;
#[cfg(debug_assertions)]
use crate::contracts::{Contract, PlacementContract};
use crate::cycle::detect_cycles;
use crate::entanglement;
#[cfg(debug_assertions)]
use crate::invariants::{GameInvariants, InvariantSet};
use crate::options::{CollapseOption, DEFAULT_MAX_OPTIONS, generate_options, uncollapsed_indices};
use crate::phases::TurnPhase;
use crate::rules::{Victory, check_winner, has_room_for_move};
use crate::state::{EntanglementRecord, GameSnapshot, GameState};
use crate::stems::resolve_stems;
use crate::types::{Board, MoveId, Player, QuantumMove};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(debug_assertions)]
use tracing::error;
use tracing::{debug, info, instrument, warn};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    max_options: usize,
}

impl GameConfig {
    /// Settings showing at most `max_options` collapse options (minimum 1).
    pub fn new(max_options: usize) -> Self {
        Self {
            max_options: max_options.max(1),
        }
    }

    /// Upper bound on options presented for a cycle.
    pub fn max_options(&self) -> usize {
        self.max_options
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OPTIONS)
    }
}

/// Result of a successful quantum move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// The move just placed.
    #[serde(rename = "move")]
    pub placed: QuantumMove,
    /// Entanglements this move created.
    pub new_entanglements: Vec<EntanglementRecord>,
    /// A cycle closed.
    pub cycle_detected: bool,
    /// Moves of the cycle the game now waits on.
    pub cycle: Vec<MoveId>,
    /// Player whose move closed the cycle.
    pub cycle_creator: Option<Player>,
    /// Player who must choose the collapse.
    pub collapse_chooser: Option<Player>,
    /// Choices offered to the chooser.
    pub collapse_options: Vec<CollapseOption>,
    /// State after the move.
    pub game_state: GameSnapshot,
}

/// Why a move collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseCause {
    /// Picked by the chooser.
    Chosen,
    /// Decided by the fair coin.
    Measured,
    /// Forced as a stem of the resolved cycle.
    Stem,
}

/// One applied collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapseRecord {
    /// Collapsed move.
    pub move_id: MoveId,
    /// Cell it landed in.
    pub cell: usize,
    /// How the cell was decided.
    pub cause: CollapseCause,
}

/// Points after a game: 1 for the winner, 0.5 for the loser of a
/// simultaneous win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// X's points.
    pub x: f32,
    /// O's points.
    pub o: f32,
}

impl From<Option<Victory>> for Scores {
    fn from(victory: Option<Victory>) -> Self {
        victory.map_or_else(Scores::default, |v| Scores {
            x: v.points(Player::X),
            o: v.points(Player::O),
        })
    }
}

/// Winner and draw status of the classical board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerReport {
    /// Player credited with the full point.
    pub winner: Option<Player>,
    /// No winner and fewer than two empty cells.
    pub is_draw: bool,
    /// Winner or draw.
    pub game_over: bool,
    /// Classical board.
    pub board: Board,
    /// Line that decided the game.
    pub winning_line: Option<[usize; 3]>,
    /// Both players completed a line.
    pub simultaneous: bool,
    /// Points per player.
    pub scores: Scores,
}

/// Result of applying a collapse choice or a measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseOutcome {
    /// Final cell of every move collapsed by this request, stems included.
    pub collapse_results: BTreeMap<MoveId, usize>,
    /// The same collapses in the order applied, with their cause.
    pub collapsed: Vec<CollapseRecord>,
    /// Entries that were not applied.
    pub skipped: Vec<CollapseError>,
    /// Complex stems left in superposition.
    pub unresolved_stems: Vec<MoveId>,
    /// Stems with no free cell.
    pub stem_conflicts: Vec<StemConflict>,
    /// Board status after the collapse.
    pub winner: WinnerReport,
    /// State after the collapse.
    pub game_state: GameSnapshot,
}

/// Quantum tic-tac-toe game engine.
///
/// Owns one game. The caller serializes access; nothing here is shared.
#[derive(Debug, Clone, Default)]
pub struct QuantumGame {
    state: GameState,
    config: GameConfig,
}

impl QuantumGame {
    /// Creates a new game with default settings.
    #[instrument]
    pub fn new() -> Self {
        Self::with_config(GameConfig::default())
    }

    /// Creates a new game with the given settings.
    #[instrument]
    pub fn with_config(config: GameConfig) -> Self {
        Self {
            state: GameState::new(),
            config,
        }
    }

    /// Discards the current game and starts over.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) -> GameSnapshot {
        self.state = GameState::new();
        info!("New game started");
        self.snapshot()
    }

    /// Returns the current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the engine settings.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot(self.config.max_options())
    }

    /// Options for the pending cycle, if any.
    pub fn collapse_options(&self) -> Vec<CollapseOption> {
        self.state
            .pending_cycle()
            .as_ref()
            .map(|cycle| self.options_for(cycle))
            .unwrap_or_default()
    }

    /// Options covering every uncollapsed move.
    pub fn all_collapse_options(&self) -> Vec<CollapseOption> {
        self.options_for(&uncollapsed_indices(self.state.moves()))
    }

    fn options_for(&self, targets: &[usize]) -> Vec<CollapseOption> {
        generate_options(
            self.state.moves(),
            targets,
            self.state.board(),
            self.config.max_options(),
        )
    }

    /// Places a quantum move for the current player across two cells.
    #[instrument(skip(self), fields(player = %self.state.current_player()))]
    pub fn make_move(&mut self, cell1: usize, cell2: usize) -> Result<MoveOutcome, MoveError> {
        #[cfg(debug_assertions)]
        let before = self.state.clone();

        let index = self.state.place(cell1, cell2)?;
        let moves = self.state.moves();
        let placed = moves[index].clone();
        let mover = placed.player();

        let found = entanglement::detect(index, moves);
        let new_entanglements: Vec<EntanglementRecord> = found
            .iter()
            .filter_map(|e| EntanglementRecord::from_entanglement(e, moves))
            .collect();
        self.state.record_entanglements(&found);

        let cycles = detect_cycles(self.state.moves(), self.state.entanglements());
        let outcome = match cycles.into_iter().next() {
            Some(cycle) => {
                let chooser = mover.opponent();
                let collapse_options = self.options_for(&cycle);
                info!(
                    creator = %mover,
                    %chooser,
                    cycle_len = cycle.len(),
                    options = collapse_options.len(),
                    "Cycle detected"
                );
                self.state.set_pending_cycle(Some(cycle));
                self.state.set_phase(TurnPhase::AwaitingCollapseChoice(chooser));
                MoveOutcome {
                    placed,
                    new_entanglements,
                    cycle_detected: true,
                    cycle: self.state.pending_cycle_ids(),
                    cycle_creator: Some(mover),
                    collapse_chooser: Some(chooser),
                    collapse_options,
                    game_state: self.snapshot(),
                }
            }
            None => {
                self.state.set_phase(TurnPhase::AwaitingMove(mover.opponent()));
                MoveOutcome {
                    placed,
                    new_entanglements,
                    cycle_detected: false,
                    cycle: Vec::new(),
                    cycle_creator: None,
                    collapse_chooser: None,
                    collapse_options: Vec::new(),
                    game_state: self.snapshot(),
                }
            }
        };

        #[cfg(debug_assertions)]
        if let Err(violations) = PlacementContract::post(&before, &self.state) {
            error!(?violations, "Postcondition failed after move");
        }

        Ok(outcome)
    }

    /// Collapses moves into the chosen cells.
    ///
    /// Entries that cannot apply (unknown move, already collapsed, cell not a
    /// candidate or already taken) are skipped and reported; the rest still
    /// apply. Stems of the pending cycle are then forced and the board is
    /// scored. Only a finished game rejects the whole request.
    #[instrument(skip(self, assignment), fields(entries = assignment.len()))]
    pub fn apply_collapse_choice(
        &mut self,
        assignment: &BTreeMap<MoveId, usize>,
    ) -> Result<CollapseOutcome, CollapseError> {
        if self.state.phase().is_over() {
            warn!("Collapse requested after game over");
            return Err(CollapseError::GameOver);
        }

        let mut collapsed = Vec::new();
        let mut skipped = Vec::new();
        for (&move_id, &cell) in assignment {
            match self.state.resolve(move_id, cell) {
                Ok(()) => collapsed.push(CollapseRecord {
                    move_id,
                    cell,
                    cause: CollapseCause::Chosen,
                }),
                Err(e @ CollapseError::AlreadyCollapsed { .. }) => {
                    debug!(error = %e, "Skipping collapse entry");
                    skipped.push(e);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping collapse entry");
                    skipped.push(e);
                }
            }
        }

        Ok(self.finish_collapse(collapsed, skipped))
    }

    /// Collapses moves by flipping the coin for each.
    ///
    /// An empty list measures every move of the pending cycle. A flip that
    /// lands on a taken cell uses the move's other candidate instead.
    #[instrument(skip(self, coin))]
    pub fn measure<C: FairCoin>(
        &mut self,
        move_ids: &[MoveId],
        coin: &mut C,
    ) -> Result<CollapseOutcome, CollapseError> {
        if self.state.phase().is_over() {
            warn!("Measurement requested after game over");
            return Err(CollapseError::GameOver);
        }

        let targets = if move_ids.is_empty() {
            self.state.pending_cycle_ids()
        } else {
            move_ids.to_vec()
        };

        let mut collapsed = Vec::new();
        let mut skipped = Vec::new();
        for move_id in targets {
            let Some(mv) = self.state.find_move(&move_id) else {
                skipped.push(CollapseError::UnknownMove { move_id });
                continue;
            };
            if !mv.is_quantum() {
                skipped.push(CollapseError::AlreadyCollapsed { move_id });
                continue;
            }

            let flipped = coin.pick(*mv.cells());
            let board = self.state.board();
            let cell = if board.is_occupied(flipped) {
                mv.other_cell(flipped).filter(|&c| !board.is_occupied(c))
            } else {
                Some(flipped)
            };
            debug!(%move_id, flipped, ?cell, "Measured move");

            let Some(cell) = cell else {
                let err = CollapseError::CellOccupied {
                    move_id,
                    cell: flipped,
                };
                warn!(error = %err, "Skipping measurement");
                skipped.push(err);
                continue;
            };
            match self.state.resolve(move_id, cell) {
                Ok(()) => collapsed.push(CollapseRecord {
                    move_id,
                    cell,
                    cause: CollapseCause::Measured,
                }),
                Err(e) => skipped.push(e),
            }
        }

        Ok(self.finish_collapse(collapsed, skipped))
    }

    /// Forces stems, scores the board and moves the turn along.
    fn finish_collapse(
        &mut self,
        mut collapsed: Vec<CollapseRecord>,
        skipped: Vec<CollapseError>,
    ) -> CollapseOutcome {
        let mut unresolved_stems = Vec::new();
        let mut stem_conflicts = Vec::new();

        // Nothing applied: leave the state exactly as it was.
        if !collapsed.is_empty() {
            if let Some(cycle) = self.state.pending_cycle().clone() {
                let plan = resolve_stems(self.state.moves(), &cycle, self.state.board());
                for res in &plan.resolutions {
                    let move_id = *self.state.moves()[res.index].move_id();
                    if self.state.resolve(move_id, res.cell).is_ok() {
                        collapsed.push(CollapseRecord {
                            move_id,
                            cell: res.cell,
                            cause: CollapseCause::Stem,
                        });
                    }
                }
                unresolved_stems = plan
                    .complex
                    .iter()
                    .map(|&idx| *self.state.moves()[idx].move_id())
                    .collect();
                stem_conflicts = plan.conflicts;
            }
            self.advance_turn();

            #[cfg(debug_assertions)]
            if let Err(violations) = GameInvariants::check_all(&self.state) {
                error!(?violations, "Invariant violated after collapse");
            }
        }

        let collapse_results = collapsed.iter().map(|r| (r.move_id, r.cell)).collect();
        CollapseOutcome {
            collapse_results,
            collapsed,
            skipped,
            unresolved_stems,
            stem_conflicts,
            winner: self.query_winner(),
            game_state: self.snapshot(),
        }
    }

    /// Re-evaluates the board after a collapse and sets the next phase.
    ///
    /// The player waiting on the collapse moves next. A cycle that survives
    /// the collapse keeps them choosing instead.
    fn advance_turn(&mut self) {
        let next = *self.state.current_player();
        let victory = check_winner(self.state.board(), self.state.moves());
        let board_full = !has_room_for_move(self.state.board());

        if victory.is_some() || board_full {
            info!(winner = ?victory.map(|v| v.winner), "Game over");
            self.state.set_pending_cycle(None);
            self.state.set_phase(TurnPhase::GameOver);
            return;
        }

        match detect_cycles(self.state.moves(), self.state.entanglements())
            .into_iter()
            .next()
        {
            Some(cycle) => {
                info!(chooser = %next, "Cycle still open after collapse");
                self.state.set_pending_cycle(Some(cycle));
                self.state.set_phase(TurnPhase::AwaitingCollapseChoice(next));
            }
            None => {
                self.state.set_pending_cycle(None);
                self.state.set_phase(TurnPhase::AwaitingMove(next));
            }
        }
    }

    /// Winner, draw and scores of the classical board.
    #[instrument(skip(self))]
    pub fn query_winner(&self) -> WinnerReport {
        let board = self.state.board();
        let victory = check_winner(board, self.state.moves());
        let is_draw = victory.is_none() && !has_room_for_move(board);
        WinnerReport {
            winner: victory.map(|v| v.winner),
            is_draw,
            game_over: victory.is_some() || is_draw,
            board: board.clone(),
            winning_line: victory.map(|v| v.winning_line),
            simultaneous: victory.is_some_and(|v| v.simultaneous),
            scores: Scores::from(victory),
        }
    }
}
