//! The single shared game behind the HTTP boundary.

use quantum_tictactoe::{
    CollapseError, CollapseOutcome, EntanglementRecord, FairCoin, GameConfig, GameSnapshot,
    MoveError, MoveId, MoveOutcome, QuantumGame, QuantumMove, WinnerReport,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

/// Game plus the coin used to measure it.
struct GameSession {
    game: QuantumGame,
    coin: Box<dyn FairCoin + Send>,
}

/// Cloneable handle to the one game the server hosts.
///
/// Every operation holds the lock for its whole duration, so mutations of
/// the move ledger, entanglements and board never interleave.
#[derive(Clone)]
pub struct GameHandle {
    session: Arc<Mutex<GameSession>>,
}

impl GameHandle {
    /// Creates a handle around a fresh game.
    pub fn new(config: GameConfig, coin: impl FairCoin + Send + 'static) -> Self {
        Self {
            session: Arc::new(Mutex::new(GameSession {
                game: QuantumGame::with_config(config),
                coin: Box::new(coin),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GameSession> {
        // Poisoned by a panicking request: keep serving the last state.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the game with a new one.
    #[instrument(skip(self))]
    pub fn new_game(&self) -> GameSnapshot {
        self.lock().game.new_game()
    }

    /// Current state.
    pub fn snapshot(&self) -> GameSnapshot {
        self.lock().game.snapshot()
    }

    /// Places a quantum move for whoever is to move.
    #[instrument(skip(self))]
    pub fn make_move(&self, cell1: usize, cell2: usize) -> Result<MoveOutcome, MoveError> {
        self.lock().game.make_move(cell1, cell2)
    }

    /// Applies a chosen collapse.
    #[instrument(skip(self, choice))]
    pub fn apply_collapse_choice(
        &self,
        choice: &BTreeMap<MoveId, usize>,
    ) -> Result<CollapseOutcome, CollapseError> {
        self.lock().game.apply_collapse_choice(choice)
    }

    /// Measures moves with the session coin.
    #[instrument(skip(self))]
    pub fn measure(&self, move_ids: &[MoveId]) -> Result<CollapseOutcome, CollapseError> {
        let mut guard = self.lock();
        let GameSession { game, coin } = &mut *guard;
        debug!("Measuring with session coin");
        game.measure(move_ids, &mut &mut **coin)
    }

    /// Winner, draw and scores.
    pub fn query_winner(&self) -> WinnerReport {
        self.lock().game.query_winner()
    }

    /// Every recorded entanglement.
    pub fn entanglements(&self) -> Vec<EntanglementRecord> {
        let guard = self.lock();
        let state = guard.game.state();
        state
            .entanglements()
            .iter()
            .filter_map(|e| EntanglementRecord::from_entanglement(e, state.moves()))
            .collect()
    }

    /// The move ledger.
    pub fn moves(&self) -> Vec<QuantumMove> {
        self.lock().game.state().moves().clone()
    }
}
