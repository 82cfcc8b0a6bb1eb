//! Request and response bodies of the HTTP API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use quantum_tictactoe::{
    CELL_COUNT, CollapseOutcome, EntanglementRecord, GameSnapshot, MoveId, MoveOutcome,
    QuantumMove, WinnerReport,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /game/move`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveRequest {
    /// First candidate cell.
    pub square1: i64,
    /// Second candidate cell.
    pub square2: i64,
}

impl MoveRequest {
    /// Checks both squares are on the board and distinct.
    pub fn cells(&self) -> Result<(usize, usize), String> {
        let on_board = |value: i64| {
            usize::try_from(value)
                .ok()
                .filter(|&cell| cell < CELL_COUNT)
        };
        match (on_board(self.square1), on_board(self.square2)) {
            (Some(a), Some(b)) if a == b => Err("Squares must be different".to_string()),
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(format!("Squares must be between 0 and {}", CELL_COUNT - 1)),
        }
    }
}

/// Body of `POST /game/collapse`, e.g. `{"collapse_option": {"X1": 0}}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollapseRequest {
    /// Chosen cell per move label.
    #[serde(default)]
    pub collapse_option: BTreeMap<String, i64>,
}

impl CollapseRequest {
    /// Parses labels and cells.
    ///
    /// Entries with an unreadable label or a negative cell are set aside and
    /// the rest still go to the game. Only an empty option is an error.
    pub fn choice(&self) -> Result<CollapseChoice, String> {
        if self.collapse_option.is_empty() {
            return Err("Must provide collapse option".to_string());
        }
        let mut choice = CollapseChoice::default();
        for (label, &cell) in &self.collapse_option {
            let parsed = label
                .parse::<MoveId>()
                .map_err(|e| e.to_string())
                .and_then(|move_id| {
                    usize::try_from(cell)
                        .map(|cell| (move_id, cell))
                        .map_err(|_| format!("Invalid cell {} for {}", cell, move_id))
                });
            match parsed {
                Ok((move_id, cell)) => {
                    choice.assignment.insert(move_id, cell);
                }
                Err(error) => choice.rejected.push(RejectedEntry {
                    label: label.clone(),
                    cell: Some(cell),
                    error,
                }),
            }
        }
        Ok(choice)
    }
}

/// A collapse request split into entries for the game and entries dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseChoice {
    /// Well-formed entries.
    pub assignment: BTreeMap<MoveId, usize>,
    /// Entries that never reached the game.
    pub rejected: Vec<RejectedEntry>,
}

/// A request entry dropped before reaching the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedEntry {
    /// Label as sent.
    pub label: String,
    /// Cell as sent, for collapse entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<i64>,
    /// Why it was dropped.
    pub error: String,
}

/// Body of `POST /game/measure`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MeasureRequest {
    /// Moves to measure. Empty measures the pending cycle.
    #[serde(default)]
    pub move_ids: Vec<String>,
}

impl MeasureRequest {
    /// Parses the labels, setting unreadable ones aside.
    ///
    /// Fails when labels were given but none of them parse, so the request
    /// never falls through to measuring the pending cycle.
    pub fn move_ids(&self) -> Result<(Vec<MoveId>, Vec<RejectedEntry>), String> {
        let mut ids = Vec::new();
        let mut rejected = Vec::new();
        for label in &self.move_ids {
            match label.parse::<MoveId>() {
                Ok(move_id) => ids.push(move_id),
                Err(e) => rejected.push(RejectedEntry {
                    label: label.clone(),
                    cell: None,
                    error: e.to_string(),
                }),
            }
        }
        if ids.is_empty() && !rejected.is_empty() {
            return Err("No valid move ids to measure".to_string());
        }
        Ok((ids, rejected))
    }
}

/// Snapshot with an optional message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    /// Always true.
    pub success: bool,
    /// Human-readable note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Current state.
    pub game_state: GameSnapshot,
}

impl StateResponse {
    /// Wraps a snapshot.
    pub fn new(game_state: GameSnapshot) -> Self {
        Self {
            success: true,
            message: None,
            game_state,
        }
    }

    /// Adds a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Result of a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveResponse {
    /// Always true.
    pub success: bool,
    /// Move details.
    #[serde(flatten)]
    pub outcome: MoveOutcome,
}

/// Result of a collapse or measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapseResponse {
    /// Always true.
    pub success: bool,
    /// Request entries dropped before reaching the game.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_entries: Vec<RejectedEntry>,
    /// Collapse details.
    #[serde(flatten)]
    pub outcome: CollapseOutcome,
}

/// Winner query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerResponse {
    /// Always true.
    pub success: bool,
    /// Winner details.
    #[serde(flatten)]
    pub report: WinnerReport,
}

/// Entanglement listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntanglementsResponse {
    /// Always true.
    pub success: bool,
    /// Every recorded entanglement.
    pub entanglements: Vec<EntanglementRecord>,
    /// Number of entanglements.
    pub count: usize,
}

/// Move ledger listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovesResponse {
    /// Always true.
    pub success: bool,
    /// Every move, quantum or collapsed.
    pub moves: Vec<QuantumMove>,
    /// Number of moves.
    pub count: usize,
}

/// A rejected request: HTTP 400 with the error and the unchanged state.
#[derive(Debug, Clone, Display, Serialize, Deserialize)]
#[display("{}", error)]
pub struct Failure {
    /// Always false.
    pub success: bool,
    /// Why the request failed.
    pub error: String,
    /// State after the (rejected) request.
    pub game_state: GameSnapshot,
}

impl Failure {
    /// Builds a failure from any displayable error.
    pub fn new(error: impl std::fmt::Display, game_state: GameSnapshot) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            game_state,
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}
