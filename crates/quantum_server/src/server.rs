//! HTTP routes over the shared game.

use crate::config::ServerConfig;
use crate::responses::{
    CollapseRequest, CollapseResponse, EntanglementsResponse, Failure, MeasureRequest,
    MoveRequest, MoveResponse, MovesResponse, StateResponse, WinnerResponse,
};
use crate::session::GameHandle;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::Request;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tracing::{info, instrument, warn};

/// Builds the router for a game handle.
pub fn router(handle: GameHandle) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/game/new", post(new_game))
        .route("/game/state", get(game_state))
        .route("/game/move", post(make_move))
        .route("/game/collapse", post(collapse))
        .route("/game/measure", post(measure))
        .route("/game/winner", get(winner))
        .route("/game/entanglements", get(entanglements))
        .route("/game/moves", get(moves))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(handle)
}

/// Binds the configured address and serves until the process exits.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    let handle = GameHandle::new(config.game_config(), config.coin());
    let listener =
        tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(addr = %listener.local_addr()?, "Quantum tic-tac-toe server ready");
    axum::serve(listener, router(handle)).await?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "Quantum Tic-Tac-Toe API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "GET /": "API info",
            "GET /health": "Health check",
            "POST /game/new": "Start new game",
            "GET /game/state": "Get current game state",
            "POST /game/move": "Make quantum move",
            "POST /game/collapse": "Collapse quantum moves",
            "POST /game/measure": "Measure quantum moves with a fair coin",
            "GET /game/winner": "Check for winner",
            "GET /game/entanglements": "List entanglements",
            "GET /game/moves": "List moves",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn new_game(State(handle): State<GameHandle>) -> Json<StateResponse> {
    Json(StateResponse::new(handle.new_game()).with_message("New game started"))
}

async fn game_state(State(handle): State<GameHandle>) -> Json<StateResponse> {
    Json(StateResponse::new(handle.snapshot()))
}

async fn make_move(
    State(handle): State<GameHandle>,
    request: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, Failure> {
    let Json(request) = request.map_err(|e| reject(&handle, e))?;
    let (cell1, cell2) = request.cells().map_err(|e| reject(&handle, e))?;
    let outcome = handle
        .make_move(cell1, cell2)
        .map_err(|e| reject(&handle, e))?;
    info!(move_id = %outcome.placed.move_id(), cycle = outcome.cycle_detected, "Move made");
    Ok(Json(MoveResponse {
        success: true,
        outcome,
    }))
}

async fn collapse(
    State(handle): State<GameHandle>,
    request: Result<Json<CollapseRequest>, JsonRejection>,
) -> Result<Json<CollapseResponse>, Failure> {
    let Json(request) = request.map_err(|e| reject(&handle, e))?;
    let choice = request.choice().map_err(|e| reject(&handle, e))?;
    for entry in &choice.rejected {
        warn!(label = %entry.label, error = %entry.error, "Skipping collapse entry");
    }
    let outcome = handle
        .apply_collapse_choice(&choice.assignment)
        .map_err(|e| reject(&handle, e))?;
    info!(
        collapsed = outcome.collapse_results.len(),
        skipped = outcome.skipped.len() + choice.rejected.len(),
        "Collapse applied"
    );
    Ok(Json(CollapseResponse {
        success: true,
        rejected_entries: choice.rejected,
        outcome,
    }))
}

async fn measure(
    State(handle): State<GameHandle>,
    request: Result<Option<Json<MeasureRequest>>, JsonRejection>,
) -> Result<Json<CollapseResponse>, Failure> {
    let request = request
        .map_err(|e| reject(&handle, e))?
        .map(|Json(r)| r)
        .unwrap_or_default();
    let (move_ids, rejected) = request.move_ids().map_err(|e| reject(&handle, e))?;
    for entry in &rejected {
        warn!(label = %entry.label, error = %entry.error, "Skipping measurement entry");
    }
    let outcome = handle.measure(&move_ids).map_err(|e| reject(&handle, e))?;
    info!(collapsed = outcome.collapse_results.len(), "Moves measured");
    Ok(Json(CollapseResponse {
        success: true,
        rejected_entries: rejected,
        outcome,
    }))
}

async fn winner(State(handle): State<GameHandle>) -> Json<WinnerResponse> {
    Json(WinnerResponse {
        success: true,
        report: handle.query_winner(),
    })
}

async fn entanglements(State(handle): State<GameHandle>) -> Json<EntanglementsResponse> {
    let entanglements = handle.entanglements();
    Json(EntanglementsResponse {
        success: true,
        count: entanglements.len(),
        entanglements,
    })
}

async fn moves(State(handle): State<GameHandle>) -> Json<MovesResponse> {
    let moves = handle.moves();
    Json(MovesResponse {
        success: true,
        count: moves.len(),
        moves,
    })
}

fn reject(handle: &GameHandle, error: impl std::fmt::Display) -> Failure {
    warn!(error = %error, "Request rejected");
    Failure::new(error, handle.snapshot())
}
