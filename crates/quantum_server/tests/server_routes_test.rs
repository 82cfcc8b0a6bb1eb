//! In-process tests for the HTTP routes.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quantum_server::{GameHandle, router};
use quantum_tictactoe::{GameConfig, ScriptedCoin};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(coin: ScriptedCoin) -> Router {
    router(GameHandle::new(GameConfig::default(), coin))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn play_triangle(app: &Router) -> Value {
    send(app, "POST", "/game/move", Some(json!({"square1": 0, "square2": 4}))).await;
    send(app, "POST", "/game/move", Some(json!({"square1": 4, "square2": 8}))).await;
    let (status, body) =
        send(app, "POST", "/game/move", Some(json!({"square1": 8, "square2": 0}))).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_health_and_info() {
    let app = app(ScriptedCoin::default());
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["POST /game/measure"].is_string());
}

#[tokio::test]
async fn test_move_reports_entanglements_and_cycle() {
    let app = app(ScriptedCoin::default());
    let body = play_triangle(&app).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["move"]["move_id"], "X2");
    assert_eq!(body["cycle_detected"], true);
    assert_eq!(body["collapse_chooser"], "O");
    assert_eq!(body["new_entanglements"].as_array().unwrap().len(), 2);
    assert_eq!(body["collapse_options"].as_array().unwrap().len(), 2);
    assert_eq!(body["game_state"]["phase"]["phase"], "awaiting_collapse_choice");

    let (_, ents) = send(&app, "GET", "/game/entanglements", None).await;
    assert_eq!(ents["count"], 3);
    assert_eq!(
        ents["entanglements"][0],
        json!({"move1_id": "X1", "move2_id": "O1", "shared_cell": 4})
    );

    let (_, moves) = send(&app, "GET", "/game/moves", None).await;
    assert_eq!(moves["count"], 3);
}

#[tokio::test]
async fn test_invalid_squares_are_rejected() {
    let app = app(ScriptedCoin::default());

    let (status, body) =
        send(&app, "POST", "/game/move", Some(json!({"square1": -1, "square2": 4}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Squares must be between 0 and 8");
    assert_eq!(body["game_state"]["move_count"], 0);

    let (status, body) =
        send(&app, "POST", "/game/move", Some(json!({"square1": 3, "square2": 3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Squares must be different");
}

#[tokio::test]
async fn test_collapse_choice_applies() {
    let app = app(ScriptedCoin::default());
    let body = play_triangle(&app).await;
    let option = body["collapse_options"][0].clone();

    let (status, result) = send(
        &app,
        "POST",
        "/game/collapse",
        Some(json!({"collapse_option": option})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(result["collapse_results"], option);
    assert_eq!(result["game_state"]["current_player"], "O");

    let (_, winner) = send(&app, "GET", "/game/winner", None).await;
    assert_eq!(winner["game_over"], false);
    assert_eq!(winner["winner"], Value::Null);
}

#[tokio::test]
async fn test_empty_collapse_is_rejected() {
    let app = app(ScriptedCoin::default());
    play_triangle(&app).await;

    let (status, body) =
        send(&app, "POST", "/game/collapse", Some(json!({"collapse_option": {}}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Must provide collapse option");
    assert_eq!(body["game_state"]["pending_cycle"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_move_while_collapse_pending_is_rejected() {
    let app = app(ScriptedCoin::default());
    play_triangle(&app).await;

    let (status, body) =
        send(&app, "POST", "/game/move", Some(json!({"square1": 1, "square2": 2}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["game_state"]["move_count"], 3);
}

#[tokio::test]
async fn test_measure_pending_cycle_with_coin() {
    let app = app(ScriptedCoin::new([false, false, false]));
    play_triangle(&app).await;

    let (status, body) = send(&app, "POST", "/game/measure", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collapse_results"], json!({"X1": 0, "O1": 4, "X2": 8}));
}

#[tokio::test]
async fn test_new_game_resets_state() {
    let app = app(ScriptedCoin::default());
    play_triangle(&app).await;

    let (status, body) = send(&app, "POST", "/game/new", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "New game started");
    assert_eq!(body["game_state"]["move_count"], 0);

    let (_, state) = send(&app, "GET", "/game/state", None).await;
    assert_eq!(state["game_state"]["current_player"], "X");
}

#[tokio::test]
async fn test_collapse_mixed_batch_applies_good_entries() {
    let app = app(ScriptedCoin::default());
    play_triangle(&app).await;

    let (status, result) = send(
        &app,
        "POST",
        "/game/collapse",
        Some(json!({"collapse_option": {"X1": 0, "O1": -1, "Z9": 4, "O7": 4}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["success"], true);
    assert_eq!(result["collapse_results"]["X1"], 0);

    let rejected = result["rejected_entries"].as_array().unwrap();
    let labels: Vec<&str> = rejected
        .iter()
        .map(|entry| entry["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["O1", "Z9"]);
    assert_eq!(rejected[0]["error"], "Invalid cell -1 for O1");
    assert!(
        result["skipped"]
            .as_array()
            .unwrap()
            .contains(&json!({"reason": "unknown_move", "move_id": "O7"}))
    );
}

#[tokio::test]
async fn test_malformed_bodies_get_structured_failures() {
    let app = app(ScriptedCoin::default());

    let (status, body) = send(
        &app,
        "POST",
        "/game/move",
        Some(json!({"square1": "a", "square2": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Failed to deserialize")
    );
    assert_eq!(body["game_state"]["move_count"], 0);

    play_triangle(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/game/collapse",
        Some(json!({"collapse_option": [0, 4]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["game_state"]["pending_cycle"].as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "POST", "/game/measure", Some(json!({"move_ids": 5}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_measure_with_only_bad_labels_is_rejected() {
    let app = app(ScriptedCoin::new([false, false, false]));
    play_triangle(&app).await;

    let (status, body) =
        send(&app, "POST", "/game/measure", Some(json!({"move_ids": ["Z9"]}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No valid move ids to measure");
    assert_eq!(body["game_state"]["pending_cycle"].as_array().unwrap().len(), 3);
}
