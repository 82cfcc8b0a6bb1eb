//! Tests for collapse choices, measurement and stem resolution.

use quantum_tictactoe::{
    CollapseCause, CollapseError, GameInvariants, InvariantSet, MoveError, MoveId, Player,
    QuantumGame, ScriptedCoin, Square, TurnPhase,
};
use std::collections::{BTreeMap, BTreeSet};

fn id(label: &str) -> MoveId {
    label.parse().unwrap()
}

/// X1=[0,4], O1=[4,8], X2=[8,0]: a three-move cycle for O to resolve.
fn triangle() -> QuantumGame {
    let mut game = QuantumGame::new();
    game.make_move(0, 4).unwrap();
    game.make_move(4, 8).unwrap();
    game.make_move(8, 0).unwrap();
    game
}

#[test]
fn test_collapse_writes_board_and_ledger() {
    let mut game = triangle();
    let option = game.collapse_options()[0].clone();
    let outcome = game.apply_collapse_choice(option.assignments()).unwrap();

    assert_eq!(outcome.collapse_results, *option.assignments());
    assert!(outcome.skipped.is_empty());

    let state = game.state();
    for mv in state.moves() {
        assert!(*mv.collapsed());
        let cell = mv.resolved_cell().unwrap();
        assert!(mv.cells().contains(&cell));
        assert_eq!(
            state.board().get(cell),
            Some(Square::Occupied(mv.player()))
        );
    }
    assert!(GameInvariants::check_all(state).is_ok());
    assert_eq!(*state.phase(), TurnPhase::AwaitingMove(Player::O));
}

#[test]
fn test_collapse_is_idempotent() {
    let mut game = triangle();
    let option = game.collapse_options()[0].clone();
    game.apply_collapse_choice(option.assignments()).unwrap();
    let after_first = game.state().clone();

    let again = game.apply_collapse_choice(option.assignments()).unwrap();
    assert!(again.collapse_results.is_empty());
    assert_eq!(again.skipped.len(), option.len());
    assert!(
        again
            .skipped
            .iter()
            .all(|e| matches!(e, CollapseError::AlreadyCollapsed { .. }))
    );
    assert_eq!(*game.state(), after_first);
}

#[test]
fn test_bad_entries_are_skipped_not_fatal() {
    let mut game = triangle();
    let mut choice = BTreeMap::new();
    choice.insert(id("X1"), 0);
    choice.insert(id("O1"), 2);
    choice.insert(id("O7"), 3);

    let outcome = game.apply_collapse_choice(&choice).unwrap();
    assert_eq!(outcome.collapse_results.get(&id("X1")), Some(&0));
    assert!(outcome.skipped.contains(&CollapseError::NotACandidate {
        move_id: id("O1"),
        cell: 2
    }));
    assert!(
        outcome
            .skipped
            .contains(&CollapseError::UnknownMove { move_id: id("O7") })
    );
}

#[test]
fn test_occupied_cell_is_skipped() {
    let mut game = triangle();
    let mut choice = BTreeMap::new();
    choice.insert(id("X1"), 0);
    choice.insert(id("X2"), 0);

    let outcome = game.apply_collapse_choice(&choice).unwrap();
    assert_eq!(outcome.collapse_results.get(&id("X1")), Some(&0));
    assert!(outcome.skipped.contains(&CollapseError::CellOccupied {
        move_id: id("X2"),
        cell: 0
    }));
}

#[test]
fn test_stem_is_forced_after_cycle_resolves() {
    let mut game = QuantumGame::new();
    game.make_move(0, 4).unwrap(); // X1
    game.make_move(4, 8).unwrap(); // O1
    game.make_move(0, 1).unwrap(); // X2, hangs off X1 at 0
    let outcome = game.make_move(8, 0).unwrap(); // O2 closes X1-O1-O2
    assert!(outcome.cycle_detected);
    assert!(!outcome.cycle.contains(&id("X2")));
    assert_eq!(outcome.collapse_chooser, Some(Player::X));

    let mut choice = BTreeMap::new();
    choice.insert(id("X1"), 0);
    choice.insert(id("O1"), 4);
    choice.insert(id("O2"), 8);
    let result = game.apply_collapse_choice(&choice).unwrap();

    assert_eq!(result.collapse_results.get(&id("X2")), Some(&1));
    assert!(
        result
            .collapsed
            .iter()
            .any(|r| r.move_id == id("X2") && r.cause == CollapseCause::Stem)
    );
    assert!(result.unresolved_stems.is_empty());
    assert_eq!(*game.state().phase(), TurnPhase::AwaitingMove(Player::X));
}

#[test]
fn test_measurement_uses_coin() {
    let mut game = triangle();
    let mut coin = ScriptedCoin::new([true, true, true]);
    let outcome = game.measure(&[], &mut coin).unwrap();

    assert_eq!(outcome.collapse_results.get(&id("X1")), Some(&4));
    assert_eq!(outcome.collapse_results.get(&id("O1")), Some(&8));
    assert_eq!(outcome.collapse_results.get(&id("X2")), Some(&0));
    assert!(game.state().pending_cycle().is_none());
}

#[test]
fn test_measurement_of_single_move_outside_cycle() {
    let mut game = QuantumGame::new();
    game.make_move(2, 6).unwrap();
    let mut coin = ScriptedCoin::new([false]);
    let outcome = game.measure(&[id("X1")], &mut coin).unwrap();

    assert_eq!(outcome.collapse_results.get(&id("X1")), Some(&2));
    assert_eq!(*game.state().phase(), TurnPhase::AwaitingMove(Player::O));
    assert_eq!(game.make_move(2, 3), Err(MoveError::CellOccupied(2)));
}

#[test]
fn test_all_collapse_options_cover_every_quantum_move() {
    // X1=[0,4], O1=[4,8], X2=[2,6]: entangled but no cycle.
    let mut game = QuantumGame::new();
    game.make_move(0, 4).unwrap();
    game.make_move(4, 8).unwrap();
    game.make_move(2, 6).unwrap();
    assert!(game.collapse_options().is_empty());

    let options = game.all_collapse_options();
    assert!(!options.is_empty());
    assert!(options.len() <= game.config().max_options());
    for option in &options {
        let labels: BTreeSet<MoveId> = option.assignments().keys().copied().collect();
        assert_eq!(labels, BTreeSet::from([id("X1"), id("O1"), id("X2")]));
        assert_eq!(option.validate(game.state().moves()), Ok(()));
    }

    let mut coin = ScriptedCoin::new([false]);
    game.measure(&[id("X2")], &mut coin).unwrap();

    let options = game.all_collapse_options();
    assert!(!options.is_empty());
    for option in &options {
        assert_eq!(option.len(), 2);
        assert_eq!(option.get(&id("X2")), None);
        assert!(option.iter().all(|(_, cell)| cell != 2));
        assert_eq!(option.validate(game.state().moves()), Ok(()));
    }
}
