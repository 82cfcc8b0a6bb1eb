//! Scripted walkthrough of a cycle and its collapse.

use quantum_tictactoe::QuantumGame;
use std::fmt::Write;
use tracing::instrument;

/// The three moves of the walkthrough: X1=[0,4], O1=[4,8], X2=[8,0].
pub const DEMO_MOVES: [(usize, usize); 3] = [(0, 4), (4, 8), (8, 0)];

/// Plays the walkthrough and returns its transcript.
#[instrument]
pub fn run_demo() -> anyhow::Result<String> {
    let mut game = QuantumGame::new();
    let mut out = String::new();

    let mut last = None;
    for (cell1, cell2) in DEMO_MOVES {
        let outcome = game.make_move(cell1, cell2)?;
        writeln!(
            out,
            "{} plays [{}, {}]",
            outcome.placed.move_id(),
            cell1,
            cell2
        )?;
        for ent in &outcome.new_entanglements {
            writeln!(
                out,
                "  entangled {} with {} at {}",
                ent.move1_id, ent.move2_id, ent.shared_cell
            )?;
        }
        last = Some(outcome);
    }

    let Some(outcome) = last.filter(|o| o.cycle_detected) else {
        anyhow::bail!("walkthrough did not close a cycle");
    };
    let cycle: Vec<String> = outcome.cycle.iter().map(ToString::to_string).collect();
    writeln!(out, "Cycle detected: {}", cycle.join(" -> "))?;
    if let Some(chooser) = outcome.collapse_chooser {
        writeln!(out, "{} chooses the collapse", chooser)?;
    }
    for (n, option) in outcome.collapse_options.iter().enumerate() {
        let cells: Vec<String> = option
            .iter()
            .map(|(id, cell)| format!("{}={}", id, cell))
            .collect();
        writeln!(out, "  option {}: {}", n + 1, cells.join(", "))?;
    }

    let Some(choice) = outcome.collapse_options.first() else {
        anyhow::bail!("cycle has no collapse option");
    };
    let collapsed = game.apply_collapse_choice(choice.assignments())?;
    writeln!(out, "Applied option 1")?;
    for mv in game.state().moves() {
        writeln!(out, "  {}", mv)?;
    }
    writeln!(out, "{}", game.state().board().display())?;
    match collapsed.winner.winner {
        Some(player) => writeln!(out, "Winner: {}", player)?,
        None => writeln!(out, "Next: {}", game.state().phase())?,
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_transcript() {
        let transcript = run_demo().unwrap();
        assert!(transcript.contains("X1 plays [0, 4]"));
        assert!(transcript.contains("entangled O1 with X2 at 8"));
        assert!(transcript.contains("Cycle detected"));
        assert!(transcript.contains("O chooses the collapse"));
        assert!(transcript.contains("option 2"));
        assert!(transcript.contains("X1 -> "));
    }
}
