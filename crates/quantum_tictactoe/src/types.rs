//! Core domain types for quantum tic-tac-toe.

use crate::action::MoveIdParseError;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Player in the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A cell on the classical board.
///
/// Serialized as `null` or the occupying player's symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Player>", into = "Option<Player>")]
pub enum Square {
    /// No move has collapsed here.
    Empty,
    /// A move of this player collapsed here.
    Occupied(Player),
}

impl From<Option<Player>> for Square {
    fn from(value: Option<Player>) -> Self {
        value.map_or(Square::Empty, Square::Occupied)
    }
}

impl From<Square> for Option<Player> {
    fn from(value: Square) -> Self {
        match value {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

/// 3x3 classical board. Only collapsed moves ever appear here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; CELL_COUNT],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; CELL_COUNT],
        }
    }

    /// Builds a board from row-major squares.
    pub fn from_squares(squares: [Square; CELL_COUNT]) -> Self {
        Self { squares }
    }

    /// Gets the square at the given cell (0-8).
    pub fn get(&self, cell: usize) -> Option<Square> {
        self.squares.get(cell).copied()
    }

    /// Writes a player's symbol into a cell. Out-of-range cells are ignored.
    pub(crate) fn occupy(&mut self, cell: usize, player: Player) {
        if let Some(square) = self.squares.get_mut(cell) {
            *square = Square::Occupied(player);
        }
    }

    /// Checks if a cell is in range and empty.
    pub fn is_empty(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Square::Empty))
    }

    /// Checks if a cell holds a collapsed move.
    pub fn is_occupied(&self, cell: usize) -> bool {
        matches!(self.get(cell), Some(Square::Occupied(_)))
    }

    /// Number of cells with no collapsed move.
    pub fn empty_count(&self) -> usize {
        self.squares.iter().filter(|s| **s == Square::Empty).count()
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; CELL_COUNT] {
        &self.squares
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let cell = row * 3 + col;
                let symbol = match self.squares[cell] {
                    Square::Empty => cell.to_string(),
                    Square::Occupied(player) => player.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Label of a move: the mover's symbol and their own sequence number.
///
/// The second move by X is `X2`, regardless of how many moves O made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoveId {
    player: Player,
    seq: u32,
}

impl MoveId {
    /// Creates a move label.
    pub fn new(player: Player, seq: u32) -> Self {
        Self { player, seq }
    }

    /// The player who made the move.
    pub fn player(&self) -> Player {
        self.player
    }

    /// Per-player sequence number, starting at 1.
    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl std::fmt::Display for MoveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.player, self.seq)
    }
}

impl FromStr for MoveId {
    type Err = MoveIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let player = match chars.next() {
            Some('X') | Some('x') => Player::X,
            Some('O') | Some('o') => Player::O,
            _ => return Err(MoveIdParseError::new(s)),
        };
        let seq: u32 = chars
            .as_str()
            .parse()
            .map_err(|_| MoveIdParseError::new(s))?;
        if seq == 0 {
            return Err(MoveIdParseError::new(s));
        }
        Ok(Self { player, seq })
    }
}

impl TryFrom<String> for MoveId {
    type Error = MoveIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MoveId> for String {
    fn from(value: MoveId) -> Self {
        value.to_string()
    }
}

/// A move placed in superposition across two cells.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct QuantumMove {
    /// Label such as `X1`.
    move_id: MoveId,
    /// The two candidate cells, in the order they were given.
    cells: [usize; 2],
    /// Whether the move has collapsed.
    collapsed: bool,
    /// The cell the move collapsed to, once collapsed.
    resolved_cell: Option<usize>,
}

impl QuantumMove {
    pub(crate) fn new(move_id: MoveId, cells: [usize; 2]) -> Self {
        Self {
            move_id,
            cells,
            collapsed: false,
            resolved_cell: None,
        }
    }

    /// The player who made the move.
    pub fn player(&self) -> Player {
        self.move_id.player()
    }

    /// Whether `cell` is one of the two candidates.
    pub fn has_cell(&self, cell: usize) -> bool {
        self.cells.contains(&cell)
    }

    /// The candidate that is not `cell`, if `cell` is a candidate.
    pub fn other_cell(&self, cell: usize) -> Option<usize> {
        match self.cells {
            [a, b] if a == cell => Some(b),
            [a, b] if b == cell => Some(a),
            _ => None,
        }
    }

    /// Still in superposition.
    pub fn is_quantum(&self) -> bool {
        !self.collapsed
    }

    pub(crate) fn collapse_to(&mut self, cell: usize) {
        self.collapsed = true;
        self.resolved_cell = Some(cell);
    }
}

impl std::fmt::Display for QuantumMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.resolved_cell {
            Some(cell) => write!(f, "{} -> {}", self.move_id, cell),
            None => write!(f, "{} [{}, {}]", self.move_id, self.cells[0], self.cells[1]),
        }
    }
}
