//! Game rules for quantum tic-tac-toe.
//!
//! Pure functions over the classical board and the move ledger. Cells that
//! only host uncollapsed moves never count.

pub mod draw;
pub mod win;

pub use draw::{has_room_for_move, is_draw, is_full};
pub use win::{LINES, LineWin, Victory, check_winner, winning_lines};
