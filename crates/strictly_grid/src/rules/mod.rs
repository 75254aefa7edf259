//! Game rules for N-by-N tic-tac-toe.
//!
//! This module contains pure functions for evaluating board state.
//! Rules are separated from board storage so the session state
//! machine and the contracts can compose them.

pub mod draw;
pub mod lines;
pub mod win;

pub use draw::is_full;
pub use lines::Line;
pub use win::{check_winner, has_line, winner_through};

use super::{Board, Mark};
use tracing::instrument;

/// Result of evaluating a board after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// No completed line and at least one empty cell.
    Ongoing,
    /// The mark just played completed a line.
    Win(Mark),
    /// Every cell is filled and nobody completed a line.
    Draw,
}

impl Resolution {
    /// Returns true for a win or a draw.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Resolution::Ongoing)
    }
}

/// Resolves the board after `mark` was played at `last_index`.
///
/// Only lines through the last-played cell can have been completed by
/// the move, so only those are checked. A win takes precedence over a
/// full board.
#[instrument(skip(board), fields(size = board.size()))]
pub fn resolve(board: &Board, last_index: usize, mark: Mark) -> Resolution {
    match winner_through(board, last_index) {
        Some(winner) if winner == mark => Resolution::Win(winner),
        _ if is_full(board) => Resolution::Draw,
        _ => Resolution::Ongoing,
    }
}
