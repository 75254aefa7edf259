//! First-class action types.
//!
//! Moves are domain events, not side effects. A [`MoveRequest`] is a
//! player's intent and is validated before anything changes; a [`Move`]
//! is what the history records once the request was accepted.

use super::{BoardError, Mark, PlayerId};
use serde::{Deserialize, Serialize};

/// A player asking to mark a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRequest {
    /// The player acting.
    pub player: PlayerId,
    /// Target cell index (row-major).
    pub index: usize,
}

impl MoveRequest {
    /// Creates a new move request.
    pub fn new(player: PlayerId, index: usize) -> Self {
        Self { player, index }
    }
}

/// An accepted move as recorded in a game's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The mark that was placed.
    pub mark: Mark,
    /// The cell it was placed in.
    pub index: usize,
}

impl Move {
    /// Creates a new history entry.
    pub fn new(mark: Mark, index: usize) -> Self {
        Self { mark, index }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.index)
    }
}

/// Reasons a move is rejected.
///
/// Each precondition has its own variant so callers can branch on the
/// kind of failure instead of parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The game already ended in a win or a draw.
    #[display("Game is already over")]
    GameAlreadyOver,

    /// The acting player is not the one due to move.
    #[display("It's not player {}'s turn (waiting for {})", player, expected)]
    NotYourTurn {
        /// Who tried to move.
        player: PlayerId,
        /// Who is due to move.
        expected: PlayerId,
    },

    /// The index is off the board.
    #[display("Invalid move: cell {} is outside 0..{}", index, len)]
    InvalidMove {
        /// Requested index.
        index: usize,
        /// Number of cells on the board.
        len: usize,
    },

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),

    /// An invariant was violated (postcondition failure).
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveError {}

impl From<BoardError> for MoveError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::OutOfRange { index, len } => MoveError::InvalidMove { index, len },
            BoardError::CellOccupied(index) => MoveError::CellOccupied(index),
            other => MoveError::InvariantViolation(other.to_string()),
        }
    }
}
