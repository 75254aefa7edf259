//! Contract-based validation for moves.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use super::action::{MoveError, MoveRequest};
use super::game::Game;
use super::invariants::{GameInvariants, InvariantSet};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MoveError>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), MoveError>;
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the game has not ended.
pub struct GameIsOpen;

impl GameIsOpen {
    /// Fails with [`MoveError::GameAlreadyOver`] once the game is terminal.
    #[instrument(skip(game))]
    pub fn check(game: &Game) -> Result<(), MoveError> {
        if game.is_terminal() {
            Err(MoveError::GameAlreadyOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: it must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MoveError::NotYourTurn`] unless the player is due to move.
    #[instrument(skip(game))]
    pub fn check(request: &MoveRequest, game: &Game) -> Result<(), MoveError> {
        if request.player != game.next_to_move() {
            Err(MoveError::NotYourTurn {
                player: request.player,
                expected: game.next_to_move(),
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: the index must be on the board.
pub struct WithinBoard;

impl WithinBoard {
    /// Fails with [`MoveError::InvalidMove`] for an index past the last cell.
    #[instrument(skip(game))]
    pub fn check(request: &MoveRequest, game: &Game) -> Result<(), MoveError> {
        let len = game.board().len();
        if request.index >= len {
            Err(MoveError::InvalidMove {
                index: request.index,
                len,
            })
        } else {
            Ok(())
        }
    }
}

/// Precondition: the target cell must be empty.
pub struct CellIsEmpty;

impl CellIsEmpty {
    /// Fails with [`MoveError::CellOccupied`] if the cell holds a mark.
    #[instrument(skip(game))]
    pub fn check(request: &MoveRequest, game: &Game) -> Result<(), MoveError> {
        if !game.board().is_vacant(request.index) {
            Err(MoveError::CellOccupied(request.index))
        } else {
            Ok(())
        }
    }
}

/// Composite precondition, checked in a fixed order so turn violations
/// are reported before problems with the move itself.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(request: &MoveRequest, game: &Game) -> Result<(), MoveError> {
        GameIsOpen::check(game)?;
        PlayersTurn::check(request, game)?;
        WithinBoard::check(request, game)?;
        CellIsEmpty::check(request, game)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions:
/// - Game is open
/// - Player's turn
/// - Index on the board
/// - Cell empty
///
/// Postconditions:
/// - Exactly one entry appended to history
/// - No previously marked cell changed
/// - All game invariants hold
pub struct MoveContract;

impl Contract<Game, MoveRequest> for MoveContract {
    fn pre(game: &Game, request: &MoveRequest) -> Result<(), MoveError> {
        LegalMove::check(request, game)
    }

    fn post(before: &Game, after: &Game) -> Result<(), MoveError> {
        let appended = after.history().len() == before.history().len() + 1
            && after.history().starts_with(before.history());
        if !appended {
            warn!("History was not extended by exactly one move");
            return Err(MoveError::InvariantViolation(
                "Postcondition failed: history must grow by one move".to_string(),
            ));
        }

        let monotonic = before
            .board()
            .cells()
            .iter()
            .zip(after.board().cells())
            .all(|(b, a)| b.is_empty() || b == a);
        if !monotonic {
            warn!("Marked cell changed");
            return Err(MoveError::InvariantViolation(
                "Postcondition failed: marked cells never change".to_string(),
            ));
        }

        GameInvariants::check_all(after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            MoveError::InvariantViolation(format!("Postcondition failed: {}", descriptions))
        })
    }
}
