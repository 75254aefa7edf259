//! History consistency invariant: the board is exactly the replayed history.

use super::super::{Board, Game};
use super::Invariant;

/// Invariant: replaying the history onto an empty board reproduces the board.
///
/// Every move in history corresponds to exactly one marked cell, no
/// move targets a cell twice, and no cell is marked without a move.
/// In particular `history.len()` equals the number of occupied cells.
pub struct HistoryConsistentInvariant;

impl Invariant<Game> for HistoryConsistentInvariant {
    fn holds(game: &Game) -> bool {
        let Ok(mut replayed) = Board::new(game.board().size()) else {
            return false;
        };

        for mov in game.history() {
            if replayed.place(mov.index, mov.mark).is_err() {
                return false;
            }
        }

        replayed == *game.board()
    }

    fn description() -> &'static str {
        "History replays to the current board"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Mark, Move, PlayerId};

    fn new_game(size: usize) -> Game {
        Game::new(PlayerId::from(1), PlayerId::from(2), size).unwrap()
    }

    #[test]
    fn test_empty_game_holds() {
        assert!(HistoryConsistentInvariant::holds(&new_game(3)));
    }

    #[test]
    fn test_moves_hold() {
        let mut game = new_game(4);
        for index in [0, 5, 10, 15] {
            let player = game.next_to_move();
            game.apply_move(player, index).unwrap();
        }
        assert!(HistoryConsistentInvariant::holds(&game));
        assert_eq!(game.history().len(), game.board().occupied());
    }

    #[test]
    fn test_unrecorded_mark_violates() {
        let mut game = new_game(3);
        game.apply_move(PlayerId::from(1), 4).unwrap();
        game.board.cells_mut_for_test()[0] = Cell::Marked(Mark::O);
        assert!(!HistoryConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_duplicate_history_entry_violates() {
        let mut game = new_game(3);
        game.apply_move(PlayerId::from(1), 4).unwrap();
        game.history.push(Move::new(Mark::O, 4));
        assert!(!HistoryConsistentInvariant::holds(&game));
    }
}
