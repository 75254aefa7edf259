//! Outcome consistency invariant: the status agrees with the board.

use super::super::rules::{check_winner, has_line, is_full, resolve};
use super::super::{Board, Game, GameStatus};
use super::Invariant;

/// Invariant: the recorded status is what the board shows.
///
/// - Open: no completed line and at least one empty cell.
/// - Won: the winner is seated with the recorded mark, that mark fills a
///   line, and the winning move is the last one in the history.
/// - Draw: the board is full and no line is complete.
pub struct OutcomeConsistentInvariant;

/// Number of moves after which replaying the history first ends the game.
///
/// `None` if the history never ends the game or cannot be replayed.
fn moves_until_terminal(game: &Game) -> Option<usize> {
    let mut board = Board::new(game.board().size()).ok()?;
    for (played, entry) in game.history().iter().enumerate() {
        board.place(entry.index, entry.mark).ok()?;
        if resolve(&board, entry.index, entry.mark).is_terminal() {
            return Some(played + 1);
        }
    }
    None
}

impl Invariant<Game> for OutcomeConsistentInvariant {
    fn holds(game: &Game) -> bool {
        let board = game.board();
        match *game.status() {
            GameStatus::Open => check_winner(board).is_none() && !is_full(board),
            GameStatus::Won { winner, mark } => {
                game.mark_of(winner) == Some(mark)
                    && has_line(board, mark)
                    && game.history().last().map(|entry| entry.mark) == Some(mark)
                    && moves_until_terminal(game) == Some(game.history().len())
            }
            GameStatus::Draw => is_full(board) && check_winner(board).is_none(),
        }
    }

    fn description() -> &'static str {
        "Status matches the board (open, won or drawn)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Mark, Move, PlayerId};

    fn new_game() -> Game {
        Game::new(PlayerId::from(1), PlayerId::from(2), 3).unwrap()
    }

    #[test]
    fn test_open_game_holds() {
        assert!(OutcomeConsistentInvariant::holds(&new_game()));
    }

    #[test]
    fn test_won_game_holds() {
        let mut game = new_game();
        for index in [0, 3, 1, 4, 2] {
            let player = game.next_to_move();
            game.apply_move(player, index).unwrap();
        }
        assert!(OutcomeConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_claimed_draw_on_open_board_violates() {
        let mut game = new_game();
        game.status = GameStatus::Draw;
        assert!(!OutcomeConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_winner_with_wrong_mark_violates() {
        let mut game = new_game();
        for index in [0, 3, 1, 4, 2] {
            let player = game.next_to_move();
            game.apply_move(player, index).unwrap();
        }
        game.status = GameStatus::Won {
            winner: PlayerId::from(1),
            mark: Mark::O,
        };
        assert!(!OutcomeConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_moves_after_the_winning_line_violate() {
        let mut game = new_game();
        for index in [0, 3, 1, 4, 2] {
            let player = game.next_to_move();
            game.apply_move(player, index).unwrap();
        }
        game.history.push(Move::new(Mark::O, 5));
        game.board.cells_mut_for_test()[5] = Cell::Marked(Mark::O);
        assert!(!OutcomeConsistentInvariant::holds(&game));
    }

    #[test]
    fn test_restore_rejects_play_past_the_win() {
        let mut cells = vec![Cell::Empty; 9];
        let played = [
            (Mark::X, 0),
            (Mark::O, 3),
            (Mark::X, 1),
            (Mark::O, 4),
            (Mark::X, 2),
            (Mark::O, 5),
        ];
        let history: Vec<Move> = played
            .into_iter()
            .map(|(mark, index)| {
                cells[index] = Cell::Marked(mark);
                Move::new(mark, index)
            })
            .collect();
        let board = Board::from_cells(3, cells).unwrap();

        let restored = Game::restore(
            board,
            PlayerId::from(1),
            PlayerId::from(2),
            PlayerId::from(1),
            history,
            GameStatus::Won {
                winner: PlayerId::from(1),
                mark: Mark::X,
            },
        );
        assert!(restored.is_err());
    }
}
