//! Draw detection.

use super::super::Board;
use tracing::instrument;

/// Checks if the board is full (no empty cell).
///
/// A full board with no winner indicates a draw.
#[instrument(skip(board), fields(size = board.size()))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::super::win::check_winner;
    use super::*;
    use crate::Mark;

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::new(3).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new(3).unwrap();
        board.place(4, Mark::X).unwrap();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let mut board = Board::new(3).unwrap();
        let marks = [
            Mark::X, Mark::O, Mark::X,
            Mark::O, Mark::X, Mark::X,
            Mark::O, Mark::X, Mark::O,
        ];
        for (i, mark) in marks.into_iter().enumerate() {
            board.place(i, mark).unwrap();
        }
        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new(2).unwrap();
        for (i, mark) in [Mark::X, Mark::X, Mark::O, Mark::O].into_iter().enumerate() {
            board.place(i, mark).unwrap();
        }
        assert!(is_full(&board));
        assert!(!is_draw(&board));
    }
}
