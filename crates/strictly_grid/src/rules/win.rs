//! Win detection for boards of any size.

use super::super::{Board, Mark};
use super::lines::Line;
use tracing::instrument;

/// Returns the mark filling every cell of `line`, if any.
fn line_owner(board: &Board, line: Line) -> Option<Mark> {
    let size = board.size();
    let mut cells = line.cells(size).map(|i| board.get(i).and_then(|c| c.mark()));
    let first = cells.next().flatten()?;
    cells.all(|m| m == Some(first)).then_some(first)
}

/// Checks every row, then every column, then both diagonals.
///
/// Returns the mark of the first completed line found.
#[instrument(skip(board), fields(size = board.size()))]
pub fn check_winner(board: &Board) -> Option<Mark> {
    Line::all(board.size()).find_map(|line| line_owner(board, line))
}

/// Checks only the lines passing through the cell at `index`.
///
/// Sufficient after a move: a line not containing the last-played
/// cell cannot have been completed by it.
#[instrument(skip(board), fields(size = board.size()))]
pub fn winner_through(board: &Board, index: usize) -> Option<Mark> {
    if index >= board.len() {
        return None;
    }
    Line::through(index, board.size())
        .into_iter()
        .find_map(|line| line_owner(board, line))
}

/// Returns true if `mark` fills any line on the board.
#[instrument(skip(board), fields(size = board.size()))]
pub fn has_line(board: &Board, mark: Mark) -> bool {
    Line::all(board.size()).any(|line| line_owner(board, line) == Some(mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn board(size: usize, cells: &[Option<Mark>]) -> Board {
        Board::from_cells(size, cells.iter().copied().map(Cell::from).collect()).unwrap()
    }

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    #[test]
    fn test_no_winner_empty_board() {
        let board = Board::new(3).unwrap();
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_winner_top_row() {
        let board = board(3, &[X, X, X, E, E, E, E, E, E]);
        assert_eq!(check_winner(&board), Some(Mark::X));
        assert_eq!(winner_through(&board, 2), Some(Mark::X));
    }

    #[test]
    fn test_full_board_without_line() {
        let board = board(3, &[X, O, X, O, X, O, O, X, O]);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_last_row_and_column_detected() {
        let row = board(3, &[E, E, E, E, E, E, O, O, O]);
        assert_eq!(check_winner(&row), Some(Mark::O));

        let col = board(3, &[E, E, X, E, E, X, E, E, X]);
        assert_eq!(check_winner(&col), Some(Mark::X));
    }

    #[test]
    fn test_anti_diagonal_size_four() {
        let mut board = Board::new(4).unwrap();
        for i in [3, 6, 9, 12] {
            board.place(i, Mark::O).unwrap();
        }
        assert_eq!(check_winner(&board), Some(Mark::O));
        assert_eq!(winner_through(&board, 9), Some(Mark::O));
        assert_eq!(winner_through(&board, 0), None);
    }

    #[test]
    fn test_incomplete_line_does_not_win() {
        let board = board(3, &[X, X, E, E, E, E, E, E, E]);
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_has_line_per_mark() {
        let board = board(3, &[O, X, E, O, X, E, E, X, E]);
        assert!(has_line(&board, Mark::X));
        assert!(!has_line(&board, Mark::O));
    }

    #[test]
    fn test_out_of_range_index() {
        let board = Board::new(3).unwrap();
        assert_eq!(winner_through(&board, 42), None);
    }
}
