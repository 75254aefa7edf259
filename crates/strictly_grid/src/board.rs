//! Fixed-size square board.

use super::rules;
use super::types::{Cell, Mark};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Errors raised by board operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// Board sizes start at one and `size * size` must fit in `usize`.
    #[display("Board size {} is out of range", _0)]
    InvalidSize(usize),

    /// Persisted cells do not match the board size.
    #[display("Expected {} cells, found {}", expected, actual)]
    Shape {
        /// `size * size`.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },

    /// Index lies outside `[0, size * size)`.
    #[display("Cell {} is out of range (board has {} cells)", index, len)]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of cells on the board.
        len: usize,
    },

    /// Cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(usize),
}

impl std::error::Error for BoardError {}

/// N-by-N board stored as a flat row-major cell array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board with `size * size` cells.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSize`] for a size of zero or one whose
    /// cell count overflows.
    #[instrument]
    pub fn new(size: usize) -> Result<Self, BoardError> {
        let len = Self::cell_count(size)?;
        Ok(Self {
            size,
            cells: vec![Cell::Empty; len],
        })
    }

    fn cell_count(size: usize) -> Result<usize, BoardError> {
        match size.checked_mul(size) {
            Some(len) if size > 0 => Ok(len),
            _ => Err(BoardError::InvalidSize(size)),
        }
    }

    /// Rebuilds a board from persisted cells.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidSize`] for a size of zero or one whose
    /// cell count overflows, and [`BoardError::Shape`] when the cell count
    /// is not `size * size`.
    #[instrument(skip(cells), fields(cells = cells.len()))]
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self, BoardError> {
        let expected = Self::cell_count(size)?;
        if cells.len() != expected {
            return Err(BoardError::Shape {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Side length of the board.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (`size * size`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; boards have at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Gets the cell at the given index.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Returns true if the index is on the board and the cell is empty.
    pub fn is_vacant(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Places a mark, returning the updated board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfRange`] if the index is off the board and
    /// [`BoardError::CellOccupied`] if the cell already holds a mark.
    #[instrument(skip(self), fields(size = self.size))]
    pub fn place(&mut self, index: usize, mark: Mark) -> Result<&Self, BoardError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(BoardError::OutOfRange { index, len })?;

        if !cell.is_empty() {
            return Err(BoardError::CellOccupied(index));
        }

        *cell = Cell::Marked(mark);
        trace!(index, %mark, "Mark placed");
        Ok(self)
    }

    /// Scans every row, column and both diagonals for a completed line.
    pub fn winner(&self) -> Option<Mark> {
        rules::check_winner(self)
    }

    /// Checks only the lines passing through `index`.
    pub fn winner_through(&self, index: usize) -> Option<Mark> {
        rules::winner_through(self, index)
    }

    /// Returns true if no cell is empty.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Number of cells holding a mark.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Indices of empty cells in ascending order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn cells_mut_for_test(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Formats the board as a grid, showing empty cells by index.
    pub fn display(&self) -> String {
        let width = (self.cells.len() - 1).to_string().len();
        let mut result = String::new();
        for row in 0..self.size {
            let line = (0..self.size)
                .map(|col| {
                    let index = row * self.size + col;
                    let symbol = match self.cells[index] {
                        Cell::Empty => index.to_string(),
                        Cell::Marked(mark) => mark.to_string(),
                    };
                    format!("{:>width$}", symbol)
                })
                .collect::<Vec<_>>()
                .join(" | ");
            result.push_str(&line);
            if row + 1 < self.size {
                result.push('\n');
                result.push_str(&"-".repeat(line.len()));
                result.push('\n');
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_rejected() {
        assert_eq!(Board::new(0), Err(BoardError::InvalidSize(0)));
    }

    #[test]
    fn test_overflowing_size_rejected() {
        let size = usize::MAX / 2;
        assert_eq!(Board::new(size), Err(BoardError::InvalidSize(size)));
        assert_eq!(
            Board::from_cells(size, Vec::new()),
            Err(BoardError::InvalidSize(size))
        );
    }

    #[test]
    fn test_place_and_get() {
        let mut board = Board::new(4).unwrap();
        board.place(5, Mark::X).unwrap();
        assert_eq!(board.get(5), Some(Cell::Marked(Mark::X)));
        assert_eq!(board.occupied(), 1);
        assert_eq!(board.len(), 16);
    }

    #[test]
    fn test_place_out_of_range() {
        let mut board = Board::new(3).unwrap();
        assert_eq!(
            board.place(9, Mark::X).unwrap_err(),
            BoardError::OutOfRange { index: 9, len: 9 }
        );
    }

    #[test]
    fn test_place_occupied() {
        let mut board = Board::new(3).unwrap();
        board.place(4, Mark::X).unwrap();
        assert_eq!(
            board.place(4, Mark::O).unwrap_err(),
            BoardError::CellOccupied(4)
        );
        assert_eq!(board.get(4), Some(Cell::Marked(Mark::X)));
    }

    #[test]
    fn test_from_cells_checks_shape() {
        let err = Board::from_cells(3, vec![Cell::Empty; 8]).unwrap_err();
        assert_eq!(
            err,
            BoardError::Shape {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn test_empty_cells_shrink() {
        let mut board = Board::new(2).unwrap();
        board.place(0, Mark::X).unwrap();
        board.place(3, Mark::O).unwrap();
        assert_eq!(board.empty_cells(), vec![1, 2]);
    }

    #[test]
    fn test_display_pads_indices() {
        let mut board = Board::new(2).unwrap();
        board.place(1, Mark::O).unwrap();
        assert_eq!(board.display(), "0 | O\n-----\n2 | 3");
    }
}
