//! Line geometry for square boards, parameterized purely by size.

/// A straight line of `size` cells that wins when uniformly marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Row `r`, left to right.
    Row(usize),
    /// Column `c`, top to bottom.
    Column(usize),
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Line {
    /// All `2 * size + 2` lines in scan order: rows, columns, diagonal, anti-diagonal.
    pub fn all(size: usize) -> impl Iterator<Item = Line> {
        (0..size)
            .map(Line::Row)
            .chain((0..size).map(Line::Column))
            .chain([Line::Diagonal, Line::AntiDiagonal])
    }

    /// Lines containing the cell at `index`, in scan order.
    pub fn through(index: usize, size: usize) -> Vec<Line> {
        let (row, col) = (index / size, index % size);
        let mut lines = vec![Line::Row(row), Line::Column(col)];
        if row == col {
            lines.push(Line::Diagonal);
        }
        if row + col + 1 == size {
            lines.push(Line::AntiDiagonal);
        }
        lines
    }

    /// Cell indices along this line for a board of the given size.
    pub fn cells(self, size: usize) -> impl Iterator<Item = usize> {
        (0..size).map(move |i| match self {
            Line::Row(r) => r * size + i,
            Line::Column(c) => i * size + c,
            Line::Diagonal => i * size + i,
            Line::AntiDiagonal => i * size + (size - 1 - i),
        })
    }
}
