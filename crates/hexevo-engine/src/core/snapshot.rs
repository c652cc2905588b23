use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Immutable copy of the cell grid.
///
/// This is what policies see, what the match log stores and what gets logged.
/// The textual form has one token per cell (`A`, `B` or `.`) separated by
/// spaces, and one board row per line:
///
/// ```
/// use hexevo_engine::BoardSnapshot;
///
/// let snapshot: BoardSnapshot = "A . .\n. B .\n. . .".parse().unwrap();
/// assert_eq!(snapshot.size(), 3);
/// assert_eq!(snapshot.to_string(), "A . .\n. B .\n. . .");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardSnapshot {
    size: usize,
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SnapshotParseError {
    #[display("empty board text")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[display("invalid cell token {token:?} at row {row}, column {column}")]
    InvalidToken { token: char, row: usize, column: usize },
}

impl BoardSnapshot {
    /// Creates a snapshot from row-major cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != size * size`.
    #[must_use]
    pub fn new(size: usize, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), size * size, "snapshot must be square");
        Self { size, cells }
    }

    #[must_use]
    pub fn empty(size: usize) -> Self {
        Self::new(size, vec![Cell::Empty; size * size])
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    #[must_use]
    pub fn cell_at(&self, row: usize, column: usize) -> Cell {
        self.cells[row * self.size + column]
    }

    /// Cell indices that are still empty, in ascending order.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.is_empty().then_some(i))
    }

    /// Returns the snapshot with rows and columns exchanged.
    #[must_use]
    pub fn transposed(&self) -> Self {
        let n = self.size;
        let cells = (0..n * n)
            .map(|i| self.cells[(i % n) * n + i / n])
            .collect();
        Self { size: n, cells }
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.chunks(self.size.max(1)).enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", cell.token())?;
            }
        }
        Ok(())
    }
}

impl FromStr for BoardSnapshot {
    type Err = SnapshotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(SnapshotParseError::Empty);
        }
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if tokens.len() != size {
                return Err(SnapshotParseError::RaggedRow {
                    row,
                    found: tokens.len(),
                    expected: size,
                });
            }
            for (column, token) in tokens.into_iter().enumerate() {
                let cell = Cell::from_token(token).ok_or(SnapshotParseError::InvalidToken {
                    token,
                    row,
                    column,
                })?;
                cells.push(cell);
            }
        }
        Ok(Self { size, cells })
    }
}
