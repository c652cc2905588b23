pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected placement. The board is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidMove {
    #[display("cell {cell} is outside the board ({num_cells} cells)")]
    OutOfBounds { cell: usize, num_cells: usize },
    #[display("cell {cell} is already occupied by player {owner}")]
    Occupied { cell: usize, owner: Player },
    #[display("game is already won by player {winner}")]
    GameOver { winner: Player },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardConfigError {
    #[display("board size must be at least 1")]
    ZeroSize,
    #[display("board size {size} is too large")]
    TooLarge { size: usize },
}
