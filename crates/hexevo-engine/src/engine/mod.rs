//! Board state and placement rules.
//!
//! - [`Board`] - `N×N` Hex board with union-find win detection
//! - [`BoardConfig`] - board size, opening player and edge assignment
//! - [`MoveRecord`] - entry of the per-game move log
//!
//! # Game Flow
//!
//! 1. Create a [`Board`] from a [`BoardConfig`]
//! 2. Pick an index from [`Board::feasible_moves`]
//! 3. [`Board::place`] a stone of [`Board::to_move`] there
//! 4. Repeat until a placement returns [`WinSignal::Won`]
//!
//! On a board with `N²` cells exactly one player wins no later than the
//! `N²`-th placement, so step 2 never runs out of moves before step 4.

pub use self::{board::*, config::*};

mod board;
mod config;
