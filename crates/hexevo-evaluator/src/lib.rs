//! Policies and match simulation for Hex self-play.
//!
//! This crate sits between the board engine and the optimizer:
//!
//! 1. **Policies** ([`policy`]) - score every cell of a board snapshot from the
//!    mover's point of view.
//!
//! 2. **Move Distribution** ([`move_distribution`]) - turns scores into a
//!    probability distribution over the feasible cells (masked, max-shifted
//!    softmax) and samples from it.
//!
//! 3. **Match Simulation** ([`match_simulator`]) - plays a complete game between
//!    two policies on an owned [`Board`](hexevo_engine::Board) and logs every
//!    move with its probability.
//!
//! # Architecture
//!
//! ```text
//! Match Simulator (play a full game)
//!     ↓ uses
//! Move Distribution (pick one cell)
//!     ↓ uses
//! Policy (score all cells)
//! ```
//!
//! # Example
//!
//! ```
//! use hexevo_engine::BoardConfig;
//! use hexevo_evaluator::{MatchSimulator, RandomPolicy};
//!
//! let mut simulator = MatchSimulator::new(BoardConfig::with_size(4)).unwrap();
//! let policy = RandomPolicy;
//! let outcome = simulator
//!     .play_match([&policy, &policy], &mut rand::rng())
//!     .unwrap();
//! assert!(outcome.moves.len() <= 16);
//! ```

pub use self::{match_simulator::*, move_distribution::*, policy::*};

pub mod match_simulator;
pub mod move_distribution;
pub mod policy;
