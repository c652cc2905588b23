//! Training Hex policies with a noise-aware evolution strategy.
//!
//! Policy parameters are evolved by [`EvolutionStrategy`], which only ever
//! asks a [`MatchOracle`] who wins between two parameter vectors. Match
//! results are noisy, so the strategy estimates how much of the observed
//! fitness spread is signal and slows its learning rate down when it is not.
//!
//! # How Training Works
//!
//! 1. **Sample** - Draw `λ` offspring around the current mean
//! 2. **Compete** - Every offspring plays two matches per generation, against
//!    fixed partners from the [`TournamentSchedule`]
//! 3. **Estimate noise** - Compare the two rounds to tell signal from noise
//!    and adapt the learning rate ([`noise`])
//! 4. **Recombine** - Move the mean towards the winners and adapt the step
//!    size ([`es`])
//!
//! # Architecture
//!
//! ```text
//! EvolutionStrategy
//!     ↓ samples
//! Parameter vectors (offspring)
//!     ↓ compared by
//! MatchOracle (closure, or SelfPlayOracle)
//!     ↓ which instantiates
//! Policy (hexevo-evaluator)
//!     ↓ played on
//! MatchSimulator + Board (hexevo-engine)
//!     ↓ produces
//! Loss of the first point in [0, 1]
//!     ↓ guides
//! Mean, step size and learning rate updates
//! ```
//!
//! # Example
//!
//! ```
//! use hexevo_engine::{BoardConfig, FirstPlayer};
//! use hexevo_evaluator::LinearPolicy;
//! use hexevo_training::{EsConfig, EvolutionStrategy, SelfPlayOracle};
//!
//! let board = BoardConfig {
//!     size: 3,
//!     first_player: FirstPlayer::Random,
//!     ..BoardConfig::default()
//! };
//! let oracle = SelfPlayOracle::new(board, LinearPolicy::zeroed(&board))?;
//! let start = oracle.propose_starting_point(&mut rand::rng());
//! let mut es = EvolutionStrategy::new(oracle.num_parameters(), start, EsConfig::default())?;
//! for _ in 0..3 {
//!     let report = es.step(&oracle)?;
//!     assert!(report.rate > 0.0 && report.rate <= 1.0);
//! }
//! let policy = oracle.policy(es.mean())?;
//! # let _ = policy;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::error::Error;

pub use self::{
    es::{EsConfig, EvolutionStrategy, GenerationReport},
    oracle::{MatchOracle, SelfPlayError, SelfPlayOracle},
    schedule::TournamentSchedule,
};

pub mod es;
pub mod noise;
pub mod oracle;
pub mod schedule;
pub mod weights;

/// Failure of [`EvolutionStrategy::new`] or [`EvolutionStrategy::step`].
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum OptimizerError {
    #[display("degenerate configuration: {reason}")]
    DegenerateConfiguration { reason: &'static str },
    #[display("start point has {found} coordinates, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[display("match {match_index} returned {value}, expected a value in [0, 1]")]
    OutcomeOutOfRange { match_index: usize, value: f64 },
    #[display("oracle failed in match {match_index}: {error}")]
    Oracle {
        match_index: usize,
        error: Box<dyn Error + Send + Sync>,
    },
}
