//! Pairwise comparison oracles.
//!
//! The optimizer never sees absolute fitness values. It only asks a
//! [`MatchOracle`] how two search points fare against each other and reads
//! the answer as the **loss of the first point**: `1.0` means the first point
//! lost, `0.0` means it won, values in between express a partial or
//! expected result. Lower fitness is better throughout the optimizer.

use std::{convert::Infallible, error::Error};

use hexevo_engine::{BoardConfig, BoardConfigError, Player};
use hexevo_evaluator::{MatchError, MatchSimulator, ParameterError, Policy};
use rand::{Rng, RngCore};
use rand_distr::Normal;

/// Compares two search points.
///
/// Implementations must be callable from several threads at once; each call
/// receives its own random stream.
pub trait MatchOracle: Sync {
    type Error: Error + Send + Sync + 'static;

    /// Returns the loss of `first` against `second`, in `[0, 1]`.
    fn compare(
        &self,
        first: &[f64],
        second: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<f64, Self::Error>;
}

impl<F, E> MatchOracle for F
where
    F: Fn(&[f64], &[f64], &mut dyn RngCore) -> Result<f64, E> + Sync,
    E: Error + Send + Sync + 'static,
{
    type Error = E;

    fn compare(
        &self,
        first: &[f64],
        second: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<f64, Self::Error> {
        self(first, second, rng)
    }
}

/// Wraps an infallible comparison function.
///
/// Saves spelling out the closure's error type:
///
/// ```
/// use hexevo_training::oracle::{self, MatchOracle};
///
/// // the point closer to the origin wins
/// let sphere = oracle::infallible(|a: &[f64], b: &[f64], _rng: &mut dyn rand::RngCore| {
///     let norm = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
///     if norm(a) > norm(b) { 1.0 } else { 0.0 }
/// });
/// let loss = sphere.compare(&[2.0], &[1.0], &mut rand::rng()).unwrap();
/// assert_eq!(loss, 1.0);
/// ```
pub fn infallible<F>(
    compare: F,
) -> impl Fn(&[f64], &[f64], &mut dyn RngCore) -> Result<f64, Infallible> + Sync
where
    F: Fn(&[f64], &[f64], &mut dyn RngCore) -> f64 + Sync,
{
    move |first: &[f64], second: &[f64], rng: &mut dyn RngCore| Ok(compare(first, second, rng))
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SelfPlayError {
    #[display("invalid policy parameters: {_0}")]
    Parameters(ParameterError),
    #[display("invalid board configuration: {_0}")]
    Board(BoardConfigError),
    #[display("match failed: {_0}")]
    Match(MatchError),
}

/// Plays a real Hex match between two parameterizations of a template policy.
///
/// The first search point plays as [`Player::A`], the second as
/// [`Player::B`]. With a fixed opening player the first point therefore
/// always has the same side; configure [`FirstPlayer::Random`] to spread the
/// first-move advantage evenly.
///
/// [`FirstPlayer::Random`]: hexevo_engine::FirstPlayer::Random
#[derive(Debug, Clone)]
pub struct SelfPlayOracle<P> {
    config: BoardConfig,
    template: P,
}

impl<P> SelfPlayOracle<P>
where
    P: Policy + Clone,
{
    pub fn new(config: BoardConfig, template: P) -> Result<Self, BoardConfigError> {
        config.validate()?;
        Ok(Self { config, template })
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Dimension of the search space, i.e. the template's parameter count.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.template.num_parameters()
    }

    /// Draws a small random starting point with variance `1/d` per coordinate.
    #[expect(clippy::cast_precision_loss)]
    pub fn propose_starting_point<R>(&self, rng: &mut R) -> Vec<f64>
    where
        R: Rng + ?Sized,
    {
        let dimension = self.num_parameters();
        if dimension == 0 {
            return vec![];
        }
        let normal = Normal::new(0.0, (1.0 / dimension as f64).sqrt())
            .expect("standard deviation is finite and positive");
        (0..dimension).map(|_| rng.sample(normal)).collect()
    }

    /// Instantiates the template with `parameters`.
    pub fn policy(&self, parameters: &[f64]) -> Result<P, ParameterError> {
        let mut policy = self.template.clone();
        policy.set_parameters(parameters)?;
        Ok(policy)
    }
}

impl<P> MatchOracle for SelfPlayOracle<P>
where
    P: Policy + Clone,
{
    type Error = SelfPlayError;

    fn compare(
        &self,
        first: &[f64],
        second: &[f64],
        rng: &mut dyn RngCore,
    ) -> Result<f64, Self::Error> {
        let first = self.policy(first)?;
        let second = self.policy(second)?;
        let mut simulator = MatchSimulator::new(self.config)?;
        let outcome = simulator.play_match([&first, &second], rng)?;
        Ok(outcome.score_for(Player::B))
    }
}
