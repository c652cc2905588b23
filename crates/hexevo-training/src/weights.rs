//! Weight vector operations for the evolution strategy.
//!
//! - **Recombination**: [`recombination_weights`] turns a generation's
//!   fitness values into non-negative weights on the unit simplex
//! - **Normalization**: [`normalize_l1`] performs L1 normalization
//! - **Sampling**: [`standard_normal`] draws isotropic Gaussian vectors
//!
//! # Recombination Weights
//!
//! Lower fitness is better. The weights are computed as:
//!
//! ```text
//! w_i = -f_i
//! w_i ← w_i - min_j w_j      (best individual gets the largest weight,
//!                             worst gets zero)
//! w   ← w / ‖w‖₁
//! ```
//!
//! If every individual has the same fitness, the shifted weights are all zero
//! and there is nothing to normalize; the weights then fall back to uniform
//! `1/λ`, which makes the mean update vanish for that generation.

use rand::Rng;
use rand_distr::StandardNormal;

/// Normalizes a weight vector to sum to 1.0 (L1 normalization).
///
/// Returns `false` and leaves the weights unchanged if the sum is not
/// positive.
pub fn normalize_l1(weights: &mut [f64]) -> bool {
    let sum: f64 = weights.iter().copied().sum();
    if sum > 0.0 {
        for w in weights {
            *w /= sum;
        }
        true
    } else {
        false
    }
}

/// Computes recombination weights from fitness values (lower is better).
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn recombination_weights(fitness: &[f64]) -> Vec<f64> {
    let mut weights: Vec<f64> = fitness.iter().map(|f| -f).collect();
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    for w in &mut weights {
        *w -= min;
    }
    if !normalize_l1(&mut weights) {
        let uniform = 1.0 / weights.len() as f64;
        weights.fill(uniform);
    }
    weights
}

/// Sum of squared weights; `1 / Σw²` is the variance-effective selection mass.
#[must_use]
pub fn squared_norm(weights: &[f64]) -> f64 {
    weights.iter().map(|w| w * w).sum()
}

/// Samples a vector of `len` independent standard normal values.
pub fn standard_normal<R>(rng: &mut R, len: usize) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.sample(StandardNormal)).collect()
}
