//! Separating fitness signal from evaluation noise.
//!
//! Every individual is evaluated in two independent rounds, giving fitness
//! estimates `f1` and `f2`. Their half-difference only contains noise, while
//! the spread of the combined fitness `(f1 + f2) / 2` contains signal plus
//! noise. Per generation:
//!
//! ```text
//! noise = mean_i ((f1_i - f2_i) / 2)²  + noise_floor
//! fvar  = sample variance of (f1 + f2) / 2
//! ```
//!
//! Both are smoothed with an [`ExponentialAverage`] whose rate
//! `c = rate^1.5 / 100` shrinks together with the learning rate, and the
//! signal-to-noise test statistic drives the learning rate itself:
//!
//! ```text
//! z    = 0.5 · fvar / noise + 0.5
//! rate = 1 / (1 + 1 / (z - 1))        clamped into [min_rate, 1]
//! ```
//!
//! With a pure-noise objective `fvar ≈ noise`, so `z ≈ 1` and the rate
//! collapses towards `min_rate`. A strong signal makes `z` large and the rate
//! approaches one.

use hexevo_stats::{descriptive::DescriptiveStats, smoothing::ExponentialAverage};
use serde::{Deserialize, Serialize};

/// Initial values of the smoothed noise statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Priors {
    pub fitness_variance: f64,
    pub noise_variance: f64,
    pub z_test: f64,
    pub rate: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            fitness_variance: 10.0,
            noise_variance: 1.0,
            z_test: 10.0,
            rate: 1.0,
        }
    }
}

/// Raw noise statistics of a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationNoise {
    /// Mean squared half-difference between the two rounds, floor included.
    pub noise: f64,
    /// Sample variance of the combined fitness.
    pub fitness_variance: f64,
}

impl GenerationNoise {
    /// # Panics
    ///
    /// Panics if the rounds have different lengths or fewer than two entries.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn estimate(f1: &[f64], f2: &[f64], noise_floor: f64) -> Self {
        assert_eq!(f1.len(), f2.len());
        assert!(f1.len() >= 2, "need at least two individuals");
        let n = f1.len() as f64;
        let noise = f1
            .iter()
            .zip(f2)
            .map(|(a, b)| ((a - b) / 2.0).powi(2))
            .sum::<f64>()
            / n;
        let combined = f1.iter().zip(f2).map(|(a, b)| (a + b) / 2.0);
        let stats = DescriptiveStats::new(combined).expect("population is not empty");
        Self {
            noise: noise + noise_floor,
            fitness_variance: stats.sample_variance,
        }
    }
}

/// Smoothed noise statistics and the learning rate derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseTracker {
    fitness_variance: ExponentialAverage,
    noise_variance: ExponentialAverage,
    z_test: f64,
    rate: f64,
    min_rate: f64,
}

impl NoiseTracker {
    #[must_use]
    pub fn new(priors: Priors, min_rate: f64) -> Self {
        Self {
            fitness_variance: ExponentialAverage::new(priors.fitness_variance),
            noise_variance: ExponentialAverage::new(priors.noise_variance),
            z_test: priors.z_test,
            rate: priors.rate.clamp(min_rate, 1.0),
            min_rate,
        }
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub fn z_test(&self) -> f64 {
        self.z_test
    }

    #[must_use]
    pub fn fitness_variance(&self) -> f64 {
        self.fitness_variance.value()
    }

    #[must_use]
    pub fn noise_variance(&self) -> f64 {
        self.noise_variance.value()
    }

    /// Folds in one generation and returns the new learning rate.
    pub fn update(&mut self, generation: GenerationNoise) -> f64 {
        let smoothing = self.rate.powf(1.5) / 100.0;
        let fvar = self
            .fitness_variance
            .update(generation.fitness_variance, smoothing);
        let noise = self.noise_variance.update(generation.noise, smoothing);
        self.z_test = 0.5 * fvar / noise + 0.5;
        let rate = 1.0 / (1.0 + 1.0 / (self.z_test - 1.0));
        self.rate = if rate.is_nan() {
            self.min_rate
        } else {
            rate.clamp(self.min_rate, 1.0)
        };
        self.rate
    }
}
