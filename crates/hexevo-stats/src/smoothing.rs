use serde::{Deserialize, Serialize};

/// Exponentially weighted running average.
///
/// Each [`update`](Self::update) moves the value towards the new observation:
///
/// ```text
/// value ← (1 - rate) · value + rate · observation
/// ```
///
/// The rate is passed per update, so callers can make it depend on their own
/// state. A rate of `1.0` replaces the value outright and `0.0` ignores the
/// observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentialAverage {
    value: f64,
}

impl ExponentialAverage {
    /// Starts the average at a prior value.
    #[must_use]
    pub const fn new(prior: f64) -> Self {
        Self { value: prior }
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Blends `observation` in with weight `rate`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `rate` is outside `[0, 1]`.
    pub fn update(&mut self, observation: f64, rate: f64) -> f64 {
        debug_assert!((0.0..=1.0).contains(&rate), "smoothing rate out of range: {rate}");
        self.value = (1.0 - rate) * self.value + rate * observation;
        self.value
    }
}
