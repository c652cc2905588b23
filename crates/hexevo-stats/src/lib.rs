//! Statistical utilities for training and evaluation.
//!
//! - **Descriptive statistics**: mean, median, population and sample variance,
//!   standard deviation of a dataset
//! - **Exponential smoothing**: running averages whose smoothing rate may
//!   change from one update to the next
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`smoothing`]: Exponentially weighted running averages
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use hexevo_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.sample_variance, 2.5);
//! ```
//!
//! ## Smoothing a noisy signal
//!
//! ```
//! use hexevo_stats::smoothing::ExponentialAverage;
//!
//! let mut average = ExponentialAverage::new(10.0);
//! average.update(0.0, 0.5);
//! assert_eq!(average.value(), 5.0);
//! ```

pub mod descriptive;
pub mod smoothing;
