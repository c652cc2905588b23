/// Probability distribution over board cells derived from policy scores.
///
/// Built with a numerically stable softmax restricted to the feasible cells:
/// the maximum feasible score is subtracted before exponentiation, infeasible
/// cells get probability zero and the rest is renormalized to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDistribution {
    probabilities: Vec<f64>,
    /// Feasible cells with positive probability, ascending.
    support: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DistributionError {
    #[display("policy returned {found} scores for {expected} cells")]
    LengthMismatch { expected: usize, found: usize },
    #[display("no feasible move")]
    NoFeasibleMove,
    #[display("score of cell {cell} is {score}")]
    NonFiniteScore { cell: usize, score: f64 },
}

impl MoveDistribution {
    /// Builds the distribution for `feasible` cells out of one score per cell.
    ///
    /// Scores of infeasible cells are ignored. A feasible score of
    /// `f64::NEG_INFINITY` yields an exact zero probability; if every feasible
    /// score is `f64::NEG_INFINITY` the distribution falls back to uniform
    /// over the feasible cells. `NaN` and `+∞` scores are rejected.
    pub fn from_scores(scores: &[f64], feasible: &[usize]) -> Result<Self, DistributionError> {
        let num_cells = scores.len();
        if feasible.is_empty() {
            return Err(DistributionError::NoFeasibleMove);
        }
        if let Some(&cell) = feasible.iter().find(|&&cell| cell >= num_cells) {
            return Err(DistributionError::LengthMismatch {
                expected: cell + 1,
                found: num_cells,
            });
        }
        if let Some(&cell) = feasible
            .iter()
            .find(|&&cell| scores[cell].is_nan() || scores[cell] == f64::INFINITY)
        {
            return Err(DistributionError::NonFiniteScore {
                cell,
                score: scores[cell],
            });
        }

        let max = feasible
            .iter()
            .map(|&cell| scores[cell])
            .fold(f64::NEG_INFINITY, f64::max);

        let mut probabilities = vec![0.0; num_cells];
        if max == f64::NEG_INFINITY {
            for &cell in feasible {
                probabilities[cell] = 1.0;
            }
        } else {
            for &cell in feasible {
                probabilities[cell] = (scores[cell] - max).exp();
            }
        }
        // at least the maximum contributes exp(0) = 1
        let total: f64 = probabilities.iter().sum();
        for p in &mut probabilities {
            *p /= total;
        }
        let support = probabilities
            .iter()
            .enumerate()
            .filter_map(|(cell, p)| (*p > 0.0).then_some(cell))
            .collect();
        Ok(Self {
            probabilities,
            support,
        })
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[must_use]
    pub fn probability(&self, cell: usize) -> f64 {
        self.probabilities.get(cell).copied().unwrap_or(0.0)
    }

    /// Natural log of [`probability`](Self::probability); `-∞` for impossible cells.
    #[must_use]
    pub fn log_probability(&self, cell: usize) -> f64 {
        self.probability(cell).ln()
    }

    /// Samples a cell by inverting the cumulative distribution at `u ∈ [0, 1)`.
    ///
    /// Never returns a cell with zero probability, even when rounding leaves
    /// the cumulative sum slightly below one.
    #[must_use]
    pub fn sample(&self, u: f64) -> usize {
        let mut cumulative = 0.0;
        for &cell in &self.support {
            cumulative += self.probabilities[cell];
            if u < cumulative {
                return cell;
            }
        }
        *self
            .support
            .last()
            .expect("distribution always has a feasible cell with positive probability")
    }
}
