//! Move-scoring policies.
//!
//! A [`Policy`] looks at a [`BoardSnapshot`] and returns one score per cell,
//! from the point of view of the player about to move: a larger score means
//! the mover prefers that cell. The [`MoveDistribution`](crate::MoveDistribution)
//! turns the scores into probabilities, so policies never need to know which
//! cells are feasible. Scores of occupied cells are simply ignored.
//!
//! Scores may be `f64::NEG_INFINITY` to rule a cell out completely; this is
//! how the scripted policies become deterministic.
//!
//! # Variants
//!
//! - [`RandomPolicy`] - flat scores, i.e. uniform over feasible cells
//! - [`FirstFeasiblePolicy`] - always the lowest empty cell index
//! - [`ScriptedPolicy`] - a fixed preference list
//! - [`LinearPolicy`] - learned linear scorer, the one the optimizer trains

use std::fmt;

use hexevo_engine::{Axis, BoardConfig, BoardSnapshot, Cell, Player};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParameterError {
    #[display("expected {expected} parameters, got {found}")]
    CountMismatch { expected: usize, found: usize },
    #[display("parameter {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
}

/// Scores candidate moves for the player to move.
pub trait Policy: fmt::Debug + Send + Sync {
    /// Returns one score per cell of `snapshot`, from `player`'s point of view.
    fn score_moves(&self, snapshot: &BoardSnapshot, player: Player) -> Vec<f64>;

    /// Length of the parameter vector accepted by [`set_parameters`](Self::set_parameters).
    fn num_parameters(&self) -> usize {
        0
    }

    fn parameters(&self) -> Vec<f64> {
        vec![]
    }

    /// Replaces the policy's parameters.
    ///
    /// Policies without parameters accept only the empty slice.
    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), ParameterError> {
        check_parameters(parameters, self.num_parameters())
    }
}

fn check_parameters(parameters: &[f64], expected: usize) -> Result<(), ParameterError> {
    if parameters.len() != expected {
        return Err(ParameterError::CountMismatch {
            expected,
            found: parameters.len(),
        });
    }
    if let Some((index, value)) = parameters
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(ParameterError::NonFinite { index, value });
    }
    Ok(())
}

/// Uniformly random play.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl Policy for RandomPolicy {
    fn score_moves(&self, snapshot: &BoardSnapshot, _player: Player) -> Vec<f64> {
        vec![0.0; snapshot.num_cells()]
    }
}

/// Deterministically plays the empty cell with the lowest index.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFeasiblePolicy;

impl Policy for FirstFeasiblePolicy {
    fn score_moves(&self, snapshot: &BoardSnapshot, _player: Player) -> Vec<f64> {
        let mut scores = vec![f64::NEG_INFINITY; snapshot.num_cells()];
        if let Some(first) = snapshot.empty_cells().next() {
            scores[first] = 0.0;
        }
        scores
    }
}

/// Plays the first still-empty cell of a fixed preference list.
///
/// Once every listed cell is taken the policy falls back to uniform play.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedPolicy {
    preferences: Vec<usize>,
}

impl ScriptedPolicy {
    #[must_use]
    pub fn new(preferences: Vec<usize>) -> Self {
        Self { preferences }
    }

    #[must_use]
    pub fn preferences(&self) -> &[usize] {
        &self.preferences
    }
}

impl Policy for ScriptedPolicy {
    fn score_moves(&self, snapshot: &BoardSnapshot, _player: Player) -> Vec<f64> {
        let next = self
            .preferences
            .iter()
            .copied()
            .find(|&cell| cell < snapshot.num_cells() && snapshot.cell(cell).is_empty());
        match next {
            Some(cell) => {
                let mut scores = vec![f64::NEG_INFINITY; snapshot.num_cells()];
                scores[cell] = 0.0;
                scores
            }
            None => vec![0.0; snapshot.num_cells()],
        }
    }
}

/// Learned linear move scorer.
///
/// The board is encoded in the mover's canonical orientation: if the mover
/// connects columns, the snapshot is transposed first, so the policy always
/// sees itself connecting rows. The encoding has two channels of `N²` inputs,
/// the mover's stones followed by the opponent's stones (`1.0` for a stone,
/// `0.0` otherwise).
///
/// ```text
/// score[j] = bias[j] + Σ_k weights[j][k] · input[k]     (j < N², k < 2N²)
/// ```
///
/// Canonical scores are mapped back to board indices before they are
/// returned. The parameter vector is the row-major weight matrix followed by
/// the bias, `2N⁴ + N²` values in total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPolicy {
    size: usize,
    a_connects: Axis,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl LinearPolicy {
    /// Creates a policy with all parameters set to zero (uniform play).
    #[must_use]
    pub fn zeroed(config: &BoardConfig) -> Self {
        let num_cells = config.size * config.size;
        Self {
            size: config.size,
            a_connects: config.a_connects,
            weights: vec![0.0; num_cells * 2 * num_cells],
            bias: vec![0.0; num_cells],
        }
    }

    pub fn from_parameters(config: &BoardConfig, parameters: &[f64]) -> Result<Self, ParameterError> {
        let mut policy = Self::zeroed(config);
        policy.set_parameters(parameters)?;
        Ok(policy)
    }

    /// Number of parameters of a policy for `size`×`size` boards.
    #[must_use]
    pub const fn parameter_count(size: usize) -> usize {
        let num_cells = size * size;
        num_cells * 2 * num_cells + num_cells
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    fn is_transposed_for(&self, player: Player) -> bool {
        let axis = match player {
            Player::A => self.a_connects,
            Player::B => self.a_connects.other(),
        };
        axis == Axis::Columns
    }

    fn encode(&self, snapshot: &BoardSnapshot, player: Player, transposed: bool) -> Vec<f64> {
        let canonical_snapshot;
        let canonical = if transposed {
            canonical_snapshot = snapshot.transposed();
            &canonical_snapshot
        } else {
            snapshot
        };
        let num_cells = self.size * self.size;
        let mut input = vec![0.0; 2 * num_cells];
        for (index, cell) in canonical.cells().iter().enumerate() {
            match *cell {
                Cell::Empty => {}
                Cell::Stone(owner) if owner == player => input[index] = 1.0,
                Cell::Stone(_) => input[num_cells + index] = 1.0,
            }
        }
        input
    }

    /// Board index of a canonical index; transposition is its own inverse.
    fn board_index(&self, canonical: usize, transposed: bool) -> usize {
        if transposed {
            let (row, column) = (canonical / self.size, canonical % self.size);
            column * self.size + row
        } else {
            canonical
        }
    }
}

impl Policy for LinearPolicy {
    /// # Panics
    ///
    /// Panics if `snapshot` does not have the policy's board size.
    fn score_moves(&self, snapshot: &BoardSnapshot, player: Player) -> Vec<f64> {
        assert_eq!(snapshot.size(), self.size, "board size mismatch");
        let num_cells = self.size * self.size;
        let transposed = self.is_transposed_for(player);
        let input = self.encode(snapshot, player, transposed);

        let mut scores = vec![0.0; num_cells];
        for (canonical, row) in self.weights.chunks_exact(2 * num_cells).enumerate() {
            let activation = row
                .iter()
                .zip(&input)
                .map(|(w, x)| w * x)
                .sum::<f64>();
            scores[self.board_index(canonical, transposed)] = self.bias[canonical] + activation;
        }
        scores
    }

    fn num_parameters(&self) -> usize {
        self.weights.len() + self.bias.len()
    }

    fn parameters(&self) -> Vec<f64> {
        let mut parameters = Vec::with_capacity(self.num_parameters());
        parameters.extend_from_slice(&self.weights);
        parameters.extend_from_slice(&self.bias);
        parameters
    }

    fn set_parameters(&mut self, parameters: &[f64]) -> Result<(), ParameterError> {
        check_parameters(parameters, self.num_parameters())?;
        let (weights, bias) = parameters.split_at(self.weights.len());
        self.weights.copy_from_slice(weights);
        self.bias.copy_from_slice(bias);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argmax(scores: &[f64]) -> usize {
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap()
            .0
    }

    #[test]
    fn test_first_feasible_skips_occupied_cells() {
        let snapshot: BoardSnapshot = "A B .\n. . .\n. . .".parse().unwrap();
        let scores = FirstFeasiblePolicy.score_moves(&snapshot, Player::A);
        assert_eq!(argmax(&scores), 2);
        assert_eq!(scores.iter().filter(|s| s.is_finite()).count(), 1);
    }

    #[test]
    fn test_scripted_policy_follows_list_then_falls_back() {
        let policy = ScriptedPolicy::new(vec![4, 0, 99]);
        let snapshot: BoardSnapshot = "A . .\n. B .\n. . .".parse().unwrap();
        // 4 and 0 are taken, 99 is off the board
        let scores = policy.score_moves(&snapshot, Player::A);
        assert!(scores.iter().all(|s| *s == 0.0));

        let snapshot = BoardSnapshot::empty(3);
        let scores = policy.score_moves(&snapshot, Player::B);
        assert_eq!(argmax(&scores), 4);
    }

    #[test]
    fn test_parameterless_policies_reject_parameters() {
        let mut policy = RandomPolicy;
        assert_eq!(policy.num_parameters(), 0);
        assert!(policy.set_parameters(&[]).is_ok());
        assert_eq!(
            policy.set_parameters(&[1.0]),
            Err(ParameterError::CountMismatch {
                expected: 0,
                found: 1
            })
        );
    }

    #[test]
    fn test_linear_parameter_layout() {
        let config = BoardConfig::with_size(3);
        let mut policy = LinearPolicy::zeroed(&config);
        assert_eq!(policy.num_parameters(), LinearPolicy::parameter_count(3));
        assert_eq!(policy.num_parameters(), 9 * 18 + 9);

        let parameters: Vec<f64> = (0..policy.num_parameters()).map(|i| i as f64).collect();
        policy.set_parameters(&parameters).unwrap();
        assert_eq!(policy.parameters(), parameters);

        let mut bad = parameters.clone();
        bad[5] = f64::NAN;
        assert!(matches!(
            policy.set_parameters(&bad),
            Err(ParameterError::NonFinite { index: 5, .. })
        ));
        assert!(policy.set_parameters(&parameters[1..]).is_err());
    }

    #[test]
    fn test_linear_bias_is_canonical_for_both_players() {
        let config = BoardConfig::with_size(3);
        let mut parameters = vec![0.0; LinearPolicy::parameter_count(3)];
        // prefer canonical cell (0, 1)
        parameters[9 * 18 + 1] = 5.0;
        let policy = LinearPolicy::from_parameters(&config, &parameters).unwrap();
        let snapshot = BoardSnapshot::empty(3);

        // A connects rows: no transposition
        assert_eq!(argmax(&policy.score_moves(&snapshot, Player::A)), 1);
        // B connects columns: canonical (0, 1) is board (1, 0)
        assert_eq!(argmax(&policy.score_moves(&snapshot, Player::B)), 3);
    }

    #[test]
    fn test_linear_channels_are_relative_to_mover() {
        let config = BoardConfig::with_size(2);
        let mut parameters = vec![0.0; LinearPolicy::parameter_count(2)];
        // output 3 reacts to an own stone on input 0,
        // output 2 reacts to an opponent stone on input 0
        parameters[3 * 8] = 1.0;
        parameters[2 * 8 + 4] = 1.0;
        let policy = LinearPolicy::from_parameters(&config, &parameters).unwrap();

        let snapshot: BoardSnapshot = "A .\n. .".parse().unwrap();
        assert_eq!(argmax(&policy.score_moves(&snapshot, Player::A)), 3);
        // for B the board is transposed, cell 0 stays in place and output 2 maps to cell 1
        assert_eq!(argmax(&policy.score_moves(&snapshot, Player::B)), 1);
    }

    #[test]
    fn test_linear_transposed_mover_sees_transposed_board() {
        let parameters: Vec<f64> = (0..LinearPolicy::parameter_count(3))
            .map(|i| (i as f64 * 0.37).sin())
            .collect();
        // B connects columns here and rows in `by_rows`
        let by_columns =
            LinearPolicy::from_parameters(&BoardConfig::with_size(3), &parameters).unwrap();
        let by_rows = LinearPolicy::from_parameters(
            &BoardConfig {
                a_connects: Axis::Columns,
                ..BoardConfig::with_size(3)
            },
            &parameters,
        )
        .unwrap();

        let snapshot: BoardSnapshot = "A . B\n. . A\nB . .".parse().unwrap();
        let scores = by_columns.score_moves(&snapshot, Player::B);
        let canonical = by_rows.score_moves(&snapshot.transposed(), Player::B);
        for row in 0..3 {
            for column in 0..3 {
                assert_eq!(scores[row * 3 + column], canonical[column * 3 + row]);
            }
        }
    }
}
