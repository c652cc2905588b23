//! Match simulation: playing complete games between two policies.
//!
//! # How It Works
//!
//! A match alternates between the two sides until the board reports a win:
//!
//! 1. **Score** - the side to move scores every cell of the current snapshot
//! 2. **Distribute** - scores become a [`MoveDistribution`] over the empty cells
//! 3. **Sample** - a uniform draw from the match's rng picks the cell
//! 4. **Place** - the stone goes on the board, which answers with a [`WinSignal`]
//!
//! Every placement is logged as a [`MoveSample`] together with the snapshot
//! the policy saw and the log-probability of the chosen cell. That log is
//! what makes [`Outcome::log_importance_weight`] possible: the same game can
//! be re-weighted under a different pair of policies without replaying it.
//!
//! # Termination
//!
//! A full Hex board always contains exactly one winning chain, so a match
//! ends after at most `N²` placements. The simulator still enforces that bound
//! and reports [`MatchError::NoWinner`] instead of looping forever.

use hexevo_engine::{
    Board, BoardConfig, BoardConfigError, BoardSnapshot, InvalidMove, MoveRecord, Player,
    WinSignal,
};
use rand::Rng;

use crate::{
    move_distribution::{DistributionError, MoveDistribution},
    policy::Policy,
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MatchError {
    #[display("invalid move during match: {_0}")]
    InvalidMove(InvalidMove),
    #[display("invalid move distribution: {_0}")]
    Distribution(DistributionError),
    #[display("no winner after {placements} placements")]
    #[from(ignore)]
    NoWinner { placements: usize },
}

/// One logged placement of a match.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveSample {
    pub record: MoveRecord,
    /// Board as the mover saw it, before the placement.
    pub snapshot: BoardSnapshot,
    /// Log-probability the mover's distribution assigned to the chosen cell.
    pub log_prob: f64,
}

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub winner: Player,
    pub first_player: Player,
    pub moves: Vec<MoveSample>,
}

impl Outcome {
    /// `1.0` if `player` won, `0.0` otherwise.
    #[must_use]
    pub fn score_for(&self, player: Player) -> f64 {
        if self.winner == player { 1.0 } else { 0.0 }
    }

    #[must_use]
    pub fn num_moves(&self) -> usize {
        self.moves.len()
    }

    /// Log of the likelihood ratio of this game under `policies` versus the
    /// policies that played it.
    ///
    /// Sums `log p_alt(move) - log p_recorded(move)` over every logged move,
    /// where `policies[p.index()]` plays for player `p`. The result is `-∞`
    /// if the alternative policies could not have produced the game.
    pub fn log_importance_weight(&self, policies: [&dyn Policy; 2]) -> Result<f64, DistributionError> {
        self.moves
            .iter()
            .map(|sample| log_ratio(sample, policies))
            .sum()
    }

    /// Same as [`log_importance_weight`](Self::log_importance_weight) but for
    /// the last logged move alone. Returns `0.0` for an empty log.
    pub fn last_move_log_importance_weight(
        &self,
        policies: [&dyn Policy; 2],
    ) -> Result<f64, DistributionError> {
        self.moves
            .last()
            .map_or(Ok(0.0), |sample| log_ratio(sample, policies))
    }
}

fn log_ratio(sample: &MoveSample, policies: [&dyn Policy; 2]) -> Result<f64, DistributionError> {
    let player = sample.record.player;
    let distribution = move_distribution(policies[player.index()], &sample.snapshot, player)?;
    Ok(distribution.log_probability(sample.record.cell) - sample.log_prob)
}

/// Distribution of `policy` over the empty cells of `snapshot`.
///
/// The policy must return exactly one score per cell, occupied or not.
fn move_distribution(
    policy: &dyn Policy,
    snapshot: &BoardSnapshot,
    player: Player,
) -> Result<MoveDistribution, DistributionError> {
    let scores = policy.score_moves(snapshot, player);
    if scores.len() != snapshot.num_cells() {
        return Err(DistributionError::LengthMismatch {
            expected: snapshot.num_cells(),
            found: scores.len(),
        });
    }
    let feasible: Vec<usize> = snapshot.empty_cells().collect();
    MoveDistribution::from_scores(&scores, &feasible)
}

/// Plays matches on a board it owns exclusively.
#[derive(Debug, Clone)]
pub struct MatchSimulator {
    board: Board,
}

impl MatchSimulator {
    pub fn new(config: BoardConfig) -> Result<Self, BoardConfigError> {
        Ok(Self {
            board: Board::new(config)?,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plays one match; `policies[p.index()]` plays for player `p`.
    ///
    /// The board is reset first (resolving the opening player with `rng`),
    /// and all move sampling draws from `rng`, so a seeded generator makes the
    /// match reproducible.
    pub fn play_match<R>(
        &mut self,
        policies: [&dyn Policy; 2],
        rng: &mut R,
    ) -> Result<Outcome, MatchError>
    where
        R: Rng + ?Sized,
    {
        self.board.reset_with(rng);
        let first_player = self.board.first_player();
        let turn_limit = self.board.num_cells();
        let mut moves = Vec::with_capacity(turn_limit);

        for _ in 0..turn_limit {
            let player = self.board.to_move();
            let snapshot = self.board.snapshot();
            let distribution = move_distribution(policies[player.index()], &snapshot, player)?;
            let cell = distribution.sample(rng.random::<f64>());
            let log_prob = distribution.log_probability(cell);

            let signal = self.board.place(cell, player)?;
            let record = *self
                .board
                .history()
                .last()
                .expect("successful placement is always logged");
            tracing::trace!(%player, cell, log_prob, "placed stone");
            moves.push(MoveSample {
                record,
                snapshot,
                log_prob,
            });

            if let WinSignal::Won(winner) = signal {
                tracing::debug!(%winner, %first_player, moves = moves.len(), "match finished");
                return Ok(Outcome {
                    winner,
                    first_player,
                    moves,
                });
            }
        }
        Err(MatchError::NoWinner {
            placements: moves.len(),
        })
    }

    /// Forwards to [`Outcome::log_importance_weight`].
    #[expect(clippy::unused_self)]
    pub fn log_importance_weight(
        &self,
        outcome: &Outcome,
        policies: [&dyn Policy; 2],
    ) -> Result<f64, DistributionError> {
        outcome.log_importance_weight(policies)
    }
}

#[cfg(test)]
mod tests {
    use hexevo_engine::{Axis, FirstPlayer};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::policy::{FirstFeasiblePolicy, RandomPolicy, ScriptedPolicy};

    /// Returns `num_cells + extra` scores; negative `extra` drops trailing cells.
    #[derive(Debug)]
    struct MisSizedPolicy {
        extra: isize,
    }

    impl Policy for MisSizedPolicy {
        fn score_moves(&self, snapshot: &BoardSnapshot, _player: Player) -> Vec<f64> {
            let len = snapshot.num_cells().saturating_add_signed(self.extra);
            vec![0.0; len]
        }
    }

    #[test]
    fn test_first_feasible_match_terminates() {
        for size in 1..=6 {
            let mut simulator = MatchSimulator::new(BoardConfig::with_size(size)).unwrap();
            let mut rng = Pcg64Mcg::seed_from_u64(1);
            let policy = FirstFeasiblePolicy;
            let outcome = simulator.play_match([&policy, &policy], &mut rng).unwrap();
            assert!(outcome.num_moves() <= size * size);
            assert_eq!(simulator.board().winner(), Some(outcome.winner));
            // both sides are deterministic
            assert!(outcome.moves.iter().all(|m| m.log_prob == 0.0));
            for (i, sample) in outcome.moves.iter().enumerate() {
                assert_eq!(sample.record.cell, i);
                assert_eq!(sample.record.turn, i);
            }
        }
    }

    #[test]
    fn test_deterministic_matches_repeat() {
        let config = BoardConfig::with_size(3);
        let mut simulator = MatchSimulator::new(config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let policy = FirstFeasiblePolicy;
        let first = simulator.play_match([&policy, &policy], &mut rng).unwrap();
        let second = simulator.play_match([&policy, &policy], &mut rng).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_moves_alternate() {
        let config = BoardConfig {
            size: 5,
            first_player: FirstPlayer::Random,
            a_connects: Axis::Columns,
        };
        let mut simulator = MatchSimulator::new(config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(17);
        let policy = RandomPolicy;
        for _ in 0..50 {
            let outcome = simulator.play_match([&policy, &policy], &mut rng).unwrap();
            let mut expected = outcome.first_player;
            for sample in &outcome.moves {
                assert_eq!(sample.record.player, expected);
                assert!(sample.snapshot.cell(sample.record.cell).is_empty());
                expected = expected.opponent();
            }
            let last = outcome.moves.last().unwrap();
            assert_eq!(last.record.player, outcome.winner);
            assert_eq!(outcome.score_for(outcome.winner), 1.0);
            assert_eq!(outcome.score_for(outcome.winner.opponent()), 0.0);
        }
    }

    #[test]
    fn test_seeded_matches_are_reproducible() {
        let config = BoardConfig::with_size(4);
        let policy = RandomPolicy;
        let play = |seed| {
            let mut simulator = MatchSimulator::new(config).unwrap();
            let mut rng = Pcg64Mcg::seed_from_u64(seed);
            simulator.play_match([&policy, &policy], &mut rng).unwrap()
        };
        assert_eq!(play(5), play(5));
    }

    #[test]
    fn test_importance_weight_is_zero_for_same_policies() {
        let config = BoardConfig::with_size(4);
        let mut simulator = MatchSimulator::new(config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let policy = RandomPolicy;
        let outcome = simulator.play_match([&policy, &policy], &mut rng).unwrap();
        let weight = simulator
            .log_importance_weight(&outcome, [&policy, &policy])
            .unwrap();
        assert!(weight.abs() < 1e-9);
    }

    #[test]
    fn test_importance_weight_against_deterministic_policy() {
        let config = BoardConfig::with_size(3);
        let mut simulator = MatchSimulator::new(config).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(8);
        let deterministic = FirstFeasiblePolicy;
        let random = RandomPolicy;
        let outcome = simulator
            .play_match([&deterministic, &deterministic], &mut rng)
            .unwrap();

        // a uniform player picks cell k among 9 - k empty cells with 1 / (9 - k)
        let weight = outcome
            .log_importance_weight([&random, &random])
            .unwrap();
        let expected: f64 = (0..outcome.num_moves())
            .map(|k| -((9 - k) as f64).ln())
            .sum();
        assert!((weight - expected).abs() < 1e-9);

        let last = outcome
            .last_move_log_importance_weight([&random, &random])
            .unwrap();
        let k = outcome.num_moves() - 1;
        assert!((last + ((9 - k) as f64).ln()).abs() < 1e-9);

        // a scripted player that never picks cell 0 cannot have played this game
        let scripted = ScriptedPolicy::new(vec![8]);
        let weight = outcome
            .log_importance_weight([&scripted, &deterministic])
            .unwrap();
        assert_eq!(weight, f64::NEG_INFINITY);
    }

    #[test]
    fn test_too_many_scores_are_rejected() {
        let mut simulator = MatchSimulator::new(BoardConfig::with_size(3)).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(0);
        let padded = MisSizedPolicy { extra: 7 };
        let err = simulator
            .play_match([&padded, &padded], &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            MatchError::Distribution(DistributionError::LengthMismatch {
                expected: 9,
                found: 16
            })
        ));
    }

    #[test]
    fn test_too_few_scores_are_rejected() {
        // the missing trailing cell is occupied, so no feasible cell is out
        // of range and only the length check catches the short vector
        let snapshot: BoardSnapshot = ". . .\n. A .\n. . B".parse().unwrap();
        let short = MisSizedPolicy { extra: -1 };
        assert_eq!(
            move_distribution(&short, &snapshot, Player::A),
            Err(DistributionError::LengthMismatch {
                expected: 9,
                found: 8
            })
        );
        let exact = MisSizedPolicy { extra: 0 };
        let distribution = move_distribution(&exact, &snapshot, Player::A).unwrap();
        assert_eq!(distribution.log_probability(8), f64::NEG_INFINITY);
    }

    #[test]
    fn test_importance_weight_rejects_wrong_score_count() {
        let mut simulator = MatchSimulator::new(BoardConfig::with_size(3)).unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let outcome = simulator
            .play_match([&RandomPolicy, &RandomPolicy], &mut rng)
            .unwrap();
        let padded = MisSizedPolicy { extra: 1 };
        assert_eq!(
            outcome.log_importance_weight([&padded, &RandomPolicy]),
            Err(DistributionError::LengthMismatch {
                expected: 9,
                found: 10
            })
        );
        assert_eq!(
            simulator.log_importance_weight(&outcome, [&RandomPolicy, &padded]),
            Err(DistributionError::LengthMismatch {
                expected: 9,
                found: 10
            })
        );
    }
}
