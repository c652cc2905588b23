use std::path::PathBuf;

use anyhow::Context as _;
use hexevo_engine::{BoardConfig, FirstPlayer, Player};
use hexevo_evaluator::{MatchSimulator, Policy, RandomPolicy};
use hexevo_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Path to the model file (JSON format)
    #[arg(long)]
    model: PathBuf,
    /// Number of games to play
    #[arg(long, default_value_t = 200)]
    games: usize,
    /// Random seed; drawn from the thread-local generator when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Result of a series of games between a policy and an opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Evaluation {
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub wins_as_a: usize,
    pub wins_as_b: usize,
    /// Number of stones placed per game.
    pub game_length: Option<DescriptiveStats>,
}

/// Plays `games` matches, switching sides every game.
///
/// `policy` plays [`Player::A`] in even-numbered games and [`Player::B`] in
/// odd-numbered ones.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn evaluate<R>(
    config: BoardConfig,
    policy: &dyn Policy,
    opponent: &dyn Policy,
    games: usize,
    rng: &mut R,
) -> anyhow::Result<Evaluation>
where
    R: Rng + ?Sized,
{
    let mut simulator = MatchSimulator::new(config)?;
    let mut wins_by_side = [0; 2];
    let mut lengths = Vec::with_capacity(games);
    for game in 0..games {
        let side = if game % 2 == 0 { Player::A } else { Player::B };
        let policies = match side {
            Player::A => [policy, opponent],
            Player::B => [opponent, policy],
        };
        let outcome = simulator
            .play_match(policies, rng)
            .with_context(|| format!("Game {game} failed"))?;
        if outcome.winner == side {
            wins_by_side[side.index()] += 1;
        }
        lengths.push(outcome.num_moves() as f64);
    }

    let wins: usize = wins_by_side.iter().sum();
    let win_rate = if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    };
    Ok(Evaluation {
        games,
        wins,
        win_rate,
        wins_as_a: wins_by_side[Player::A.index()],
        wins_as_b: wins_by_side[Player::B.index()],
        game_length: DescriptiveStats::new(lengths),
    })
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        model,
        games,
        seed,
        output,
    } = arg;

    let model = util::read_model_file(model)?;
    let config = model.board_config(BoardConfig {
        first_player: FirstPlayer::Random,
        ..BoardConfig::default()
    });
    let policy = model.to_policy(&config)?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64Mcg::seed_from_u64(seed);

    tracing::info!(model = %model.name, games, seed, "evaluating against random policy");
    let evaluation = evaluate(config, &policy, &RandomPolicy, *games, &mut rng)?;
    tracing::info!(
        wins = evaluation.wins,
        win_rate = evaluation.win_rate,
        "evaluation finished"
    );
    Output::save_json(&evaluation, output.as_deref())
}
