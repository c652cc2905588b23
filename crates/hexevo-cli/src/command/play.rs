use std::path::PathBuf;

use anyhow::Context as _;
use hexevo_engine::{Board, BoardConfig, FirstPlayer};
use hexevo_evaluator::{MatchSimulator, Outcome, Policy, RandomPolicy};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

use crate::{model::PolicyModel, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Board size; taken from the models when they are given
    #[arg(long, default_value_t = hexevo_engine::DEFAULT_BOARD_SIZE)]
    size: usize,
    /// Model playing A (random policy when omitted)
    #[arg(long)]
    model: Option<PathBuf>,
    /// Model playing B (random policy when omitted)
    #[arg(long)]
    opponent: Option<PathBuf>,
    /// Random seed; drawn from the thread-local generator when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn policy_for(model: Option<&PolicyModel>, config: &BoardConfig) -> anyhow::Result<Box<dyn Policy>> {
    match model {
        Some(model) => Ok(Box::new(model.to_policy(config)?)),
        None => Ok(Box::new(RandomPolicy)),
    }
}

/// Board size implied by the models, falling back to `size`.
fn resolve_size(size: usize, models: &[&PolicyModel]) -> anyhow::Result<usize> {
    let mut sizes = models.iter().map(|m| m.board_size);
    let Some(first) = sizes.next() else {
        return Ok(size);
    };
    anyhow::ensure!(
        sizes.all(|s| s == first),
        "models were trained on different board sizes"
    );
    Ok(first)
}

/// Re-plays `outcome` on a fresh board, printing the board after every move.
fn print_match(config: BoardConfig, outcome: &Outcome) -> anyhow::Result<()> {
    let mut board = Board::new(BoardConfig {
        first_player: FirstPlayer::Fixed(outcome.first_player),
        ..config
    })?;
    println!("{} opens", outcome.first_player);
    for sample in &outcome.moves {
        let record = sample.record;
        board.place(record.cell, record.player)?;
        let (row, column) = board.coords(record.cell);
        println!();
        println!(
            "Move {}: {} plays ({row}, {column}), p = {:.3}",
            record.turn + 1,
            record.player,
            sample.log_prob.exp()
        );
        println!("{}", board.snapshot());
    }
    println!();
    println!("{} wins after {} moves", outcome.winner, outcome.num_moves());
    Ok(())
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        size,
        model,
        opponent,
        seed,
    } = arg;

    let load = |path: &Option<PathBuf>| path.as_ref().map(util::read_model_file).transpose();
    let models = [load(model)?, load(opponent)?];
    let size = resolve_size(*size, &models.iter().flatten().collect::<Vec<_>>())?;
    let config = BoardConfig {
        size,
        ..BoardConfig::default()
    };
    config.validate()?;
    let players = [
        policy_for(models[0].as_ref(), &config).context("Cannot use --model")?,
        policy_for(models[1].as_ref(), &config).context("Cannot use --opponent")?,
    ];

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    tracing::debug!(size, seed, "starting match");

    let mut simulator = MatchSimulator::new(config)?;
    let outcome = simulator.play_match([players[0].as_ref(), players[1].as_ref()], &mut rng)?;
    print_match(config, &outcome)
}
