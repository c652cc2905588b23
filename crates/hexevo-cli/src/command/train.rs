use std::path::PathBuf;

use anyhow::Context as _;
use hexevo_engine::{BoardConfig, FirstPlayer};
use hexevo_evaluator::{LinearPolicy, RandomPolicy};
use hexevo_training::{EsConfig, EvolutionStrategy, GenerationReport, SelfPlayOracle};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64Mcg;

use crate::{
    command::evaluate,
    model::PolicyModel,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Board size
    #[arg(long, default_value_t = hexevo_engine::DEFAULT_BOARD_SIZE)]
    pub(super) size: usize,
    /// Number of generations to run
    #[arg(long, default_value_t = 200)]
    pub(super) generations: u64,
    /// Random seed; overrides the seed of `--config`
    #[arg(long)]
    pub(super) seed: Option<u64>,
    /// Evolution strategy settings (JSON format)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Model name stored in the output file
    #[arg(long, default_value = "linear")]
    name: String,
    /// Output file path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the per-generation reports to this file (JSON format)
    #[arg(long)]
    report: Option<PathBuf>,
    /// Evaluate the mean policy against the random policy every K generations (0 disables)
    #[arg(long, default_value_t = 0)]
    eval_every: u64,
    /// Number of games per evaluation
    #[arg(long, default_value_t = 100)]
    eval_games: usize,
}

fn load_es_config(path: Option<&PathBuf>, seed: Option<u64>) -> anyhow::Result<EsConfig> {
    let mut config = match path {
        Some(path) => util::read_json_file("evolution strategy config", path)?,
        None => EsConfig {
            seed: rand::rng().random(),
            ..EsConfig::default()
        },
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    Ok(config)
}

fn log_generation(report: &GenerationReport) {
    tracing::info!(
        generation = report.generation,
        sigma = report.sigma,
        rate = report.rate,
        mu_eff = report.mu_eff,
        z_test = report.z_test,
        fitness_mean = report.fitness.mean,
        fitness_min = report.fitness.min,
        "generation finished"
    );
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        size,
        generations,
        seed,
        config,
        name,
        output,
        report,
        eval_every,
        eval_games,
    } = arg;

    let board = BoardConfig {
        size: *size,
        first_player: FirstPlayer::Random,
        ..BoardConfig::default()
    };
    let es_config = load_es_config(config.as_ref(), *seed)?;
    let seed = es_config.seed;
    let oracle = SelfPlayOracle::new(board, LinearPolicy::zeroed(&board))?;
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let start = oracle.propose_starting_point(&mut rng);
    let mut es = EvolutionStrategy::new(oracle.num_parameters(), start, es_config)
        .context("Failed to set up the evolution strategy")?;
    tracing::info!(
        size,
        seed,
        dimension = es.dimension(),
        population_size = es.population_size(),
        sigma = es.sigma(),
        "training started"
    );

    let mut reports = Vec::new();
    for _ in 0..*generations {
        let generation_report = es
            .step(&oracle)
            .with_context(|| format!("Generation {} failed", es.generation()))?;
        log_generation(&generation_report);
        reports.push(generation_report);

        if *eval_every > 0 && es.generation() % eval_every == 0 {
            let policy = oracle.policy(es.mean())?;
            let evaluation =
                evaluate::evaluate(board, &policy, &RandomPolicy, *eval_games, &mut rng)?;
            tracing::info!(
                generation = es.generation(),
                win_rate = evaluation.win_rate,
                "evaluated mean policy against random policy"
            );
        }
    }

    if let Some(path) = report {
        Output::save_json(&reports, Some(path.as_path()))?;
    }
    let model = PolicyModel::from_strategy(name.clone(), *size, &es);
    Output::save_json(&model, output.as_deref())?;
    tracing::info!(generations = es.generation(), "training finished");
    Ok(())
}
