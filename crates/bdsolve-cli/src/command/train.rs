use std::path::PathBuf;

use anyhow::Context as _;
use bdsolve_training::{
    genetic::EvolutionParams,
    trainer::{Trainer, TrainerConfig},
};
use chrono::Utc;
use rand::Rng as _;

use crate::{model::genome_model::GenomeModel, util};

const DEFAULT_GENERATIONS: usize = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations to evolve
    #[arg(long, default_value_t = DEFAULT_GENERATIONS)]
    generations: usize,
    /// Number of genomes per generation
    #[arg(long, default_value_t = EvolutionParams::default().population_size)]
    population: usize,
    /// Maximum number of rounds per game (unlimited if omitted)
    #[arg(long)]
    round_limit: Option<usize>,
    /// Random seed (drawn from the OS if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Name stored in the saved model
    #[arg(long, default_value = "genetic")]
    name: String,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Print the effective training configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        generations,
        population,
        round_limit,
        seed,
        name,
        output,
        print_config,
    } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let config = TrainerConfig {
        evolution: EvolutionParams {
            population_size: *population,
            ..EvolutionParams::default()
        },
        round_limit: *round_limit,
        seed,
        ..TrainerConfig::default()
    };
    if *print_config {
        return util::save_json(&config, None);
    }
    log::debug!("training config: {config:?}");
    let mut trainer = Trainer::new(config).context("Failed to set up training session")?;
    eprintln!("Training {population} genomes for {generations} generations (seed {seed})");

    for _ in 0..*generations {
        let summary = trainer.run_generation();
        let report = &summary.report;
        eprintln!("Generation #{}:", report.generation);
        eprintln!("  Average score: {:.2}", summary.average_score);
        eprintln!("  High score:    {}", summary.high_score);
        let rates = trainer.population().rate_stats();
        eprintln!(
            "  Best / worst:  #{} / #{} (rates {:.3} / {:.3})",
            report.best, report.worst, rates.best, rates.worst
        );
        eprintln!(
            "  Reborn:        {} ({} parents)",
            report.reborn.len(),
            report.parents.len()
        );
        if let Some(genome) = trainer.best_rate_genome() {
            eprintln!("  Best rate genome: {genome}");
        }
    }

    let population = trainer.population();
    let best = &population.individuals()[population.best_rate_index()];
    let model = GenomeModel {
        name: name.clone(),
        trained_at: Utc::now(),
        generations: population.generation(),
        seed,
        final_average_score: trainer.average_score(),
        success_rate: best.success_rate(),
        weights: GenomeModel::feature_weights(best.genome()),
    };
    util::save_json(&model, output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Success rate: {:.3}", model.success_rate);
    eprintln!("  Weights: {} features", model.weights.len());

    Ok(())
}
