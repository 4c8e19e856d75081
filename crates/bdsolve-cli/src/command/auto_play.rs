use std::path::PathBuf;

use bdsolve_engine::{Board, PieceCatalog};
use bdsolve_evaluator::{genome::Genome, turn_evaluator::TurnEvaluator};
use bdsolve_training::gene;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Genome model file written by `train` (a random genome is used if omitted)
    #[arg(long)]
    genome: Option<PathBuf>,
    /// Maximum number of rounds (unlimited if omitted)
    #[arg(long)]
    round_limit: Option<usize>,
    /// Random seed (drawn from the OS if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Print the board after every round
    #[arg(long)]
    show_rounds: bool,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        genome,
        round_limit,
        seed,
        show_rounds,
    } = arg;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);

    let genome = match genome {
        Some(path) => {
            let model = util::read_genome_model_file(path)?;
            eprintln!("Loaded genome model {} ({})", model.name, path.display());
            model.to_genome()?
        }
        None => gene::random_genome(&mut rng),
    };
    eprintln!("Genome: {genome} (seed {seed})");

    let catalog = PieceCatalog::standard();
    let mut board = Board::default();
    let (rounds, score) = play(
        &genome,
        &catalog,
        &mut board,
        &mut rng,
        *round_limit,
        *show_rounds,
    );

    println!("{board}");
    println!();
    println!("Rounds: {rounds}");
    println!("Score:  {score}");
    Ok(())
}

fn play(
    genome: &Genome,
    catalog: &PieceCatalog,
    board: &mut Board,
    rng: &mut Pcg32,
    round_limit: Option<usize>,
    show_rounds: bool,
) -> (usize, usize) {
    let evaluator = TurnEvaluator::from_genome(genome);
    if !show_rounds {
        let stats = evaluator.play_game(board, catalog, rng, round_limit);
        return (stats.rounds(), stats.score());
    }

    let mut rounds = 0;
    let mut score = 0;
    while round_limit.is_none_or(|limit| rounds < limit) {
        let pieces = catalog.sample_three(rng);
        let Some(plan) = evaluator.select_best_turn(board, &pieces) else {
            println!("No legal move for the dealt pieces:");
            for piece in &pieces {
                println!("{piece}");
            }
            break;
        };
        let round_score = plan.apply(board);
        rounds += 1;
        score += round_score;
        println!("Round #{rounds}: +{round_score} (cost {:.2})", plan.cost());
        for mv in plan.moves() {
            let piece = mv.piece();
            println!(
                "  {}x{} piece at {}",
                piece.height(),
                piece.width(),
                mv.position()
            );
        }
        println!("{board}");
        println!();
    }
    (rounds, score)
}
