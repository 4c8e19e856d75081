//! Session driver: plays rounds for the genome under evaluation and advances the population.
//!
//! A [`Trainer`] owns the board, the piece catalog, the population and the random number
//! generator of one training session. Each call to [`Trainer::step`] plays a single round:
//!
//! - If the round is played, its score is added to the running game score.
//! - Otherwise (no legal move, or the round limit is hit) the game is over. The game score is
//!   recorded for the current genome, the board is reset, and the next genome takes over.
//!   After the last genome, a new generation is produced and the session statistics are
//!   refreshed.

use bdsolve_engine::{Board, BoardConfig, PieceCatalog, region::round_hundredths};
use bdsolve_evaluator::{genome::Genome, turn_evaluator::TurnEvaluator};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    TrainingError,
    genetic::{EvolutionParams, GenerationReport, Population},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub board: BoardConfig,
    pub evolution: EvolutionParams,
    /// Maximum number of rounds per game. `None` plays until no legal move remains.
    pub round_limit: Option<usize>,
    /// Seed of the session's random number generator.
    pub seed: u64,
}

/// What happened during one [`Trainer::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// A round was played and scored.
    RoundPlayed { score: usize },
    /// The game of genome `index` ended with `score`; the next genome starts.
    GenomeFinished { index: usize, score: usize },
    /// The last genome's game ended and a new generation was produced.
    GenerationFinished(GenerationSummary),
}

/// Session statistics after a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub report: GenerationReport,
    /// Mean game score of the generation, rounded to two decimals.
    pub average_score: f32,
    /// Highest game score of the generation.
    pub high_score: usize,
}

#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    board: Board,
    catalog: PieceCatalog,
    population: Population,
    rng: Pcg32,
    score: usize,
    rounds: usize,
    high_score: usize,
    average_scores: Vec<f32>,
    best_rate_genome: Option<Genome>,
    best_score_genome: Option<Genome>,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, TrainingError> {
        let board = Board::new(config.board)?;
        let catalog = PieceCatalog::standard();
        catalog.check_fits(&board)?;
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let population = Population::new(config.evolution, &mut rng)?;
        Ok(Self {
            config,
            board,
            catalog,
            population,
            rng,
            score: 0,
            rounds: 0,
            high_score: 0,
            average_scores: vec![],
            best_rate_genome: None,
            best_score_genome: None,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Score of the game in progress.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Highest game score of the last completed generation.
    #[must_use]
    pub fn high_score(&self) -> usize {
        self.high_score
    }

    /// Average game score of the last completed generation.
    #[must_use]
    pub fn average_score(&self) -> Option<f32> {
        self.average_scores.last().copied()
    }

    /// Average game score of every completed generation, oldest first.
    #[must_use]
    pub fn average_scores(&self) -> &[f32] {
        &self.average_scores
    }

    /// Genome with the highest success rate after the last completed generation.
    #[must_use]
    pub fn best_rate_genome(&self) -> Option<&Genome> {
        self.best_rate_genome.as_ref()
    }

    /// Genome with the highest game score in the last completed generation.
    #[must_use]
    pub fn best_score_genome(&self) -> Option<&Genome> {
        self.best_score_genome.as_ref()
    }

    /// Plays one round with the genome under evaluation.
    pub fn step(&mut self) -> StepEvent {
        if self
            .config
            .round_limit
            .is_none_or(|limit| self.rounds < limit)
        {
            let genome = *self.population.current_genome();
            let evaluator = TurnEvaluator::from_genome(&genome);
            let pieces = self.catalog.sample_three(&mut self.rng);
            if let Ok(score) = evaluator.play(&mut self.board, &pieces) {
                self.score += score;
                self.rounds += 1;
                return StepEvent::RoundPlayed { score };
            }
        }

        let index = self.population.current();
        let score = std::mem::take(&mut self.score);
        log::debug!(
            "genome {index} finished after {} rounds with score {score}",
            self.rounds
        );
        self.rounds = 0;
        self.board.reset();
        self.population.record_score(score);
        if !self.population.is_generation_complete() {
            return StepEvent::GenomeFinished { index, score };
        }
        StepEvent::GenerationFinished(self.finish_generation())
    }

    /// Steps until the current generation is complete.
    pub fn run_generation(&mut self) -> GenerationSummary {
        loop {
            if let StepEvent::GenerationFinished(summary) = self.step() {
                return summary;
            }
        }
    }

    fn finish_generation(&mut self) -> GenerationSummary {
        // Scores and success rates are read before rebirth replaces any genome.
        let individuals = self.population.individuals();
        self.high_score = individuals.iter().map(|ind| ind.score()).max().unwrap_or(0);
        self.best_score_genome =
            Some(*individuals[self.population.best_score_index()].genome());

        let report = self.population.new_generation(&mut self.rng);
        self.best_rate_genome = Some(
            *self.population.individuals()[self.population.best_rate_index()].genome(),
        );

        #[expect(clippy::cast_precision_loss)]
        let average_score =
            round_hundredths(report.score_sum as f32 / self.population.len() as f32);
        self.average_scores.push(average_score);
        log::info!(
            "generation {}: average score {average_score:.2}, high score {}, reborn {}",
            report.generation,
            self.high_score,
            report.reborn.len()
        );
        GenerationSummary {
            report,
            average_score,
            high_score: self.high_score,
        }
    }
}
