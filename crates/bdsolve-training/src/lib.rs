//! Training system for evolving placement genomes with a genetic algorithm.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a population of random genomes ([`genetic::Population`])
//! 2. **Evaluation** - Each genome plays one game; the game score is its raw fitness
//! 3. **Success rate** - Scores are normalized by the generation's best score and folded into
//!    a per-genome running mean
//! 4. **Rebirth** - Persistently weak genomes are replaced by children of strong ones
//! 5. **Repeat** - The [`trainer::Trainer`] drives this loop one round at a time
//!
//! # Architecture
//!
//! ```text
//! Trainer (session driver)
//!     ↓ plays rounds with
//! Turn Evaluator (bdsolve-evaluator)
//!     ↓ scores feed
//! Population (success rates, rebirth)
//!     ↓ breeds with
//! Gene operators (crossover, mutation)
//! ```
//!
//! # Example
//!
//! ```
//! use bdsolve_training::{
//!     genetic::EvolutionParams,
//!     trainer::{Trainer, TrainerConfig},
//! };
//!
//! let config = TrainerConfig {
//!     evolution: EvolutionParams {
//!         population_size: 4,
//!         ..EvolutionParams::default()
//!     },
//!     round_limit: Some(5),
//!     ..TrainerConfig::default()
//! };
//! let mut trainer = Trainer::new(config).unwrap();
//! let summary = trainer.run_generation();
//! assert_eq!(summary.report.generation, 0);
//! assert_eq!(trainer.average_scores().len(), 1);
//! ```

use bdsolve_engine::ShapeError;

pub mod gene;
pub mod genetic;
pub mod trainer;

/// Invalid [`EvolutionParams`](genetic::EvolutionParams).
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamError {
    #[display("population size must be positive")]
    EmptyPopulation,
    #[display("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[display("worst rate margin must be finite, got {value}")]
    InvalidMargin { value: f32 },
}

/// Failure to set up a training session.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid board: {_0}")]
    Shape(ShapeError),
    #[display("invalid evolution parameters: {_0}")]
    Params(ParamError),
}
