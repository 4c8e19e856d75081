//! Move selection for the block-placement puzzle.
//!
//! This crate turns a [`Genome`](genome::Genome) into a playing policy:
//!
//! 1. **Board Features** ([`board_feature`]) - Statistics of a hypothetical board after a
//!    placement (integrity, occupation, ...)
//! 2. **Placement Evaluation** ([`placement_evaluator`]) - Weighted sum of the features using
//!    the genome as weights
//! 3. **Turn Evaluation** ([`turn_evaluator`]) - Search over the orderings and positions of the
//!    three pieces dealt in a round, choosing the plan with the lowest total cost
//!
//! # Architecture
//!
//! ```text
//! Turn Evaluation (order + positions of 3 pieces)
//!     ↓ uses
//! Placement Evaluation (cost of one placement)
//!     ↓ uses
//! Board Features (statistics after placement)
//! ```
//!
//! # Example
//!
//! ```
//! use bdsolve_engine::{Board, PieceShape};
//! use bdsolve_evaluator::{genome::Genome, turn_evaluator::TurnEvaluator};
//!
//! let genome = Genome::new([1.0, 1.0, 1.0, 1.0, 0.5, -1.0, 2.0, 0.0]);
//! let evaluator = TurnEvaluator::from_genome(&genome);
//!
//! let mut board = Board::default();
//! let pieces = [
//!     PieceShape::Square.piece(),
//!     PieceShape::Line3.piece(),
//!     PieceShape::Dot.piece(),
//! ];
//! let score = evaluator.play(&mut board, &pieces).unwrap();
//! assert_eq!(score, 4 + 3 + 1);
//! ```
//!
//! # Current Limitations
//!
//! - **Linear policy**: The cost is a weighted sum of features and cannot capture feature
//!   interactions.
//! - **Greedy per piece**: Within one ordering each piece takes its individually cheapest
//!   position; combinations of positions are not searched.

pub mod board_feature;
pub mod genome;
pub mod placement_evaluator;
pub mod turn_evaluator;

/// None of the orderings of the dealt pieces can be fully placed.
///
/// This is the normal end of a game, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no legal placement for the dealt pieces")]
pub struct NoLegalMove;
