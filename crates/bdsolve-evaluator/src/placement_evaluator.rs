//! Placement evaluation: the cost of a single piece placement.
//!
//! The [`GenomePlacementEvaluator`] views a genome as a single-layer linear model:
//!
//! ```text
//! cost = w₀·f₀ + w₁·f₁ + ... + w₇·f₇
//! ```
//!
//! where `fᵢ` are the [`BoardFeature`]s of the board after the placement. The turn evaluator
//! prefers the placement whose cost has the smallest magnitude.

use std::fmt;

use bdsolve_engine::{Board, Piece, Position};

use crate::{board_feature::BoardFeature, genome::Genome};

/// Assigns a cost to a piece placement.
pub trait PlacementEvaluator: fmt::Debug {
    /// Returns the cost of placing `piece` at `position` on `board`.
    ///
    /// `position` must be legal for `board`; the board itself is not modified.
    fn evaluate_placement(&self, board: &Board, piece: &Piece, position: Position) -> f32;
}

/// Placement evaluator weighting [`BoardFeature`]s by a borrowed [`Genome`].
#[derive(Debug, Clone, Copy)]
pub struct GenomePlacementEvaluator<'a> {
    genome: &'a Genome,
}

impl<'a> GenomePlacementEvaluator<'a> {
    #[must_use]
    pub fn new(genome: &'a Genome) -> Self {
        Self { genome }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        self.genome
    }
}

impl PlacementEvaluator for GenomePlacementEvaluator<'_> {
    fn evaluate_placement(&self, board: &Board, piece: &Piece, position: Position) -> f32 {
        // Features are measured before any subset is cleared.
        let mut probe = board.clone();
        probe.place(piece, position);
        self.genome
            .weighted_sum(&BoardFeature::compute_all(&probe, piece))
    }
}

#[cfg(test)]
mod tests {
    use bdsolve_engine::PieceShape;

    use super::*;

    #[test]
    fn test_bias_only_genome() {
        let genome = Genome::from_fn(|i| {
            if i == BoardFeature::Bias as usize {
                -2.5
            } else {
                0.0
            }
        });
        let evaluator = GenomePlacementEvaluator::new(&genome);
        let board = Board::default();
        let plus = PieceShape::Plus.piece();
        let cost = evaluator.evaluate_placement(&board, &plus, Position::new(3, 3));
        assert!((cost + 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_board_is_not_modified() {
        let genome = Genome::new([1.0; 8]);
        let evaluator = GenomePlacementEvaluator::new(&genome);
        let board = Board::default();
        let square = PieceShape::Square.piece();
        let _ = evaluator.evaluate_placement(&board, &square, Position::new(0, 0));
        assert_eq!(board, Board::default());
    }

    #[test]
    fn test_features_ignore_clearing() {
        // Completing a row must be visible as subset occupation, not as an emptied board.
        let occupation_only = Genome::from_fn(|i| {
            if i == BoardFeature::Occupation as usize {
                1.0
            } else {
                0.0
            }
        });
        let subset_only = Genome::from_fn(|i| {
            if i == BoardFeature::SubsetOccupation as usize {
                1.0
            } else {
                0.0
            }
        });
        let mut board = Board::default();
        board.row_mut(0)[..6].fill(1);
        let line = PieceShape::Line3.piece();

        let cost = GenomePlacementEvaluator::new(&occupation_only).evaluate_placement(
            &board,
            &line,
            Position::new(0, 6),
        );
        assert!((cost - 0.11).abs() < 1e-6);

        let cost = GenomePlacementEvaluator::new(&subset_only).evaluate_placement(
            &board,
            &line,
            Position::new(0, 6),
        );
        assert!((cost - 0.04).abs() < 1e-6);
    }
}
