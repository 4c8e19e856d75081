//! Turn evaluation: choosing how to play the three pieces dealt in a round.
//!
//! # How It Works
//!
//! 1. **Enumerate Orderings** - All 6 orderings of the 3 pieces are tried (identical pieces
//!    are not deduplicated)
//! 2. **Place Greedily** - For each ordering, pieces are placed one by one on a probe copy of
//!    the board. Each piece takes the legal position whose placement cost has the smallest
//!    magnitude; full subsets are cleared on the probe before the next piece. An ordering
//!    with a piece that has no legal position is abandoned.
//! 3. **Select Plan** - The ordering with the smallest summed cost wins
//! 4. **Apply** - Only the winning plan is applied to the real board, scoring each piece's
//!    cell count plus the clearing score of the subsets it completes
//!
//! If no ordering can place all three pieces, the round fails with [`NoLegalMove`], which
//! ends the game.
//!
//! # Usage
//!
//! ```
//! use bdsolve_engine::{Board, PieceCatalog};
//! use bdsolve_evaluator::{genome::Genome, turn_evaluator::TurnEvaluator};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let genome = Genome::new([0.5, 0.5, 0.5, 1.0, -1.0, 0.2, -3.0, 0.0]);
//! let evaluator = TurnEvaluator::from_genome(&genome);
//! let catalog = PieceCatalog::standard();
//! let mut rng = Pcg32::seed_from_u64(1);
//!
//! let mut board = Board::default();
//! let stats = evaluator.play_game(&mut board, &catalog, &mut rng, Some(10));
//! assert!(stats.rounds() <= 10);
//! ```

use arrayvec::ArrayVec;
use bdsolve_engine::{Board, Piece, PieceCatalog, Position};
use rand::Rng;

use crate::{
    NoLegalMove,
    genome::Genome,
    placement_evaluator::{GenomePlacementEvaluator, PlacementEvaluator},
};

/// Number of pieces dealt per round.
pub const PIECES_PER_ROUND: usize = 3;

const PIECE_ORDERS: [[usize; PIECES_PER_ROUND]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// A single planned placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    piece: Piece,
    position: Position,
}

impl Move {
    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }
}

/// The chosen ordering and positions of the pieces of one round.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    moves: ArrayVec<Move, PIECES_PER_ROUND>,
    cost: f32,
}

impl TurnPlan {
    /// Returns the placements in the order they are applied.
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Returns the summed placement cost of this plan.
    #[must_use]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// Applies the plan to `board` and returns the round score.
    ///
    /// Each move scores its piece cell count plus the clearing score of the subsets that
    /// are full right after it.
    pub fn apply(&self, board: &mut Board) -> usize {
        let mut score = 0;
        for Move { piece, position } in &self.moves {
            debug_assert!(board.is_legal(piece, *position));
            score += board.place(piece, *position);
            score += board.reduce_subsets();
        }
        score
    }
}

/// Searches for the best way to play a round of pieces.
#[derive(Debug)]
pub struct TurnEvaluator<'a> {
    placement_evaluator: Box<dyn PlacementEvaluator + 'a>,
}

impl<'a> TurnEvaluator<'a> {
    #[must_use]
    pub fn new(placement_evaluator: Box<dyn PlacementEvaluator + 'a>) -> Self {
        Self {
            placement_evaluator,
        }
    }

    /// Creates a turn evaluator driven by `genome`.
    #[must_use]
    pub fn from_genome(genome: &'a Genome) -> Self {
        Self::new(Box::new(GenomePlacementEvaluator::new(genome)))
    }

    /// Returns the legal position of `piece` with the smallest cost magnitude, and that
    /// magnitude. The first position in row-major order wins ties.
    fn best_position(&self, board: &Board, piece: &Piece) -> Option<(Position, f32)> {
        let mut best: Option<(Position, f32)> = None;
        for position in board.legal_positions(piece) {
            let cost = self
                .placement_evaluator
                .evaluate_placement(board, piece, position)
                .abs();
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((position, cost));
            }
        }
        best
    }

    /// Plans the pieces of one ordering on a probe copy of `board`.
    fn plan_order(
        &self,
        board: &Board,
        pieces: &[Piece; PIECES_PER_ROUND],
        order: [usize; PIECES_PER_ROUND],
    ) -> Option<TurnPlan> {
        let mut probe = board.clone();
        let mut moves = ArrayVec::new();
        let mut cost = 0.0;
        for index in order {
            let piece = &pieces[index];
            let (position, piece_cost) = self.best_position(&probe, piece)?;
            probe.place(piece, position);
            probe.reduce_subsets();
            cost += piece_cost;
            moves.push(Move {
                piece: piece.clone(),
                position,
            });
        }
        Some(TurnPlan { moves, cost })
    }

    /// Selects the cheapest plan that places all `pieces`, or `None` if no ordering fits.
    ///
    /// On equal cost the earlier ordering wins.
    #[must_use]
    pub fn select_best_turn(
        &self,
        board: &Board,
        pieces: &[Piece; PIECES_PER_ROUND],
    ) -> Option<TurnPlan> {
        let mut best: Option<TurnPlan> = None;
        for order in PIECE_ORDERS {
            let Some(plan) = self.plan_order(board, pieces, order) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| plan.cost < b.cost) {
                best = Some(plan);
            }
        }
        best
    }

    /// Plays one round: selects the best plan and applies it to `board`.
    ///
    /// Returns the round score, or [`NoLegalMove`] (leaving `board` untouched) when the
    /// pieces cannot all be placed.
    pub fn play(
        &self,
        board: &mut Board,
        pieces: &[Piece; PIECES_PER_ROUND],
    ) -> Result<usize, NoLegalMove> {
        let plan = self.select_best_turn(board, pieces).ok_or(NoLegalMove)?;
        let score = plan.apply(board);
        log::trace!("round played: cost {:.2}, score {score}", plan.cost);
        Ok(score)
    }

    /// Plays rounds with freshly dealt pieces until no legal move remains or `round_limit`
    /// rounds have been played.
    pub fn play_game<R>(
        &self,
        board: &mut Board,
        catalog: &PieceCatalog,
        rng: &mut R,
        round_limit: Option<usize>,
    ) -> GameStats
    where
        R: Rng + ?Sized,
    {
        let mut stats = GameStats::default();
        while round_limit.is_none_or(|limit| stats.rounds < limit) {
            let pieces = catalog.sample_three(rng);
            match self.play(board, &pieces) {
                Ok(score) => stats.complete_round(score),
                Err(NoLegalMove) => {
                    stats.game_over = true;
                    break;
                }
            }
        }
        stats
    }
}

/// Outcome of a game played by [`TurnEvaluator::play_game`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStats {
    rounds: usize,
    score: usize,
    game_over: bool,
}

impl GameStats {
    fn complete_round(&mut self, score: usize) {
        self.rounds += 1;
        self.score += score;
    }

    /// Number of rounds completed.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Total score over all completed rounds.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    /// Whether the game ended because no legal move remained (rather than the round limit).
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use bdsolve_engine::PieceShape;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::board_feature::BoardFeature;

    use super::*;

    fn checkerboard() -> Board {
        let mut board = Board::default();
        for row in 0..board.size() {
            for (col, cell) in board.row_mut(row).iter_mut().enumerate() {
                *cell = u8::from((row + col) % 2 == 0);
            }
        }
        board
    }

    fn replay_is_legal(board: &Board, plan: &TurnPlan) -> bool {
        let mut board = board.clone();
        plan.moves().iter().all(|mv| {
            let legal = board.is_legal(mv.piece(), mv.position());
            board.place(mv.piece(), mv.position());
            board.reduce_subsets();
            legal
        })
    }

    #[test]
    fn test_empty_board_always_has_a_move() {
        let catalog = PieceCatalog::standard();
        let mut rng = Pcg32::seed_from_u64(42);
        let genomes = [
            Genome::new([1.0; 8]),
            Genome::new([-3.2, 4.1, 0.7, -9.9, 2.5, 0.3, -1.0, 5.0]),
        ];
        for genome in &genomes {
            let evaluator = TurnEvaluator::from_genome(genome);
            for _ in 0..10 {
                let pieces = catalog.sample_three(&mut rng);
                let mut board = Board::default();
                let score = evaluator.play(&mut board, &pieces).unwrap();
                let cells: usize = pieces.iter().map(Piece::cell_count).sum();
                assert!(score >= cells);
            }
        }
    }

    #[test]
    fn test_no_legal_move_leaves_board_untouched() {
        let genome = Genome::new([1.0; 8]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let square = PieceShape::Square.piece();
        let mut board = checkerboard();
        let before = board.clone();
        assert_eq!(
            evaluator.play(&mut board, &[square.clone(), square.clone(), square]),
            Err(NoLegalMove)
        );
        assert_eq!(board, before);
    }

    #[test]
    fn test_one_unplaceable_piece_fails_the_round() {
        let genome = Genome::new([1.0; 8]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let dot = PieceShape::Dot.piece();
        let board = checkerboard();
        let pieces = [dot.clone(), PieceShape::Line2.piece(), dot];
        assert!(evaluator.select_best_turn(&board, &pieces).is_none());
    }

    #[test]
    fn test_dots_fill_isolated_cells() {
        let genome = Genome::new([1.0; 8]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let dot = PieceShape::Dot.piece();
        let mut board = checkerboard();
        let pieces = [dot.clone(), dot.clone(), dot];
        let plan = evaluator.select_best_turn(&board, &pieces).unwrap();
        assert_eq!(plan.moves().len(), 3);
        assert!(replay_is_legal(&board, &plan));
        assert_eq!(evaluator.play(&mut board, &pieces), Ok(3));
    }

    #[test]
    fn test_plan_is_legal_on_crowded_board() {
        let genome = Genome::new([0.4, -1.2, 2.0, 1.0, -0.5, 0.1, -2.0, 0.0]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let mut board = Board::default();
        board.row_mut(0)[..7].fill(1);
        board.row_mut(4)[2..9].fill(1);
        board.row_mut(8)[..5].fill(1);
        let pieces = [
            PieceShape::Line2.piece(),
            PieceShape::Plus.piece(),
            PieceShape::Corner3.piece(),
        ];
        let plan = evaluator.select_best_turn(&board, &pieces).unwrap();
        assert!(replay_is_legal(&board, &plan));
        assert!(plan.cost() >= 0.0);
    }

    #[test]
    fn test_clearing_score_is_added() {
        // Completing row 0 (subset occupation 0.04) cancels the bias exactly, so it is the
        // cheapest position for the line.
        let genome = Genome::from_fn(|i| match BoardFeature::ALL[i] {
            BoardFeature::Bias => -4.0,
            BoardFeature::SubsetOccupation => 100.0,
            _ => 0.0,
        });
        let evaluator = TurnEvaluator::from_genome(&genome);
        let mut board = Board::default();
        board.row_mut(0)[..6].fill(1);
        let line = PieceShape::Line3.piece();
        let dot = PieceShape::Dot.piece();
        let score = evaluator
            .play(&mut board, &[line, dot.clone(), dot])
            .unwrap();
        assert_eq!(score, 3 + 18 + 1 + 1);
        assert_eq!(board.row(0), &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_play_game_respects_round_limit() {
        let genome = Genome::new([0.5, 0.5, 0.5, 1.0, -1.0, 0.2, -3.0, 0.0]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let catalog = PieceCatalog::standard();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut board = Board::default();
        let stats = evaluator.play_game(&mut board, &catalog, &mut rng, Some(2));
        assert_eq!(stats.rounds(), 2);
        assert!(!stats.is_game_over());
        assert!(stats.score() >= 6);
    }

    #[test]
    fn test_play_game_ends_without_legal_move() {
        let genome = Genome::new([1.0; 8]);
        let evaluator = TurnEvaluator::from_genome(&genome);
        let catalog = PieceCatalog::from_shapes(&[PieceShape::Square.piece()]).unwrap();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut board = checkerboard();
        let stats = evaluator.play_game(&mut board, &catalog, &mut rng, None);
        assert!(stats.is_game_over());
        assert_eq!(stats.rounds(), 0);
        assert_eq!(stats.score(), 0);
    }
}
