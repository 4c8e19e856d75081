//! Simulation engine for the block-placement puzzle.
//!
//! The engine owns everything that happens on the grid itself:
//!
//! - [`Board`] - The square grid, its rows/columns/blocks, placement and subset clearing
//! - [`PieceCatalog`] - The rotated and deduplicated set of placeable shapes
//! - [`region`] - Run-length and flood-fill summaries of free space used by the board statistics
//!
//! Move selection and training live in the `bdsolve-evaluator` and `bdsolve-training` crates.
//!
//! # Example
//!
//! ```
//! use bdsolve_engine::{Board, BoardConfig, PieceShape, Position};
//!
//! let mut board = Board::new(BoardConfig::default()).unwrap();
//! let line = PieceShape::Line3.piece();
//!
//! let placed = board.try_place(&line, Position::new(0, 0)).unwrap();
//! assert_eq!(placed, 3);
//! assert_eq!(board.reduce_subsets(), 0);
//! ```

pub use self::core::*;

pub mod core;

/// Structural configuration fault of a board or piece.
///
/// These are detected at construction time and are never expected while playing.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("board size must be positive")]
    EmptyBoard,
    #[display("board size {size} is not divisible into blocks of size {block_size}")]
    UnevenBlocks { size: usize, block_size: usize },
    #[display("piece must have at least one row and one column")]
    EmptyPiece,
    #[display("piece rows must all have the same length")]
    RaggedPiece,
    #[display("piece cells must be 0 or 1, got {value}")]
    NonBinaryPiece { value: u8 },
    #[display("piece {height}x{width} exceeds the maximum extent {max}")]
    OversizedPiece {
        height: usize,
        width: usize,
        max: usize,
    },
    #[display("piece {height}x{width} does not fit on a {size}x{size} board")]
    PieceExceedsBoard {
        height: usize,
        width: usize,
        size: usize,
    },
    #[display("piece catalog is empty")]
    EmptyCatalog,
}

/// A requested placement cannot be applied to the board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlacementError {
    #[display("piece placed at {position} extends beyond the board")]
    OutOfBounds { position: Position },
    #[display("piece placed at {position} overlaps occupied cells")]
    Overlap { position: Position },
}
