//! Board features: the inputs of the linear placement policy.
//!
//! Each feature is measured on the hypothetical board right after a piece has been placed
//! (before any subset is cleared). All features except [`BoardFeature::Bias`] lie in
//! \[0.0, 1.0\] and are rounded to two decimals by the board statistics.
//!
//! | Index | Feature | Source |
//! |---|---|---|
//! | 0 | [`ColumnIntegrity`](BoardFeature::ColumnIntegrity) | [`Board::column_integrity`] |
//! | 1 | [`RowIntegrity`](BoardFeature::RowIntegrity) | [`Board::row_integrity`] |
//! | 2 | [`BlockIntegrity`](BoardFeature::BlockIntegrity) | [`Board::block_integrity`] |
//! | 3 | [`Occupation`](BoardFeature::Occupation) | [`Board::occupation`] |
//! | 4 | [`PieceOccupation`](BoardFeature::PieceOccupation) | [`Piece::occupation`] |
//! | 5 | [`Bias`](BoardFeature::Bias) | constant `1.0` |
//! | 6 | [`SubsetOccupation`](BoardFeature::SubsetOccupation) | [`Board::subset_occupation`] |
//! | 7 | [`Integrity`](BoardFeature::Integrity) | disabled, constant `0.0` |
//!
//! The global [`Board::integrity`] statistic is expensive and currently excluded from the
//! policy; its genome slot is kept so trained genomes keep their layout.

use std::fmt;

use bdsolve_engine::{Board, Piece};

use crate::genome::GENOME_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardFeature {
    ColumnIntegrity,
    RowIntegrity,
    BlockIntegrity,
    Occupation,
    PieceOccupation,
    Bias,
    SubsetOccupation,
    Integrity,
}

impl BoardFeature {
    pub const ALL: [Self; 8] = [
        Self::ColumnIntegrity,
        Self::RowIntegrity,
        Self::BlockIntegrity,
        Self::Occupation,
        Self::PieceOccupation,
        Self::Bias,
        Self::SubsetOccupation,
        Self::Integrity,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::ColumnIntegrity => "column_integrity",
            Self::RowIntegrity => "row_integrity",
            Self::BlockIntegrity => "block_integrity",
            Self::Occupation => "occupation",
            Self::PieceOccupation => "piece_occupation",
            Self::Bias => "bias",
            Self::SubsetOccupation => "subset_occupation",
            Self::Integrity => "integrity",
        }
    }

    /// Measures this feature on `board`, which already contains `piece`.
    #[must_use]
    pub fn compute(self, board: &Board, piece: &Piece) -> f32 {
        match self {
            Self::ColumnIntegrity => board.column_integrity(),
            Self::RowIntegrity => board.row_integrity(),
            Self::BlockIntegrity => board.block_integrity(),
            Self::Occupation => board.occupation(),
            Self::PieceOccupation => piece.occupation(),
            Self::Bias => 1.0,
            Self::SubsetOccupation => board.subset_occupation(),
            Self::Integrity => 0.0,
        }
    }

    /// Measures all features, in [`BoardFeature::ALL`] order.
    #[must_use]
    pub fn compute_all(board: &Board, piece: &Piece) -> [f32; GENOME_LEN] {
        Self::ALL.map(|f| f.compute(board, piece))
    }
}

impl fmt::Display for BoardFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
