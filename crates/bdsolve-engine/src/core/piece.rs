use std::{collections::HashSet, fmt};

use arrayvec::ArrayVec;
use rand::Rng;

use crate::{ShapeError, core::board::Board, region::round_hundredths};

/// Maximum height and width of a piece.
pub const MAX_PIECE_EXTENT: usize = 5;

const MAX_PIECE_CELLS: usize = MAX_PIECE_EXTENT * MAX_PIECE_EXTENT;

/// An immutable binary shape that can be placed on a [`Board`].
///
/// Cells are stored row-major; `1` marks a cell covered by the piece, `0` a hole in its
/// bounding box. Pieces are plain values: the board copies their cells on placement and
/// keeps no reference to the catalog they came from.
///
/// # Example
///
/// ```
/// use bdsolve_engine::Piece;
///
/// let corner = Piece::from_rows(&[[1_u8, 1], [0, 1]]).unwrap();
/// assert_eq!(corner.cell_count(), 3);
///
/// let rotated = corner.rotated();
/// assert_eq!(rotated.cell(1, 1), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    height: usize,
    width: usize,
    cells: ArrayVec<u8, MAX_PIECE_CELLS>,
}

impl Piece {
    /// Builds a piece from its rows.
    ///
    /// Rows must be non-empty, of equal length, at most [`MAX_PIECE_EXTENT`] in both
    /// dimensions, and contain only `0` and `1`.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, ShapeError>
    where
        R: AsRef<[u8]>,
    {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height == 0 || width == 0 {
            return Err(ShapeError::EmptyPiece);
        }
        if height > MAX_PIECE_EXTENT || width > MAX_PIECE_EXTENT {
            return Err(ShapeError::OversizedPiece {
                height,
                width,
                max: MAX_PIECE_EXTENT,
            });
        }

        let mut cells = ArrayVec::new();
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(ShapeError::RaggedPiece);
            }
            if let Some(&value) = row.iter().find(|v| **v > 1) {
                return Err(ShapeError::NonBinaryPiece { value });
            }
            cells.extend(row.iter().copied());
        }
        Ok(Self {
            height,
            width,
            cells,
        })
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn cell(&self, y: usize, x: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    /// Returns the `(dy, dx)` offsets of the covered cells relative to the top-left corner.
    pub fn occupied_offsets(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, _)| (i / self.width, i % self.width))
    }

    /// Returns the number of covered cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|v| **v != 0).count()
    }

    /// Returns the ratio of covered cells to the bounding-box area, rounded to two decimals.
    #[must_use]
    pub fn occupation(&self) -> f32 {
        #[expect(clippy::cast_precision_loss)]
        let ratio = self.cell_count() as f32 / self.cells.len() as f32;
        round_hundredths(ratio)
    }

    /// Returns the piece rotated by 90 degrees counter-clockwise.
    #[must_use]
    pub fn rotated(&self) -> Self {
        let (height, width) = (self.width, self.height);
        let mut cells = ArrayVec::new();
        for y in 0..height {
            for x in 0..width {
                cells.push(self.cell(x, self.width - 1 - y));
            }
        }
        Self {
            height,
            width,
            cells,
        }
    }

    /// Returns the piece in all four orientations (0, 90, 180 and 270 degrees).
    #[must_use]
    pub fn rotations(&self) -> [Self; 4] {
        let r90 = self.rotated();
        let r180 = r90.rotated();
        let r270 = r180.rotated();
        [self.clone(), r90, r180, r270]
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = if self.cell(y, x) == 0 { '.' } else { '#' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The canonical shapes of the puzzle, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceShape {
    Dot,
    Square,
    Corner2,
    Corner3,
    Diagonal2,
    Diagonal3,
    Plus,
    Line2,
    Line3,
    Line4,
    Line5,
    T2,
    T3,
    U,
    SLeft,
    SRight,
    LLeft,
    LRight,
}

impl PieceShape {
    pub const ALL: [Self; 18] = [
        Self::Dot,
        Self::Square,
        Self::Corner2,
        Self::Corner3,
        Self::Diagonal2,
        Self::Diagonal3,
        Self::Plus,
        Self::Line2,
        Self::Line3,
        Self::Line4,
        Self::Line5,
        Self::T2,
        Self::T3,
        Self::U,
        Self::SLeft,
        Self::SRight,
        Self::LLeft,
        Self::LRight,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Square => "square",
            Self::Corner2 => "corner-2",
            Self::Corner3 => "corner-3",
            Self::Diagonal2 => "diagonal-2",
            Self::Diagonal3 => "diagonal-3",
            Self::Plus => "plus",
            Self::Line2 => "line-2",
            Self::Line3 => "line-3",
            Self::Line4 => "line-4",
            Self::Line5 => "line-5",
            Self::T2 => "t-2",
            Self::T3 => "t-3",
            Self::U => "u",
            Self::SLeft => "s-left",
            Self::SRight => "s-right",
            Self::LLeft => "l-left",
            Self::LRight => "l-right",
        }
    }

    #[must_use]
    pub fn rows(self) -> &'static [&'static [u8]] {
        match self {
            Self::Dot => &[&[1]],
            Self::Square => &[&[1, 1], &[1, 1]],
            Self::Corner2 => &[&[1, 1], &[0, 1]],
            Self::Corner3 => &[&[1, 1, 1], &[0, 0, 1], &[0, 0, 1]],
            Self::Diagonal2 => &[&[1, 0], &[0, 1]],
            Self::Diagonal3 => &[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]],
            Self::Plus => &[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]],
            Self::Line2 => &[&[1, 1]],
            Self::Line3 => &[&[1, 1, 1]],
            Self::Line4 => &[&[1, 1, 1, 1]],
            Self::Line5 => &[&[1, 1, 1, 1, 1]],
            Self::T2 => &[&[1, 1, 1], &[0, 1, 0]],
            Self::T3 => &[&[1, 1, 1], &[0, 1, 0], &[0, 1, 0]],
            Self::U => &[&[1, 1, 1], &[1, 0, 1]],
            Self::SLeft => &[&[0, 1, 1], &[1, 1, 0]],
            Self::SRight => &[&[1, 1, 0], &[0, 1, 1]],
            Self::LLeft => &[&[1, 1, 1], &[1, 0, 0]],
            Self::LRight => &[&[1, 1, 1], &[0, 0, 1]],
        }
    }

    /// Returns the shape in its canonical orientation.
    #[must_use]
    pub fn piece(self) -> Piece {
        Piece::from_rows(self.rows()).expect("canonical shapes are valid pieces")
    }
}

/// The deduplicated set of placeable pieces.
///
/// Built by expanding shapes into all four rotations and keeping one representative per
/// distinct (dimensions, cells) pattern, in order of first appearance.
#[derive(Debug, Clone)]
pub struct PieceCatalog {
    pieces: Vec<Piece>,
}

impl Default for PieceCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl PieceCatalog {
    /// Returns the catalog of all canonical shapes in every distinct orientation.
    #[must_use]
    pub fn standard() -> Self {
        let shapes: Vec<Piece> = PieceShape::ALL.iter().map(|s| s.piece()).collect();
        Self::from_shapes(&shapes).expect("canonical catalog is not empty")
    }

    /// Expands `shapes` into their rotations and deduplicates the result.
    pub fn from_shapes(shapes: &[Piece]) -> Result<Self, ShapeError> {
        let rotations: Vec<[Piece; 4]> = shapes.iter().map(Piece::rotations).collect();
        let mut seen = HashSet::new();
        let mut pieces = vec![];
        for turn in 0..4 {
            for piece in rotations.iter().map(|r| &r[turn]) {
                if seen.insert(piece.clone()) {
                    pieces.push(piece.clone());
                }
            }
        }
        if pieces.is_empty() {
            return Err(ShapeError::EmptyCatalog);
        }
        Ok(Self { pieces })
    }

    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Checks that every piece fits inside the extent of `board`.
    pub fn check_fits(&self, board: &Board) -> Result<(), ShapeError> {
        let size = board.size();
        match self
            .pieces
            .iter()
            .find(|p| p.height() > size || p.width() > size)
        {
            Some(piece) => Err(ShapeError::PieceExceedsBoard {
                height: piece.height(),
                width: piece.width(),
                size,
            }),
            None => Ok(()),
        }
    }

    /// Draws three pieces uniformly at random, with replacement.
    pub fn sample_three<R>(&self, rng: &mut R) -> [Piece; 3]
    where
        R: Rng + ?Sized,
    {
        let mut draw = || self.pieces[rng.random_range(0..self.pieces.len())].clone();
        [draw(), draw(), draw()]
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use crate::BoardConfig;

    use super::*;

    #[test]
    fn test_from_rows_rejects_invalid_shapes() {
        let empty: [&[u8]; 0] = [];
        assert_eq!(Piece::from_rows(&empty), Err(ShapeError::EmptyPiece));
        assert_eq!(
            Piece::from_rows(&[&[1_u8, 1][..], &[1_u8][..]]),
            Err(ShapeError::RaggedPiece)
        );
        assert_eq!(
            Piece::from_rows(&[[1_u8, 2]]),
            Err(ShapeError::NonBinaryPiece { value: 2 })
        );
        assert_eq!(
            Piece::from_rows(&[[1_u8; 6]]),
            Err(ShapeError::OversizedPiece {
                height: 1,
                width: 6,
                max: MAX_PIECE_EXTENT
            })
        );
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let l = PieceShape::LRight.piece();
        // ###      ##
        // ..#  ->  #.
        //          #.
        let rotated = l.rotated();
        assert_eq!((rotated.height(), rotated.width()), (3, 2));
        assert_eq!(
            rotated,
            Piece::from_rows(&[[1_u8, 1], [1, 0], [1, 0]]).unwrap()
        );
        assert_eq!(l.rotated().rotated().rotated().rotated(), l);
    }

    #[test]
    fn test_occupation() {
        assert!((PieceShape::Dot.piece().occupation() - 1.0).abs() < f32::EPSILON);
        assert!((PieceShape::Corner2.piece().occupation() - 0.75).abs() < f32::EPSILON);
        assert!((PieceShape::Plus.piece().occupation() - 0.56).abs() < f32::EPSILON);
        assert!((PieceShape::Diagonal3.piece().occupation() - 0.33).abs() < f32::EPSILON);
    }

    #[test]
    fn test_standard_catalog_has_no_duplicates() {
        let catalog = PieceCatalog::standard();
        let unique: HashSet<_> = catalog.pieces().iter().collect();
        assert_eq!(unique.len(), catalog.len());

        let dot = PieceShape::Dot.piece();
        assert_eq!(catalog.pieces().iter().filter(|p| **p == dot).count(), 1);
    }

    #[test]
    fn test_standard_catalog_size() {
        // Orientations per shape:
        // dot 1, square 1, corner-2 4, corner-3 4, diagonal-2 2, diagonal-3 2, plus 1,
        // lines 2 each, t-2 4, t-3 4, u 4, s-left 2, s-right 2, l-left 4, l-right 4.
        assert_eq!(
            PieceCatalog::standard().len(),
            1 + 1 + 4 + 4 + 2 + 2 + 1 + 4 * 2 + 4 + 4 + 4 + 2 + 2 + 4 + 4
        );
    }

    #[test]
    fn test_catalog_keeps_first_orientation_first() {
        let catalog = PieceCatalog::standard();
        let canonical: Vec<Piece> = PieceShape::ALL.iter().map(|s| s.piece()).collect();
        assert_eq!(&catalog.pieces()[..canonical.len()], &canonical[..]);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        assert!(matches!(
            PieceCatalog::from_shapes(&[]),
            Err(ShapeError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_check_fits() {
        let catalog = PieceCatalog::standard();
        let board = Board::new(BoardConfig::default()).unwrap();
        assert!(catalog.check_fits(&board).is_ok());

        let small = Board::new(BoardConfig {
            size: 4,
            block_size: 2,
        })
        .unwrap();
        assert_eq!(
            catalog.check_fits(&small),
            Err(ShapeError::PieceExceedsBoard {
                height: 1,
                width: 5,
                size: 4
            })
        );
    }

    #[test]
    fn test_sample_three_draws_from_catalog() {
        let catalog = PieceCatalog::standard();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            for piece in catalog.sample_three(&mut rng) {
                assert!(catalog.pieces().contains(&piece));
            }
        }
    }
}
