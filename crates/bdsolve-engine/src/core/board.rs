use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    PlacementError, ShapeError,
    core::piece::Piece,
    region::{self, GridView, round_hundredths},
};

pub const DEFAULT_BOARD_SIZE: usize = 9;
pub const DEFAULT_BLOCK_SIZE: usize = 3;

// Integrity sums are scaled by the sum of run weights 1..=9 per line.
const INTEGRITY_SCALE: usize = 45;

/// Dimensions of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Side length of the square grid.
    pub size: usize,
    /// Side length of each square block; must divide `size`.
    pub block_size: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Top-left offset of a placement, in grid coordinates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display, Serialize, Deserialize,
)]
#[display("({row}, {col})")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A row, column or block of the board, each eligible for clearing on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Subset {
    #[display("row {_0}")]
    Row(usize),
    #[display("column {_0}")]
    Column(usize),
    #[display("block {_0}")]
    Block(usize),
}

/// Rectangle of the grid covered by a [`Subset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    top: usize,
    left: usize,
    height: usize,
    width: usize,
}

/// The puzzle grid.
///
/// A square grid of `size`×`size` cells, partitioned into `size` rows, `size` columns and
/// `size` square blocks of `block_size`×`block_size` cells. A cell value of `0` is empty,
/// anything else is occupied.
///
/// The board is created empty, mutated in place by [`place`](Self::place) and
/// [`reduce_subsets`](Self::reduce_subsets), and reset between games. Cloning produces an
/// independent copy of the cells.
///
/// # Example
///
/// ```
/// use bdsolve_engine::{Board, BoardConfig, PieceShape, Position};
///
/// let mut board = Board::new(BoardConfig::default()).unwrap();
/// let line = PieceShape::Line3.piece();
/// for col in [0, 3, 6] {
///     board.try_place(&line, Position::new(4, col)).unwrap();
/// }
/// // The full row is worth 2 * 9 points.
/// assert_eq!(board.reduce_subsets(), 18);
/// assert_eq!(board.occupation(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    block_size: usize,
    cells: Vec<u8>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            cells: vec![0; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE],
        }
    }
}

impl Board {
    /// Creates an empty board.
    ///
    /// Fails if the size is zero or the blocks do not tile the grid.
    pub fn new(config: BoardConfig) -> Result<Self, ShapeError> {
        let BoardConfig { size, block_size } = config;
        if size == 0 {
            return Err(ShapeError::EmptyBoard);
        }
        if block_size == 0 || size % block_size != 0 {
            return Err(ShapeError::UnevenBlocks { size, block_size });
        }
        Ok(Self {
            size,
            block_size,
            cells: vec![0; size * size],
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks along one side of the grid.
    #[must_use]
    pub fn blocks_per_side(&self) -> usize {
        self.size / self.block_size
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.size + col]
    }

    /// Returns a read-only view of the whole grid.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    /// Sets every cell to empty.
    pub fn reset(&mut self) {
        self.cells.fill(0);
    }

    /// Returns `true` if `piece` at `position` lies entirely inside the grid.
    #[must_use]
    pub fn fits(&self, piece: &Piece, position: Position) -> bool {
        position.row + piece.height() <= self.size && position.col + piece.width() <= self.size
    }

    /// Returns `true` if `piece` at `position` lies inside the grid and covers no
    /// occupied cell.
    #[must_use]
    pub fn is_legal(&self, piece: &Piece, position: Position) -> bool {
        self.fits(piece, position)
            && piece
                .occupied_offsets()
                .all(|(dy, dx)| self.cell(position.row + dy, position.col + dx) == 0)
    }

    /// Returns every position where `piece` can be legally placed, row by row.
    pub fn legal_positions<'a>(&'a self, piece: &'a Piece) -> impl Iterator<Item = Position> + 'a {
        let rows = (self.size + 1).saturating_sub(piece.height());
        let cols = (self.size + 1).saturating_sub(piece.width());
        (0..rows)
            .flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
            .filter(move |pos| self.is_legal(piece, *pos))
    }

    /// Adds the cells of `piece` into the grid with its top-left corner at `position`.
    ///
    /// Overlapping occupied cells is not checked here; use [`try_place`](Self::try_place)
    /// or [`is_legal`](Self::is_legal) for that. Returns the number of covered piece
    /// cells, which is the placement score.
    ///
    /// # Panics
    ///
    /// Panics if the piece extends beyond the grid.
    pub fn place(&mut self, piece: &Piece, position: Position) -> usize {
        assert!(
            self.fits(piece, position),
            "piece placed at {position} extends beyond the board"
        );
        let mut count = 0;
        for (dy, dx) in piece.occupied_offsets() {
            let index = (position.row + dy) * self.size + position.col + dx;
            self.cells[index] = self.cells[index].saturating_add(piece.cell(dy, dx));
            count += 1;
        }
        count
    }

    /// Like [`place`](Self::place), but rejects out-of-bounds and overlapping placements.
    pub fn try_place(&mut self, piece: &Piece, position: Position) -> Result<usize, PlacementError> {
        if !self.fits(piece, position) {
            return Err(PlacementError::OutOfBounds { position });
        }
        if !self.is_legal(piece, position) {
            return Err(PlacementError::Overlap { position });
        }
        Ok(self.place(piece, position))
    }

    /// The `i`-th row.
    #[must_use]
    pub fn row(&self, i: usize) -> &[u8] {
        &self.cells[i * self.size..][..self.size]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [u8] {
        &mut self.cells[i * self.size..][..self.size]
    }

    /// The `i`-th column, top to bottom.
    pub fn column(&self, i: usize) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().skip(i).step_by(self.size).copied()
    }

    /// The `i`-th block, numbered row-major.
    #[must_use]
    pub fn block(&self, i: usize) -> GridView<'_> {
        self.subset_view(Subset::Block(i))
    }

    /// Iterates over all subsets: row `i`, column `i` and block `i` for each index in turn.
    pub fn subsets(&self) -> impl Iterator<Item = Subset> + use<> {
        (0..self.size).flat_map(|i| [Subset::Row(i), Subset::Column(i), Subset::Block(i)])
    }

    fn subset_rect(&self, subset: Subset) -> Rect {
        let (size, bs) = (self.size, self.block_size);
        match subset {
            Subset::Row(i) => Rect {
                top: i,
                left: 0,
                height: 1,
                width: size,
            },
            Subset::Column(i) => Rect {
                top: 0,
                left: i,
                height: size,
                width: 1,
            },
            Subset::Block(i) => {
                let bw = self.blocks_per_side();
                Rect {
                    top: (i / bw) * bs,
                    left: (i % bw) * bs,
                    height: bs,
                    width: bs,
                }
            }
        }
    }

    fn subset_view(&self, subset: Subset) -> GridView<'_> {
        let Rect {
            top,
            left,
            height,
            width,
        } = self.subset_rect(subset);
        self.view().window(top, left, height, width)
    }

    /// Returns the flat cell indices of `subset`, row-major.
    pub fn subset_indices(&self, subset: Subset) -> impl Iterator<Item = usize> + use<> {
        let Rect {
            top,
            left,
            height,
            width,
        } = self.subset_rect(subset);
        let size = self.size;
        (top..top + height).flat_map(move |y| (left..left + width).map(move |x| y * size + x))
    }

    #[must_use]
    pub fn is_subset_filled(&self, subset: Subset) -> bool {
        self.subset_indices(subset).all(|i| self.cells[i] != 0)
    }

    /// Empties every cell of `subset`.
    pub fn clear_subset(&mut self, subset: Subset) {
        for i in self.subset_indices(subset) {
            self.cells[i] = 0;
        }
    }

    /// Points awarded for clearing `subset`: twice its cell count.
    #[must_use]
    pub fn subset_score(&self, subset: Subset) -> usize {
        match subset {
            Subset::Row(_) | Subset::Column(_) => 2 * self.size,
            Subset::Block(_) => 2 * self.block_size * self.block_size,
        }
    }

    /// Returns every fully occupied subset.
    pub fn filled_subsets(&self) -> impl Iterator<Item = Subset> + '_ {
        self.subsets().filter(|s| self.is_subset_filled(*s))
    }

    /// Empties every fully occupied subset and returns the clearing score.
    ///
    /// Subsets are detected on the state before any clearing, and each one is scored
    /// independently even when it shares cells with another cleared subset.
    pub fn reduce_subsets(&mut self) -> usize {
        let filled: Vec<Subset> = self.filled_subsets().collect();
        let mut score = 0;
        for subset in filled {
            self.clear_subset(subset);
            score += self.subset_score(subset);
        }
        score
    }

    /// Ratio of occupied cells to board area.
    #[must_use]
    pub fn occupation(&self) -> f32 {
        let occupied = self.cells.iter().filter(|c| **c != 0).count();
        ratio(occupied, self.cells.len())
    }

    /// Ratio of fully occupied subsets to the number of subsets (`3 * size`).
    #[must_use]
    pub fn subset_occupation(&self) -> f32 {
        ratio(self.filled_subsets().count(), 3 * self.size)
    }

    /// Integrity of free space along rows; short free runs weigh more than long ones.
    #[must_use]
    pub fn row_integrity(&self) -> f32 {
        let runs = (0..self.size).flat_map(|i| region::runs_1d(self.row(i).iter().copied(), 0));
        ratio(weighted_runs(runs, self.size), INTEGRITY_SCALE * self.size)
    }

    /// Integrity of free space along columns.
    #[must_use]
    pub fn column_integrity(&self) -> f32 {
        let runs = (0..self.size).flat_map(|i| region::runs_1d(self.column(i), 0));
        ratio(weighted_runs(runs, self.size), INTEGRITY_SCALE * self.size)
    }

    /// Integrity of free space within blocks, using 4-connected regions.
    #[must_use]
    pub fn block_integrity(&self) -> f32 {
        let runs = (0..self.size).flat_map(|i| region::runs_2d(self.block(i), 0, false));
        ratio(weighted_runs(runs, self.size), INTEGRITY_SCALE * self.size)
    }

    /// Integrity of free space over the whole grid, merging diagonally touching regions.
    #[must_use]
    pub fn integrity(&self) -> f32 {
        let area = self.size * self.size;
        let runs = region::runs_2d(self.view(), 0, true);
        ratio(weighted_runs(runs, area), INTEGRITY_SCALE * area)
    }
}

/// Sums `max_len + 1 - len` over all runs.
fn weighted_runs<I>(runs: I, max_len: usize) -> usize
where
    I: IntoIterator<Item = usize>,
{
    runs.into_iter()
        .map(|len| (max_len + 1).saturating_sub(len))
        .sum()
}

#[expect(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f32 {
    round_hundredths(numerator as f32 / denominator as f32)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            if row > 0 && row % self.block_size == 0 {
                writeln!(f)?;
            }
            for col in 0..self.size {
                if col > 0 && col % self.block_size == 0 {
                    write!(f, " ")?;
                }
                let ch = if self.cell(row, col) == 0 { '.' } else { '#' };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
