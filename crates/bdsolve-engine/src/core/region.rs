//! Free-space summaries over 1-D sequences and 2-D grids.
//!
//! Both analyzers are pure: they read their input and return the multiset of region sizes
//! (in discovery order) without touching the cells. The board statistics turn these
//! multisets into weighted integrity scores.
//!
//! - [`runs_1d`] - lengths of maximal contiguous runs of a value in a sequence
//! - [`runs_2d`] - sizes of maximal connected regions of a value in a grid

/// Read-only rectangular window into a row-major grid of cells.
///
/// A view over the whole grid is created with [`GridView::new`]; sub-windows (such as a
/// single block of the board) are created with [`GridView::window`] and share the same
/// backing storage.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    cells: &'a [u8],
    stride: usize,
    top: usize,
    left: usize,
    height: usize,
    width: usize,
}

impl<'a> GridView<'a> {
    /// Creates a view over a complete row-major grid with rows of `width` cells.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or `cells.len()` is not a multiple of `width`.
    #[must_use]
    pub fn new(cells: &'a [u8], width: usize) -> Self {
        assert!(width > 0 && cells.len() % width == 0);
        Self {
            cells,
            stride: width,
            top: 0,
            left: 0,
            height: cells.len() / width,
            width,
        }
    }

    /// Narrows the view to a `height`×`width` window whose top-left corner is at
    /// (`top`, `left`) relative to this view.
    ///
    /// # Panics
    ///
    /// Panics if the window extends beyond this view.
    #[must_use]
    pub fn window(self, top: usize, left: usize, height: usize, width: usize) -> Self {
        assert!(top + height <= self.height && left + width <= self.width);
        Self {
            cells: self.cells,
            stride: self.stride,
            top: self.top + top,
            left: self.left + left,
            height,
            width,
        }
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
    pub fn get(&self, y: usize, x: usize) -> u8 {
        debug_assert!(y < self.height && x < self.width);
        self.cells[(self.top + y) * self.stride + self.left + x]
    }

    /// Returns an iterator over all cell values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| self.get(y, x)))
    }
}

/// Returns the lengths of the maximal contiguous runs of `target` in `cells`.
///
/// Both ends of the sequence terminate a run, so a run touching an edge is counted
/// like any other run.
///
/// # Example
///
/// ```
/// use bdsolve_engine::region::runs_1d;
///
/// assert_eq!(runs_1d([0, 0, 1, 0, 1, 1, 0, 0, 0], 0), vec![2, 1, 3]);
/// assert_eq!(runs_1d([1, 1, 1], 0), Vec::<usize>::new());
/// ```
pub fn runs_1d<I>(cells: I, target: u8) -> Vec<usize>
where
    I: IntoIterator<Item = u8>,
{
    let mut runs = vec![];
    let mut current = 0;
    for cell in cells {
        if cell == target {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

const ORTHOGONAL_NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL_NEIGHBORS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Returns the sizes of the maximal connected regions of `target` cells in `grid`.
///
/// Regions are 4-connected, or 8-connected when `diagonal` is `true` (cells touching
/// only at a corner belong to the same region). Every cell is visited at most once and
/// the scan stops as soon as all cells have been visited.
///
/// # Example
///
/// ```
/// use bdsolve_engine::region::{GridView, runs_2d};
///
/// let cells = [
///     0, 1, 1, //
///     1, 0, 1, //
///     1, 1, 0, //
/// ];
/// let grid = GridView::new(&cells, 3);
/// assert_eq!(runs_2d(grid, 0, false), vec![1, 1, 1]);
/// assert_eq!(runs_2d(grid, 0, true), vec![3]);
/// ```
#[must_use]
pub fn runs_2d(grid: GridView<'_>, target: u8, diagonal: bool) -> Vec<usize> {
    let (height, width) = (grid.height(), grid.width());
    let total = height * width;
    let mut visited = vec![false; total];
    let mut visited_count = 0;
    let mut runs = vec![];
    let mut stack = vec![];

    let diagonal_neighbors: &[(isize, isize)] = if diagonal { &DIAGONAL_NEIGHBORS } else { &[] };
    let neighbors = ORTHOGONAL_NEIGHBORS.iter().chain(diagonal_neighbors);

    for start in 0..total {
        if visited_count == total {
            break;
        }
        if visited[start] {
            continue;
        }
        visited[start] = true;
        visited_count += 1;
        if grid.get(start / width, start % width) != target {
            continue;
        }

        let mut size = 0;
        stack.push(start);
        while let Some(index) = stack.pop() {
            size += 1;
            let (y, x) = (index / width, index % width);
            for &(dy, dx) in neighbors.clone() {
                let (Some(ny), Some(nx)) = (y.checked_add_signed(dy), x.checked_add_signed(dx))
                else {
                    continue;
                };
                if ny >= height || nx >= width {
                    continue;
                }
                let neighbor = ny * width + nx;
                if visited[neighbor] {
                    continue;
                }
                if grid.get(ny, nx) == target {
                    visited[neighbor] = true;
                    visited_count += 1;
                    stack.push(neighbor);
                }
            }
        }
        runs.push(size);
    }

    runs
}

/// Rounds to two decimal places, resolving ties to the even neighbor.
#[must_use]
pub fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round_ties_even() / 100.0
}
