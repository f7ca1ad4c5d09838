// Code lints

#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_lifetimes)]
#![warn(unused_qualifications)]

// Doc lints

#![warn(missing_docs)]

//! This crate implements a Sudoku engine that solves and composes puzzles
//! on square grids of arbitrary block dimensions. It supports the following
//! key features:
//!
//! * Parsing and printing grids
//! * Counting and enumerating the solutions of a partially filled grid, up
//! to a caller-specified limit, with configurable search budgets
//! * Pluggable candidate-selection strategies that drive the backtracking
//! search, with optional randomized tie-breaking through an injected random
//! number generator
//! * Composing new puzzles by filling a masked subset of cells such that
//! the result has a unique solution, verified by a nested search
//!
//! Note in this introduction we will mostly be using 4x4 grids due to their
//! simpler nature. These are divided in 4 2x2 blocks, each with the digits
//! 1 to 4, just like each row and column.
//!
//! # Parsing and printing grids
//!
//! See [SudokuGrid::parse] for the exact format of a grid code.
//!
//! Codes can be used to exchange grids, while pretty prints can be used to
//! display a grid in a clearer manner. An example of how to parse and
//! display a grid is provided below.
//!
//! ```
//! use sudoku_compose::SudokuGrid;
//!
//! let grid =
//!     SudokuGrid::parse("2x2;2, ,3, , ,1, , ,1, , ,4, ,2, ,3").unwrap();
//! println!("{}", grid);
//! ```
//!
//! # Solving
//!
//! The [Solver](solver::Solver) drives a
//! [Strategy](solver::strategy::Strategy) until the grid is complete, the
//! search space is exhausted, or a budget in
//! [SolveLimits](solver::SolveLimits) is spent. The returned number is the
//! count of complete solutions that were found.
//!
//! ```
//! use sudoku_compose::SudokuGrid;
//! use sudoku_compose::solver::{SolveLimits, Solver};
//! use sudoku_compose::solver::strategy::LeastCandidatesHybrid;
//!
//! let mut grid =
//!     SudokuGrid::parse("2x2;1, , ,4, , ,1, , ,1, , ,4, , ,1").unwrap();
//! let mut strategy = LeastCandidatesHybrid::new();
//! let mut solver = Solver::new();
//! let limits = SolveLimits::default().with_max_solutions(1);
//! let solutions =
//!     solver.solve(&mut grid, &mut strategy, None, &limits).unwrap();
//!
//! assert_eq!(1, solutions);
//! assert!(grid.is_full());
//! assert!(grid.is_valid());
//! ```
//!
//! # Composing
//!
//! A [Composer](composer::Composer) fills cells permitted by a [Mask] with
//! values chosen to constrain the grid as quickly as possible, and after
//! each placement verifies with an independent strategy that the puzzle
//! still has at least one solution and stops as soon as it has exactly one.
//!
//! ```
//! use sudoku_compose::Mask;
//! use sudoku_compose::composer::Composer;
//! use sudoku_compose::solver::{SolveLimits, Solver};
//! use sudoku_compose::solver::strategy::LeastCandidatesHybrid;
//!
//! let mask = Mask::all(2, 2).unwrap();
//! let mut composer = Composer::new();
//! let puzzle = composer.compose(&mask, 4).unwrap();
//!
//! // The composed puzzle has exactly one solution.
//! let mut copy = puzzle.grid().clone();
//! let mut strategy = LeastCandidatesHybrid::new();
//! let solutions = Solver::new()
//!     .solve(&mut copy, &mut strategy, None,
//!         &SolveLimits::default().with_max_solutions(2))
//!     .unwrap();
//! assert_eq!(1, solutions);
//! ```
//!
//! # Note regarding performance
//!
//! Solving and composing grids larger than 9x9 can require substantial
//! search effort. It is strongly recommended to use at least `opt-level =
//! 2`, even in tests, and to bound pathological searches with
//! [SolveLimits](solver::SolveLimits).

pub mod composer;
pub mod error;
pub mod solver;
pub mod state;
pub mod util;

use error::{SudokuError, SudokuParseError, SudokuParseResult, SudokuResult};
use util::USizeSet;

use serde::{Deserialize, Serialize};

use std::convert::TryFrom;
use std::fmt::{self, Display, Error, Formatter};

/// A Sudoku grid is composed of cells that are organized into blocks of a
/// given width and height in a way that makes the entire grid a square.
/// Consequently, the number of blocks in a row is equal to the block height
/// and vice versa. Each cell holds either 0, meaning it is empty, or a
/// value in the range `[1, size]`.
///
/// In ordinary Sudoku, the block width and height are both 3. Here, more
/// exotic variants are permitted, for example 4x2 blocks, which would
/// result in an 8x8 grid.
///
/// The cells are stored in one flat, row-major buffer which the solver
/// borrows exclusively for the duration of one solve call. `SudokuGrid`
/// implements `Display`, but only grids with a size (that is, width or
/// height) of less than or equal to 9 can be displayed with digits 1 to 9.
/// Grids of all other sizes will raise an error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SudokuGrid {
    block_width: usize,
    block_height: usize,
    size: usize,
    cells: Vec<usize>
}

fn to_char(cell: usize) -> char {
    if cell == 0 {
        ' '
    }
    else {
        (b'0' + cell as u8) as char
    }
}

fn line(grid: &SudokuGrid, start: char, thick_sep: char, thin_sep: char,
        segment: impl Fn(usize) -> char, pad: char, end: char, newline: bool)
        -> String {
    let size = grid.size();
    let mut result = String::new();

    for column in 0..size {
        if column == 0 {
            result.push(start);
        }
        else if column % grid.block_width == 0 {
            result.push(thick_sep);
        }
        else {
            result.push(thin_sep);
        }

        result.push(pad);
        result.push(segment(column));
        result.push(pad);
    }

    result.push(end);

    if newline {
        result.push('\n');
    }

    result
}

fn top_row(grid: &SudokuGrid) -> String {
    line(grid, '╔', '╦', '╤', |_| '═', '═', '╗', true)
}

fn thin_separator_line(grid: &SudokuGrid) -> String {
    line(grid, '╟', '╫', '┼', |_| '─', '─', '╢', true)
}

fn thick_separator_line(grid: &SudokuGrid) -> String {
    line(grid, '╠', '╬', '╪', |_| '═', '═', '╣', true)
}

fn bottom_row(grid: &SudokuGrid) -> String {
    line(grid, '╚', '╩', '╧', |_| '═', '═', '╝', false)
}

fn content_row(grid: &SudokuGrid, row: usize) -> String {
    line(grid, '║', '║', '│',
        |column| to_char(grid.cells[index(row, column, grid.size)]), ' ',
        '║', true)
}

impl Display for SudokuGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let size = self.size();

        if size > 9 {
            return Err(Error::default());
        }

        let top_row = top_row(self);
        let thin_separator_line = thin_separator_line(self);
        let thick_separator_line = thick_separator_line(self);
        let bottom_row = bottom_row(self);

        for row in 0..size {
            if row == 0 {
                f.write_str(top_row.as_str())?;
            }
            else if row % self.block_height == 0 {
                f.write_str(thick_separator_line.as_str())?;
            }
            else {
                f.write_str(thin_separator_line.as_str())?;
            }

            f.write_str(content_row(self, row).as_str())?;
        }

        f.write_str(bottom_row.as_str())?;
        Ok(())
    }
}

fn cell_to_string(cell: &usize) -> String {
    if *cell == 0 {
        String::from("")
    }
    else {
        cell.to_string()
    }
}

pub(crate) fn index(row: usize, column: usize, size: usize) -> usize {
    row * size + column
}

fn parse_dimensions(code: &str) -> Result<(usize, usize), SudokuParseError> {
    let parts: Vec<&str> = code.split('x').collect();

    if parts.len() != 2 {
        return Err(SudokuParseError::MalformedDimensions);
    }

    Ok((parts[0].parse()?, parts[1].parse()?))
}

impl SudokuGrid {

    /// Creates a new, empty Sudoku grid where the blocks have the given
    /// dimensions. The total width and height of the grid will be equal to
    /// the product of `block_width` and `block_height`.
    ///
    /// # Arguments
    ///
    /// * `block_width`: The horizontal dimension of one sub-block of the
    /// grid. To ensure a square grid, this is also the number of blocks
    /// that compose the grid vertically. For an ordinary Sudoku grid, this
    /// is 3. Must be greater than 0.
    /// * `block_height`: The vertical dimension of one sub-block of the
    /// grid. To ensure a square grid, this is also the number of blocks
    /// that compose the grid horizontally. For an ordinary Sudoku grid,
    /// this is 3. Must be greater than 0.
    ///
    /// # Errors
    ///
    /// If `block_width` or `block_height` is invalid (zero).
    pub fn new(block_width: usize, block_height: usize)
            -> SudokuResult<SudokuGrid> {
        if block_width == 0 || block_height == 0 {
            return Err(SudokuError::InvalidDimensions);
        }

        let size = block_width * block_height;
        let cells = vec![0; size * size];

        Ok(SudokuGrid {
            block_width,
            block_height,
            size,
            cells
        })
    }

    /// Parses a code encoding a Sudoku grid. The code has to be of the
    /// format `<block_width>x<block_height>;<cells>` where `<cells>` is a
    /// comma-separated list of entries, which are either empty or a number.
    /// The entries are assigned left-to-right, top-to-bottom, where each
    /// row is completed before the next one is started. Whitespace in the
    /// entries is ignored to allow for more intuitive formatting. The
    /// number of entries must match the amount of cells in a grid with the
    /// given dimensions, i.e. it must be `(block_width · block_height)²`.
    ///
    /// As an example, the code `2x2;1, ,2, , ,3, ,4, , , ,3, ,1, ,2` will
    /// parse to the following grid:
    ///
    /// ```text
    /// ╔═══╤═══╦═══╤═══╗
    /// ║ 1 │   ║ 2 │   ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 3 ║   │ 4 ║
    /// ╠═══╪═══╬═══╪═══╣
    /// ║   │   ║ 3 │   ║
    /// ╟───┼───╫───┼───╢
    /// ║   │ 1 ║   │ 2 ║
    /// ╚═══╧═══╩═══╧═══╝
    /// ```
    ///
    /// # Errors
    ///
    /// Any specialization of `SudokuParseError` (see that documentation).
    pub fn parse(code: &str) -> SudokuParseResult<SudokuGrid> {
        let parts: Vec<&str> = code.split(';').collect();

        if parts.len() != 2 {
            return Err(SudokuParseError::WrongNumberOfParts);
        }

        let (block_width, block_height) = parse_dimensions(parts[0])?;

        if let Ok(mut grid) = SudokuGrid::new(block_width, block_height) {
            let size = grid.size();
            let numbers: Vec<&str> = parts[1].split(',').collect();

            if numbers.len() != size * size {
                return Err(SudokuParseError::WrongNumberOfCells);
            }

            for (i, number_str) in numbers.iter().enumerate() {
                let number_str = number_str.trim();

                if number_str.is_empty() {
                    continue;
                }

                let number = number_str.parse::<usize>()?;

                if number == 0 || number > size {
                    return Err(SudokuParseError::InvalidNumber);
                }

                grid.cells[i] = number;
            }

            Ok(grid)
        }
        else {
            Err(SudokuParseError::InvalidDimensions)
        }
    }

    /// Converts the grid into a `String` in a way that is consistent with
    /// [SudokuGrid::parse]. That is, a grid that is converted to a string
    /// and parsed again will not change, as is illustrated below.
    ///
    /// ```
    /// use sudoku_compose::SudokuGrid;
    ///
    /// let mut grid = SudokuGrid::new(3, 2).unwrap();
    ///
    /// // Just some arbitrary changes to create some content.
    /// grid.set_cell(1, 1, 4).unwrap();
    /// grid.set_cell(2, 1, 5).unwrap();
    ///
    /// let grid_str = grid.to_parseable_string();
    /// let grid_parsed = SudokuGrid::parse(grid_str.as_str()).unwrap();
    /// assert_eq!(grid, grid_parsed);
    /// ```
    pub fn to_parseable_string(&self) -> String {
        let mut s = format!("{}x{};", self.block_width, self.block_height);
        let cells = self.cells.iter()
            .map(cell_to_string)
            .collect::<Vec<String>>()
            .join(",");
        s.push_str(cells.as_str());
        s
    }

    /// Gets the width (number of columns) of one sub-block of the grid. To
    /// ensure a square grid, this is also the number of blocks that compose
    /// the grid vertically.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Gets the height (number of rows) of one sub-block of the grid. To
    /// ensure a square grid, this is also the number of blocks that compose
    /// the grid horizontally.
    pub fn block_height(&self) -> usize {
        self.block_height
    }

    /// Gets the total size of the grid on one axis (horizontally or
    /// vertically). Since a square grid is enforced at construction time,
    /// this is guaranteed to be valid for both axes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the content of the cell at the specified position. `None` is
    /// returned for an empty cell.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the desired cell. Must be in the
    /// range `[0, size[`.
    /// * `column`: The column (x-coordinate) of the desired cell. Must be
    /// in the range `[0, size[`.
    ///
    /// # Errors
    ///
    /// If either `row` or `column` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn get_cell(&self, row: usize, column: usize)
            -> SudokuResult<Option<usize>> {
        let size = self.size();

        if row >= size || column >= size {
            Err(SudokuError::OutOfBounds)
        }
        else {
            let value = self.cells[index(row, column, size)];

            if value == 0 {
                Ok(None)
            }
            else {
                Ok(Some(value))
            }
        }
    }

    /// Sets the content of the cell at the specified position to the given
    /// number. If the cell was not empty, the old number will be
    /// overwritten.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the assigned cell. Must be in the
    /// range `[0, size[`.
    /// * `column`: The column (x-coordinate) of the assigned cell. Must be
    /// in the range `[0, size[`.
    /// * `number`: The number to assign to the specified cell. Must be in
    /// the range `[1, size]`.
    ///
    /// # Errors
    ///
    /// * `SudokuError::OutOfBounds` If either `row` or `column` are not in
    /// the specified range.
    /// * `SudokuError::InvalidNumber` If `number` is not in the specified
    /// range.
    pub fn set_cell(&mut self, row: usize, column: usize, number: usize)
            -> SudokuResult<()> {
        let size = self.size();

        if row >= size || column >= size {
            return Err(SudokuError::OutOfBounds);
        }

        if number == 0 || number > size {
            return Err(SudokuError::InvalidNumber);
        }

        let index = index(row, column, size);
        self.cells[index] = number;
        Ok(())
    }

    /// Clears the content of the cell at the specified position, that is,
    /// if it contains a number, that number is removed. If the cell is
    /// already empty, it will be left that way.
    ///
    /// # Arguments
    ///
    /// * `row`: The row (y-coordinate) of the cleared cell. Must be in the
    /// range `[0, size[`.
    /// * `column`: The column (x-coordinate) of the cleared cell. Must be
    /// in the range `[0, size[`.
    ///
    /// # Errors
    ///
    /// If either `row` or `column` are not in the specified range. In that
    /// case, `SudokuError::OutOfBounds` is returned.
    pub fn clear_cell(&mut self, row: usize, column: usize)
            -> SudokuResult<()> {
        let size = self.size();

        if row >= size || column >= size {
            return Err(SudokuError::OutOfBounds);
        }

        let index = index(row, column, size);
        self.cells[index] = 0;
        Ok(())
    }

    /// Counts the number of filled cells on this grid, that is, the number
    /// of nonzero entries in the cell buffer.
    pub fn count_filled(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }

    /// Indicates whether this grid is full, i.e. every cell is filled with
    /// a number. In this case, [SudokuGrid::count_filled] returns the
    /// square of [SudokuGrid::size].
    pub fn is_full(&self) -> bool {
        !self.cells.iter().any(|&c| c == 0)
    }

    /// Indicates whether this grid is empty, i.e. no cell is filled with a
    /// number. In this case, [SudokuGrid::count_filled] returns 0.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Indicates whether the filled cells of this grid satisfy the rules,
    /// that is, no row, column, or block contains a nonzero value twice.
    /// Empty cells are ignored, so a partially filled grid can be valid.
    pub fn is_valid(&self) -> bool {
        let size = self.size;

        for sector in 0..3 * size {
            let mut seen = USizeSet::new(1, size).unwrap();

            for position in 0..size {
                let (row, column) =
                    sector_cell(sector, position, self.block_width,
                        self.block_height);
                let value = self.cells[index(row, column, size)];

                if value > 0 && !seen.insert(value).unwrap() {
                    return false;
                }
            }
        }

        true
    }

    /// Gets a reference to the slice which holds the cells. They are in
    /// left-to-right, top-to-bottom order, where rows are together. Empty
    /// cells are represented by 0.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Gets a mutable reference to the slice which holds the cells. They
    /// are in left-to-right, top-to-bottom order, where rows are together.
    /// Empty cells are represented by 0. Writing a value outside
    /// `[0, size]` puts the grid into an unspecified state.
    pub fn cells_mut(&mut self) -> &mut [usize] {
        &mut self.cells
    }

    pub(crate) fn value(&self, row: usize, column: usize) -> usize {
        self.cells[index(row, column, self.size)]
    }

    pub(crate) fn set_value(&mut self, row: usize, column: usize,
            value: usize) {
        let index = index(row, column, self.size);
        self.cells[index] = value;
    }
}

/// Computes the grid coordinates of the cell at `position` within `sector`,
/// where sectors `0..size` are the rows, `size..2 * size` the columns, and
/// `2 * size..3 * size` the blocks, each read left-to-right,
/// top-to-bottom.
pub(crate) fn sector_cell(sector: usize, position: usize, block_width: usize,
        block_height: usize) -> (usize, usize) {
    let size = block_width * block_height;

    if sector < size {
        (sector, position)
    }
    else if sector < 2 * size {
        (position, sector - size)
    }
    else {
        let block = sector - 2 * size;
        let row = block / block_height * block_height
            + position / block_width;
        let column = block % block_height * block_width
            + position % block_width;
        (row, column)
    }
}

impl From<SudokuGrid> for String {
    fn from(grid: SudokuGrid) -> String {
        grid.to_parseable_string()
    }
}

impl TryFrom<String> for SudokuGrid {
    type Error = SudokuParseError;

    fn try_from(code: String) -> SudokuParseResult<SudokuGrid> {
        SudokuGrid::parse(code.as_str())
    }
}

/// A mask marks the subset of cells that a composition strategy is allowed
/// to select when it builds a puzzle. It has the same shape as the
/// [SudokuGrid] it is applied to: a flat, row-major buffer of booleans
/// where `true` marks a selectable cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mask {
    block_width: usize,
    block_height: usize,
    size: usize,
    cells: Vec<bool>
}

impl Mask {

    /// Creates a new mask with no selectable cells for grids with the given
    /// block dimensions.
    ///
    /// # Errors
    ///
    /// If `block_width` or `block_height` is invalid (zero).
    pub fn new(block_width: usize, block_height: usize) -> SudokuResult<Mask> {
        if block_width == 0 || block_height == 0 {
            return Err(SudokuError::InvalidDimensions);
        }

        let size = block_width * block_height;

        Ok(Mask {
            block_width,
            block_height,
            size,
            cells: vec![false; size * size]
        })
    }

    /// Creates a mask in which every cell is selectable.
    ///
    /// # Errors
    ///
    /// If `block_width` or `block_height` is invalid (zero).
    pub fn all(block_width: usize, block_height: usize) -> SudokuResult<Mask> {
        let mut mask = Mask::new(block_width, block_height)?;

        for cell in mask.cells.iter_mut() {
            *cell = true;
        }

        Ok(mask)
    }

    /// Creates a mask in which exactly the given `(row, column)` cells are
    /// selectable.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidDimensions` If `block_width` or `block_height`
    /// is invalid (zero).
    /// * `SudokuError::OutOfBounds` If any cell coordinate is greater than
    /// or equal to the grid size.
    pub fn from_cells(block_width: usize, block_height: usize,
            cells: impl IntoIterator<Item = (usize, usize)>)
            -> SudokuResult<Mask> {
        let mut mask = Mask::new(block_width, block_height)?;

        for (row, column) in cells {
            if row >= mask.size || column >= mask.size {
                return Err(SudokuError::OutOfBounds);
            }

            mask.cells[index(row, column, mask.size)] = true;
        }

        Ok(mask)
    }

    /// Creates a random mask with at least `count` selectable cells. Cells
    /// are drawn uniformly and, in the manner of classic published puzzles,
    /// every drawn cell is paired with its 180° rotational image, so the
    /// result is symmetric under half-turn rotation and may contain up to
    /// one cell more than requested.
    ///
    /// # Arguments
    ///
    /// * `block_width`: The horizontal dimension of one sub-block of the
    /// grid. Must be greater than 0.
    /// * `block_height`: The vertical dimension of one sub-block of the
    /// grid. Must be greater than 0.
    /// * `count`: The minimum number of selectable cells. Must be at most
    /// the number of cells in the grid.
    /// * `rng`: The random number generator that decides which cells are
    /// selectable.
    ///
    /// # Errors
    ///
    /// * `SudokuError::InvalidDimensions` If `block_width` or `block_height`
    /// is invalid (zero).
    /// * `SudokuError::InvalidNumber` If `count` exceeds the number of
    /// cells in the grid.
    pub fn random(block_width: usize, block_height: usize, count: usize,
            rng: &mut impl rand::Rng) -> SudokuResult<Mask> {
        let mut mask = Mask::new(block_width, block_height)?;
        let cell_count = mask.size * mask.size;

        if count > cell_count {
            return Err(SudokuError::InvalidNumber);
        }

        let mut selected = 0;

        while selected < count {
            let cell = rng.gen_range(0..cell_count);

            if mask.cells[cell] {
                continue;
            }

            mask.cells[cell] = true;
            selected += 1;
            let mirrored = cell_count - 1 - cell;

            if !mask.cells[mirrored] {
                mask.cells[mirrored] = true;
                selected += 1;
            }
        }

        Ok(mask)
    }

    /// Gets the total size of the grids this mask applies to on one axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the block width of the grids this mask applies to.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Gets the block height of the grids this mask applies to.
    pub fn block_height(&self) -> usize {
        self.block_height
    }

    /// Indicates whether the cell at the specified position may be selected
    /// by a composition strategy. Cells outside the grid are reported as
    /// not selectable.
    pub fn is_selectable(&self, row: usize, column: usize) -> bool {
        if row >= self.size || column >= self.size {
            false
        }
        else {
            self.cells[index(row, column, self.size)]
        }
    }

    /// Returns the number of selectable cells in this mask.
    pub fn count_selectable(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
