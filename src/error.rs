//! This module contains some error and result definitions used in this crate.

use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;

/// Miscellaneous errors that can occur on some methods in the
/// [root module](../index.html) and in the [solver](../solver/index.html).
/// This does not exclude errors that occur when parsing Sudoku, see
/// [SudokuParseError](enum.SudokuParseError.html) for that.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SudokuError {

    /// Indicates that the block dimensions specified for a created grid or
    /// mask are invalid. This is the case if they are less than 1.
    InvalidDimensions,

    /// Indicates that some number is invalid for the size of the grid in
    /// question. This is the case if it is less than 1 or greater than the
    /// size.
    InvalidNumber,

    /// Indicates that the specified coordinates (row and column) lie outside
    /// the grid in question. This is the case if they are greater than or
    /// equal to the size.
    OutOfBounds,

    /// Indicates that a strategy committed a move whose candidate had
    /// already been eliminated. This is a defect in the strategy logic, not
    /// a property of the puzzle, and aborts the solve in which it occurred.
    CandidateAlreadyEliminated {

        /// The row of the faulty move.
        row: usize,

        /// The column of the faulty move.
        column: usize,

        /// The value of the faulty move.
        value: usize
    },

    /// An error that is raised whenever it is attempted to compose a puzzle
    /// with a mask under which no uniquely solvable puzzle exists.
    UnsatisfiableMask
}

impl Display for SudokuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SudokuError::InvalidDimensions =>
                write!(f, "invalid block dimensions"),
            SudokuError::InvalidNumber =>
                write!(f, "number out of range for the grid size"),
            SudokuError::OutOfBounds =>
                write!(f, "cell coordinates outside the grid"),
            SudokuError::CandidateAlreadyEliminated { row, column, value } =>
                write!(f,
                    "move ({},{}):={} was committed although its candidate \
                    had been eliminated", row, column, value),
            SudokuError::UnsatisfiableMask =>
                write!(f, "no uniquely solvable puzzle exists for the mask")
        }
    }
}

impl std::error::Error for SudokuError { }

/// Syntactic sugar for `Result<V, SudokuError>`.
pub type SudokuResult<V> = Result<V, SudokuError>;

/// An enumeration of the errors that may occur when parsing a `SudokuGrid`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SudokuParseError {

    /// Indicates that the code has the wrong number of parts, which are
    /// separated by semicolons. The code should have two parts: dimensions
    /// and cells (separated by ';'), so if the code does not contain exactly
    /// one semicolon, this error will be returned.
    WrongNumberOfParts,

    /// Indicates that the number of cells (which are separated by commas)
    /// does not equal the number deduced from the dimensions.
    WrongNumberOfCells,

    /// Indicates that the dimensions have the wrong format. They should be
    /// of the form `<block_width>x<block_height>`, so if the amount of 'x's
    /// in the dimension string is not exactly one, this error will be
    /// raised.
    MalformedDimensions,

    /// Indicates that the provided dimensions are invalid (i.e. at least
    /// one is zero).
    InvalidDimensions,

    /// Indicates that one of the numbers (dimension or cell content) could
    /// not be parsed.
    NumberFormatError,

    /// Indicates that a cell is filled with an invalid number (0 or more
    /// than the grid size).
    InvalidNumber
}

impl Display for SudokuParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SudokuParseError::WrongNumberOfParts =>
                write!(f, "code does not consist of dimensions and cells"),
            SudokuParseError::WrongNumberOfCells =>
                write!(f, "number of cells does not match the dimensions"),
            SudokuParseError::MalformedDimensions =>
                write!(f, "dimensions are not of the form <width>x<height>"),
            SudokuParseError::InvalidDimensions =>
                write!(f, "invalid block dimensions"),
            SudokuParseError::NumberFormatError =>
                write!(f, "number could not be parsed"),
            SudokuParseError::InvalidNumber =>
                write!(f, "cell number out of range for the grid size")
        }
    }
}

impl std::error::Error for SudokuParseError { }

impl From<ParseIntError> for SudokuParseError {
    fn from(_: ParseIntError) -> Self {
        SudokuParseError::NumberFormatError
    }
}

/// Syntactic sugar for `Result<V, SudokuParseError>`.
pub type SudokuParseResult<V> = Result<V, SudokuParseError>;
