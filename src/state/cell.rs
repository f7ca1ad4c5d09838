//! Contains the cell-oriented constraint state. See [CellState] for more
//! details.

use crate::error::{SudokuError, SudokuResult};
use crate::index;
use crate::state::ConstraintState;
use crate::util::USizeSet;

/// A constraint state that records, for each cell of the grid, the set of
/// values that have been eliminated as candidates. The number of
/// eliminations per cell is the length of its set, so a cell with as many
/// eliminations as the grid size has no candidates left and proves the
/// current search position unsolvable.
#[derive(Clone, Debug)]
pub struct CellState {
    block_width: usize,
    block_height: usize,
    size: usize,
    eliminated: Vec<USizeSet>,
    snapshots: Vec<Vec<USizeSet>>
}

impl CellState {

    /// Creates a state for an empty grid. [ConstraintState::setup] must be
    /// called before any other operation.
    pub fn new() -> CellState {
        CellState {
            block_width: 0,
            block_height: 0,
            size: 0,
            eliminated: Vec::new(),
            snapshots: Vec::new()
        }
    }

    /// Indicates whether the move `(row, column) := value` has been
    /// eliminated.
    pub fn is_eliminated(&self, row: usize, column: usize, value: usize)
            -> bool {
        self.eliminated[index(row, column, self.size)].contains(value)
    }

    /// Returns the number of values eliminated as candidates for the cell
    /// at the given position.
    pub fn n_eliminated(&self, row: usize, column: usize) -> usize {
        self.eliminated[index(row, column, self.size)].len()
    }

    fn eliminate(&mut self, row: usize, column: usize, value: usize) {
        let index = index(row, column, self.size);
        self.eliminated[index].insert(value).unwrap();
    }
}

impl Default for CellState {
    fn default() -> CellState {
        CellState::new()
    }
}

impl ConstraintState for CellState {

    fn setup(&mut self, block_width: usize, block_height: usize) {
        self.block_width = block_width;
        self.block_height = block_height;

        if self.size != block_width * block_height {
            self.size = block_width * block_height;
            let cells = self.size * self.size;
            let empty = USizeSet::new(1, self.size).unwrap();
            self.eliminated = vec![empty; cells];
            self.snapshots = vec![self.eliminated.clone(); cells];
        }
        else {
            for set in self.eliminated.iter_mut() {
                set.clear();
            }
        }
    }

    fn add_move(&mut self, row: usize, column: usize, value: usize)
            -> SudokuResult<()> {
        if self.is_eliminated(row, column, value) {
            return Err(SudokuError::CandidateAlreadyEliminated {
                row,
                column,
                value
            });
        }

        let size = self.size;

        // Eliminate other candidates for the placing cell.
        for other_value in 1..=size {
            if other_value != value {
                self.eliminate(row, column, other_value);
            }
        }

        debug_assert!(self.n_eliminated(row, column) == size - 1);

        // Eliminate the value for the rest of the row and column.
        for i in 0..size {
            if i != column {
                self.eliminate(row, i, value);
            }

            if i != row {
                self.eliminate(i, column, value);
            }
        }

        // Eliminate the value for the rest of the block.
        let block_row = row / self.block_height * self.block_height;
        let block_column = column / self.block_width * self.block_width;

        for i in block_row..(block_row + self.block_height) {
            for j in block_column..(block_column + self.block_width) {
                if i != row && j != column {
                    self.eliminate(i, j, value);
                }
            }
        }

        Ok(())
    }

    fn eliminate_move(&mut self, row: usize, column: usize, value: usize) {
        self.eliminate(row, column, value);
    }

    fn push_state(&mut self, position: usize) {
        self.snapshots[position].clone_from(&self.eliminated);
    }

    fn pop_state(&mut self, position: usize) {
        self.eliminated.clone_from(&self.snapshots[position]);
    }
}
