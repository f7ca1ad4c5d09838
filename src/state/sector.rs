//! Contains the sector-oriented constraint state. See [SectorState] for
//! more details.

use crate::error::{SudokuError, SudokuResult};
use crate::state::ConstraintState;
use crate::util::USizeSet;

/// A constraint state that records, for each pair of a value and a sector,
/// the set of positions within the sector that have been eliminated for the
/// value. A sector is any row, column, or block: sectors `0..size` are the
/// rows, `size..2 * size` the columns, and `2 * size..3 * size` the blocks.
///
/// This view detects that a value has no remaining placement within a
/// sector even when no single cell has run out of candidates, which the
/// cell-oriented bookkeeping cannot see. A separate flag per (value,
/// sector) records that the value has already been placed there, so filled
/// sectors are not mistaken for exhausted ones.
#[derive(Clone, Debug)]
pub struct SectorState {
    block_width: usize,
    block_height: usize,
    size: usize,
    eliminated: Vec<USizeSet>,
    filled: Vec<bool>,
    snapshot_eliminated: Vec<Vec<USizeSet>>,
    snapshot_filled: Vec<Vec<bool>>
}

impl SectorState {

    /// Creates a state for an empty grid. [ConstraintState::setup] must be
    /// called before any other operation.
    pub fn new() -> SectorState {
        SectorState {
            block_width: 0,
            block_height: 0,
            size: 0,
            eliminated: Vec::new(),
            filled: Vec::new(),
            snapshot_eliminated: Vec::new(),
            snapshot_filled: Vec::new()
        }
    }

    fn vs_index(&self, value: usize, sector: usize) -> usize {
        (value - 1) * 3 * self.size + sector
    }

    fn block_of(&self, row: usize, column: usize) -> usize {
        row / self.block_height * self.block_height
            + column / self.block_width
    }

    fn position_in_block(&self, row: usize, column: usize) -> usize {
        row % self.block_height * self.block_width
            + column % self.block_width
    }

    /// Indicates whether the given position within the sector has been
    /// eliminated as a placement for the value.
    pub fn is_eliminated(&self, value: usize, sector: usize, position: usize)
            -> bool {
        self.eliminated[self.vs_index(value, sector)].contains(position)
    }

    /// Returns the number of positions within the sector that have been
    /// eliminated as placements for the value.
    pub fn n_eliminated(&self, value: usize, sector: usize) -> usize {
        self.eliminated[self.vs_index(value, sector)].len()
    }

    /// Indicates whether the value has already been placed somewhere in the
    /// sector.
    pub fn is_filled(&self, value: usize, sector: usize) -> bool {
        self.filled[self.vs_index(value, sector)]
    }

    fn eliminate(&mut self, value: usize, sector: usize, position: usize) {
        let index = self.vs_index(value, sector);
        self.eliminated[index].insert(position).unwrap();
    }

    fn fill(&mut self, value: usize, sector: usize, filled: bool) {
        let index = self.vs_index(value, sector);
        self.filled[index] = filled;
    }

    // Eliminates the value at the cell (row, column) in all three sectors
    // that contain the cell.
    fn eliminate_cell(&mut self, value: usize, row: usize, column: usize) {
        let size = self.size;
        let block = self.block_of(row, column);
        let position = self.position_in_block(row, column);
        self.eliminate(value, row, column);
        self.eliminate(value, size + column, row);
        self.eliminate(value, 2 * size + block, position);
    }
}

impl Default for SectorState {
    fn default() -> SectorState {
        SectorState::new()
    }
}

impl ConstraintState for SectorState {

    fn setup(&mut self, block_width: usize, block_height: usize) {
        self.block_width = block_width;
        self.block_height = block_height;

        if self.size != block_width * block_height {
            self.size = block_width * block_height;
            let pairs = 3 * self.size * self.size;
            let empty = USizeSet::new(0, self.size - 1).unwrap();
            self.eliminated = vec![empty; pairs];
            self.filled = vec![false; pairs];

            let cells = self.size * self.size;
            self.snapshot_eliminated = vec![self.eliminated.clone(); cells];
            self.snapshot_filled = vec![self.filled.clone(); cells];
        }
        else {
            for set in self.eliminated.iter_mut() {
                set.clear();
            }

            for flag in self.filled.iter_mut() {
                *flag = false;
            }
        }
    }

    fn add_move(&mut self, row: usize, column: usize, value: usize)
            -> SudokuResult<()> {
        let size = self.size;
        let block = self.block_of(row, column);
        let position = self.position_in_block(row, column);

        if self.is_eliminated(value, row, column)
                || self.is_eliminated(value, size + column, row)
                || self.is_eliminated(value, 2 * size + block, position) {
            return Err(SudokuError::CandidateAlreadyEliminated {
                row,
                column,
                value
            });
        }

        // Note which sectors have been filled.
        self.fill(value, row, true);
        self.fill(value, size + column, true);
        self.fill(value, 2 * size + block, true);

        // The value can no longer go on any peer of the placing cell, in
        // whichever sector the peer is viewed.
        for i in 0..size {
            if i != column {
                self.eliminate_cell(value, row, i);
            }

            if i != row {
                self.eliminate_cell(value, i, column);
            }
        }

        let block_row = row / self.block_height * self.block_height;
        let block_column = column / self.block_width * self.block_width;

        for i in block_row..(block_row + self.block_height) {
            for j in block_column..(block_column + self.block_width) {
                if i != row && j != column {
                    self.eliminate_cell(value, i, j);
                }
            }
        }

        debug_assert!(self.n_eliminated(value, row) == size - 1);
        debug_assert!(self.n_eliminated(value, size + column) == size - 1);
        debug_assert!(
            self.n_eliminated(value, 2 * size + block) == size - 1);

        // Other values can no longer go on the placing cell.
        for other_value in 1..=size {
            if other_value != value {
                self.eliminate(other_value, row, column);
                self.eliminate(other_value, size + column, row);
                self.eliminate(other_value, 2 * size + block, position);
            }
        }

        Ok(())
    }

    fn eliminate_move(&mut self, row: usize, column: usize, value: usize) {
        let size = self.size;
        let block = self.block_of(row, column);
        self.eliminate_cell(value, row, column);
        self.fill(value, row, false);
        self.fill(value, size + column, false);
        self.fill(value, 2 * size + block, false);
    }

    fn push_state(&mut self, position: usize) {
        self.snapshot_eliminated[position].clone_from(&self.eliminated);
        self.snapshot_filled[position].clone_from(&self.filled);
    }

    fn pop_state(&mut self, position: usize) {
        self.eliminated.clone_from(&self.snapshot_eliminated[position]);
        self.filled.clone_from(&self.snapshot_filled[position]);
    }
}
