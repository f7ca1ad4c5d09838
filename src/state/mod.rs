//! This module contains the constraint states that record which candidates
//! have been eliminated by the moves committed so far.
//!
//! Three interchangeable variants are provided, each tracking a different
//! index space while obeying the same lifecycle:
//!
//! * [CellState] counts, for each cell, the values that have been
//! eliminated as candidates. A cell whose count reaches the grid size is
//! provably unsolvable from the current position.
//! * [SectorState] keeps the same bookkeeping indexed by (value, sector),
//! where a sector is any row, column, or block. It detects that a value has
//! no remaining placement within a sector even when no single cell is
//! exhausted.
//! * [ImpactState] counts, for each (cell, value) pair, how many of the
//! other pairs that the move would eliminate have already been eliminated
//! themselves. It supports picking the most constraining move during
//! puzzle composition, the opposite of the least-candidates heuristics.
//!
//! Every state supports snapshots keyed by thread position, so that the
//! strategies can restore the exact bookkeeping of an earlier search
//! position when the thread is unwound. Snapshot slots are allocated once
//! per grid size and reused across solves.

pub mod cell;
pub mod impact;
pub mod sector;

pub use cell::CellState;
pub use impact::ImpactState;
pub use sector::SectorState;

use crate::error::SudokuResult;

/// The lifecycle contract shared by all constraint-state variants. A state
/// is bound to one strategy, sized by [ConstraintState::setup], updated
/// through commits and prunes, and rolled back through the snapshot stack.
/// The variant is chosen when the owning strategy is constructed; the
/// shared thread machinery drives states solely through this trait.
pub trait ConstraintState {

    /// Sizes the internal arrays for grids with the given block dimensions
    /// and clears all bookkeeping. Arrays are reallocated only when the
    /// dimensions have changed since the last call, otherwise they are
    /// zeroed in place. This method can be called repeatedly across solves.
    fn setup(&mut self, block_width: usize, block_height: usize);

    /// Commits the move `(row, column) := value`, eliminating the affected
    /// candidates of every peer in the same row, column, and block, and of
    /// the placing cell itself.
    ///
    /// # Errors
    ///
    /// `SudokuError::CandidateAlreadyEliminated` if the move had already
    /// been eliminated as a candidate. This indicates a defect in the
    /// driving strategy and the solve it occurred in must be aborted.
    fn add_move(&mut self, row: usize, column: usize, value: usize)
        -> SudokuResult<()>;

    /// Eliminates the single candidate `(row, column) := value` without
    /// committing a move, leaving all peers untouched. This prunes a
    /// candidate that was proven invalid when the search below it was
    /// exhausted.
    fn eliminate_move(&mut self, row: usize, column: usize, value: usize);

    /// Copies the complete bookkeeping into the snapshot slot for the given
    /// thread position.
    fn push_state(&mut self, position: usize);

    /// Restores the complete bookkeeping from the snapshot slot for the
    /// given thread position. The restored state is bit-exact: every flag
    /// and counter reads as it did immediately after the corresponding
    /// [ConstraintState::push_state].
    fn pop_state(&mut self, position: usize);
}
