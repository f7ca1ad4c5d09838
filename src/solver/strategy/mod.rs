//! This module is about the candidate-selection strategies that drive the
//! backtracking [Solver](crate::solver::Solver).
//!
//! A strategy proposes, at every step of the search, a pool of equally
//! ranked candidate moves together with a confidence score, commits the
//! move the solver picks, and rewinds its bookkeeping when the solver
//! unwinds. The crate provides a small library of strategies:
//!
//! * [LeastCandidatesCell] looks for the empty cell with the fewest
//! remaining candidate values.
//! * [LeastCandidatesSector] looks for the (value, sector) pair with the
//! fewest remaining placements, where a sector is any row, column, or
//! block.
//! * [LeastCandidatesHybrid] runs both of the above on every step and
//! adopts whichever reports the more constrained position. This is the
//! recommended general-purpose solving strategy.
//! * [MostEliminating] picks the move that eliminates the most remaining
//! live candidates, restricted to a [Mask](crate::Mask) of selectable
//! cells. It is used to compose puzzles, not to solve them.
//!
//! Strategies record every committed move on a *thread*, the ordered
//! sequence of moves that defines the current path through the search
//! space. Before every move that had at least one alternative, the
//! constraint state is copied to a snapshot slot, so unwinding restores
//! the exact bookkeeping of the branch point. Forced moves (score 1) skip
//! the snapshot, since they can be replayed deterministically.

pub mod compose;
pub mod least_candidates;

pub use compose::MostEliminating;
pub use least_candidates::{
    LeastCandidatesCell,
    LeastCandidatesHybrid,
    LeastCandidatesSector
};

use crate::SudokuGrid;
use crate::error::{SudokuError, SudokuResult};
use crate::state::ConstraintState;

use rand::{Rng, RngCore};

/// A single commitment of a value to a cell, the unit the search thread is
/// made of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Move {

    /// The row (y-coordinate) of the cell the move fills.
    pub row: usize,

    /// The column (x-coordinate) of the cell the move fills.
    pub column: usize,

    /// The value the move writes, in the range `[1, size]`.
    pub value: usize
}

/// The contract between the [Solver](crate::solver::Solver) and a
/// candidate-selection strategy. The solver drives a strategy to
/// exhaustion or success: it asks for candidates, commits one of them,
/// and, on a dead end, asks the strategy how far to rewind.
///
/// A strategy must be freshly constructed or have completed a previous
/// solve before it is handed to the solver; [Strategy::setup] is called
/// once per solve and sizes all internal state.
pub trait Strategy {

    /// Sizes the internal state for the given grid and replays the clues
    /// it already contains. Returns `Ok(false)` when the clues contradict
    /// each other, in which case the grid is unsolvable as given and no
    /// search is necessary.
    ///
    /// # Errors
    ///
    /// If an internal fault occurs. Contradictory input clues are *not* an
    /// error.
    fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool>;

    /// Scans the grid for the pool of moves that best satisfy this
    /// strategy's heuristic and stores them for [Strategy::select_candidate].
    /// Returns the number of stored candidates.
    ///
    /// When some cell or sector provably has no candidate left, 0 is
    /// returned immediately and the score is set to 0, marking a dead end.
    /// Depending on the strategy's mode, the scan may stop after the first
    /// optimal candidate or enumerate the complete tied pool for random
    /// selection.
    fn find_candidates(&mut self, grid: &SudokuGrid) -> usize;

    /// Picks one move from the pool stored by the last
    /// [Strategy::find_candidates] call: uniformly at random if this
    /// strategy randomizes and more than one candidate is tied, otherwise
    /// the first one in scan order (lowest row, then column, then value).
    ///
    /// Must only be called when the last [Strategy::find_candidates]
    /// returned a nonzero count.
    fn select_candidate(&mut self) -> Move;

    /// A measure of the confidence the strategy holds in its candidates,
    /// set by [Strategy::find_candidates]. Lower scores mean a more
    /// constrained position; 0 marks a dead end and 1 a forced move.
    /// Scores are only comparable between strategies of the same family.
    fn score(&self) -> usize;

    /// Commits the given move to the thread and to the constraint state.
    /// `write_state` controls whether a snapshot is taken before the move;
    /// the solver skips snapshots for forced moves, as no alternative
    /// branch will ever need the restore point.
    ///
    /// # Errors
    ///
    /// `SudokuError::CandidateAlreadyEliminated` if the move was not a
    /// live candidate, which indicates a defect in the strategy logic.
    fn update_state(&mut self, mv: Move, write_state: bool)
        -> SudokuResult<()>;

    /// Rewinds the thread to `new_len` moves: restores the constraint
    /// state from the snapshot at that position, eliminates the undone
    /// move as a candidate, and, if `reset` is set, clears every undone
    /// cell on the grid. `new_len` of `None` abandons the entire thread.
    ///
    /// Returns whether a branch point remained, that is, whether the
    /// search can continue. `false` means the search space is exhausted
    /// from the starting position.
    fn unwind(&mut self, grid: &mut SudokuGrid, new_len: Option<usize>,
        reset: bool) -> bool;

    /// Clears every cell on the thread from the grid, restoring the cells
    /// the way they were before this strategy started committing moves.
    fn reset(&mut self, grid: &mut SudokuGrid);

    /// Returns the number of moves currently on the thread.
    fn thread_len(&self) -> usize;

    /// Returns the most recent thread position at which a snapshot was
    /// taken, i.e. where an alternative move existed and backtracking must
    /// return to. `None` if no such position remains.
    fn last_written_move(&self) -> Option<usize>;
}

struct ThreadMove {
    row: usize,
    column: usize,
    state_written: bool
}

/// Implements the bookkeeping common to all strategy types: the thread of
/// committed moves, the candidate pool of the current step, the confidence
/// score, and the optional random number generator used to break ties.
///
/// Concrete strategies embed a `StrategyBase` and drive their
/// [ConstraintState] through the helpers that take the state as an
/// explicit argument, so the same machinery serves every state variant.
pub struct StrategyBase {
    block_width: usize,
    block_height: usize,
    size: usize,
    thread: Vec<ThreadMove>,
    candidates: Vec<Move>,
    score: usize,
    rng: Option<Box<dyn RngCore>>
}

impl StrategyBase {

    /// Creates a new base with an optional random number generator for
    /// candidate selection.
    pub fn new(rng: Option<Box<dyn RngCore>>) -> StrategyBase {
        StrategyBase {
            block_width: 0,
            block_height: 0,
            size: 0,
            thread: Vec::new(),
            candidates: Vec::new(),
            score: 0,
            rng
        }
    }

    /// Indicates whether a random number generator was injected at
    /// construction time.
    pub fn randomizes(&self) -> bool {
        self.rng.is_some()
    }

    /// Gets the width of one block of the grid being solved.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Gets the height of one block of the grid being solved.
    pub fn block_height(&self) -> usize {
        self.block_height
    }

    /// Gets the size of the grid being solved.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Gets the confidence score of the current candidate pool.
    pub fn score(&self) -> usize {
        self.score
    }

    /// Sets the confidence score of the current candidate pool.
    pub fn set_score(&mut self, score: usize) {
        self.score = score;
    }

    /// Gets the candidate pool of the current step.
    pub fn candidates(&self) -> &[Move] {
        &self.candidates
    }

    /// Empties the candidate pool.
    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
    }

    /// Adds a move to the candidate pool and returns the new pool size.
    pub fn push_candidate(&mut self, mv: Move) -> usize {
        self.candidates.push(mv);
        self.candidates.len()
    }

    /// Adopts the complete candidate pool and score of another base. Used
    /// by the hybrid to take over the result of whichever of its children
    /// reported the more constrained position.
    pub fn adopt_candidates(&mut self, other: &StrategyBase) {
        self.candidates.clear();
        self.candidates.extend_from_slice(&other.candidates);
        self.score = other.score;
    }

    /// Sizes this base for the given grid and empties the thread and the
    /// candidate pool.
    pub fn setup(&mut self, grid: &SudokuGrid) {
        self.block_width = grid.block_width();
        self.block_height = grid.block_height();
        self.size = grid.size();
        self.thread.clear();
        self.thread.reserve(self.size * self.size);
        self.candidates.clear();
        self.score = 0;
    }

    /// Picks one move from the candidate pool: uniformly at random if a
    /// random number generator is present and more than one candidate is
    /// tied, the first in scan order otherwise. The pool must not be
    /// empty.
    pub fn select_candidate(&mut self) -> Move {
        let pick = match self.rng.as_mut() {
            Some(rng) if self.candidates.len() > 1 =>
                rng.gen_range(0..self.candidates.len()),
            _ => 0
        };

        self.candidates[pick]
    }

    /// Returns the number of moves currently on the thread.
    pub fn thread_len(&self) -> usize {
        self.thread.len()
    }

    /// Returns the most recent thread position whose move was preceded by
    /// a snapshot, or `None` if the thread holds no such position.
    pub fn last_written_move(&self) -> Option<usize> {
        self.thread.iter().rposition(|entry| entry.state_written)
    }

    /// Commits a move to the thread and to the given constraint state,
    /// taking a snapshot first if `write_state` is set.
    ///
    /// # Errors
    ///
    /// `SudokuError::CandidateAlreadyEliminated` if the move was not a
    /// live candidate of the state.
    pub fn update_state(&mut self, state: &mut dyn ConstraintState,
            mv: Move, write_state: bool) -> SudokuResult<()> {
        if write_state {
            state.push_state(self.thread.len());
        }

        self.thread.push(ThreadMove {
            row: mv.row,
            column: mv.column,
            state_written: write_state
        });

        state.add_move(mv.row, mv.column, mv.value)
    }

    /// Records a move on the thread without touching any constraint state.
    /// The hybrid uses this for its own thread while its children maintain
    /// their states.
    pub fn record_move(&mut self, mv: Move, write_state: bool) {
        self.thread.push(ThreadMove {
            row: mv.row,
            column: mv.column,
            state_written: write_state
        });
    }

    /// Rewinds the thread to `new_len` moves against the given constraint
    /// state: restores the snapshot at the new position, eliminates the
    /// undone move as a candidate, and, if `reset` is set, clears every
    /// undone cell from the grid. Returns whether the thread still has a
    /// position to branch from, i.e. whether `new_len` was not `None`.
    pub fn unwind(&mut self, state: &mut dyn ConstraintState,
            grid: &mut SudokuGrid, new_len: Option<usize>, reset: bool)
            -> bool {
        if let Some(new_len) = new_len {
            state.pop_state(new_len);
            let undone = &self.thread[new_len];
            let value = grid.value(undone.row, undone.column);
            state.eliminate_move(undone.row, undone.column, value);
        }

        self.truncate_thread(grid, new_len, reset);
        new_len.is_some()
    }

    /// Rewinds the thread to `new_len` moves without touching any
    /// constraint state, clearing the undone cells from the grid if
    /// `reset` is set. The hybrid uses this for its own thread after
    /// having forwarded the unwind to its children.
    pub fn truncate_thread(&mut self, grid: &mut SudokuGrid,
            new_len: Option<usize>, reset: bool) {
        let new_len = new_len.unwrap_or(0);

        if reset {
            for entry in &self.thread[new_len..] {
                grid.set_value(entry.row, entry.column, 0);
            }
        }

        self.thread.truncate(new_len);
    }

    /// Clears every cell on the thread from the grid and empties the
    /// thread.
    pub fn reset(&mut self, grid: &mut SudokuGrid) {
        while let Some(entry) = self.thread.pop() {
            grid.set_value(entry.row, entry.column, 0);
        }
    }

    /// Replays the clues of the given grid into the constraint state.
    /// Returns `Ok(false)` when the clues contradict each other, that is,
    /// when some clue is not a live candidate once the earlier clues are
    /// committed.
    pub fn replay_clues(&mut self, state: &mut dyn ConstraintState,
            grid: &SudokuGrid) -> SudokuResult<bool> {
        let size = self.size;

        for row in 0..size {
            for column in 0..size {
                let value = grid.value(row, column);

                if value == 0 {
                    continue;
                }

                match state.add_move(row, column, value) {
                    Ok(()) => { },
                    Err(SudokuError::CandidateAlreadyEliminated { .. }) =>
                        return Ok(false),
                    Err(error) => return Err(error)
                }
            }
        }

        Ok(true)
    }
}
