//! Contains the strategies that search for the most constrained part of
//! the grid: [LeastCandidatesCell], [LeastCandidatesSector], and the
//! [LeastCandidatesHybrid] combining them.

use crate::SudokuGrid;
use crate::error::SudokuResult;
use crate::sector_cell;
use crate::solver::strategy::{Move, Strategy, StrategyBase};
use crate::state::{CellState, ConstraintState, SectorState};

use rand::RngCore;

/// A strategy that proposes moves for the empty cell with the fewest
/// remaining candidate values, i.e. the cell with the most eliminations
/// already recorded. All remaining values of the winning cell form the
/// candidate pool, so a cell-based step fixes the cell and leaves the
/// value open.
///
/// Constructed without a random number generator, the scan stops at the
/// first optimal candidate and the search is fully deterministic.
pub struct LeastCandidatesCell {
    base: StrategyBase,
    state: CellState,
    find_many: bool
}

impl LeastCandidatesCell {

    /// Creates a deterministic instance that stops at the first optimal
    /// candidate.
    pub fn new() -> LeastCandidatesCell {
        LeastCandidatesCell {
            base: StrategyBase::new(None),
            state: CellState::new(),
            find_many: false
        }
    }

    /// Creates an instance that enumerates all tied candidates and selects
    /// among them uniformly at random with the given random number
    /// generator.
    pub fn with_rng(rng: impl RngCore + 'static) -> LeastCandidatesCell {
        LeastCandidatesCell {
            base: StrategyBase::new(Some(Box::new(rng))),
            state: CellState::new(),
            find_many: true
        }
    }

    fn child(find_many: bool) -> LeastCandidatesCell {
        LeastCandidatesCell {
            base: StrategyBase::new(None),
            state: CellState::new(),
            find_many
        }
    }

    fn base(&self) -> &StrategyBase {
        &self.base
    }
}

impl Default for LeastCandidatesCell {
    fn default() -> LeastCandidatesCell {
        LeastCandidatesCell::new()
    }
}

impl Strategy for LeastCandidatesCell {

    fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool> {
        self.base.setup(grid);
        self.state.setup(grid.block_width(), grid.block_height());
        self.base.replay_clues(&mut self.state, grid)
    }

    fn find_candidates(&mut self, grid: &SudokuGrid) -> usize {
        let size = self.base.size();
        self.base.clear_candidates();
        let mut max_eliminated: Option<usize> = None;

        for row in 0..size {
            for column in 0..size {
                let eliminated = self.state.n_eliminated(row, column);

                if eliminated == size {
                    self.base.set_score(0);
                    return 0;
                }

                if grid.value(row, column) > 0 {
                    continue;
                }

                if max_eliminated.map_or(true, |max| eliminated > max) {
                    max_eliminated = Some(eliminated);
                }
            }
        }

        let max_eliminated = match max_eliminated {
            Some(max) => max,
            None => {
                // No empty cell remains.
                self.base.set_score(0);
                return 0;
            }
        };

        self.base.set_score(size - max_eliminated);

        for row in 0..size {
            for column in 0..size {
                if grid.value(row, column) > 0
                        || self.state.n_eliminated(row, column)
                            != max_eliminated {
                    continue;
                }

                for value in 1..=size {
                    if !self.state.is_eliminated(row, column, value) {
                        let count = self.base.push_candidate(Move {
                            row,
                            column,
                            value
                        });

                        if !self.find_many {
                            return count;
                        }
                    }
                }
            }
        }

        self.base.candidates().len()
    }

    fn select_candidate(&mut self) -> Move {
        self.base.select_candidate()
    }

    fn score(&self) -> usize {
        self.base.score()
    }

    fn update_state(&mut self, mv: Move, write_state: bool)
            -> SudokuResult<()> {
        self.base.update_state(&mut self.state, mv, write_state)
    }

    fn unwind(&mut self, grid: &mut SudokuGrid, new_len: Option<usize>,
            reset: bool) -> bool {
        self.base.unwind(&mut self.state, grid, new_len, reset)
    }

    fn reset(&mut self, grid: &mut SudokuGrid) {
        self.base.reset(grid);
    }

    fn thread_len(&self) -> usize {
        self.base.thread_len()
    }

    fn last_written_move(&self) -> Option<usize> {
        self.base.last_written_move()
    }
}

/// A strategy that proposes moves for the (value, sector) pair with the
/// fewest remaining placements, where a sector is any row, column, or
/// block. All remaining positions of the winning pair form the candidate
/// pool, so a sector-based step fixes the value and leaves the cell open.
/// The winning positions are translated back into grid coordinates.
///
/// Constructed without a random number generator, the scan stops at the
/// first optimal candidate and the search is fully deterministic.
pub struct LeastCandidatesSector {
    base: StrategyBase,
    state: SectorState,
    find_many: bool,
    considered: Vec<bool>
}

impl LeastCandidatesSector {

    /// Creates a deterministic instance that stops at the first optimal
    /// candidate.
    pub fn new() -> LeastCandidatesSector {
        LeastCandidatesSector {
            base: StrategyBase::new(None),
            state: SectorState::new(),
            find_many: false,
            considered: Vec::new()
        }
    }

    /// Creates an instance that enumerates all tied candidates and selects
    /// among them uniformly at random with the given random number
    /// generator.
    pub fn with_rng(rng: impl RngCore + 'static) -> LeastCandidatesSector {
        LeastCandidatesSector {
            base: StrategyBase::new(Some(Box::new(rng))),
            state: SectorState::new(),
            find_many: true,
            considered: Vec::new()
        }
    }

    fn child(find_many: bool) -> LeastCandidatesSector {
        LeastCandidatesSector {
            base: StrategyBase::new(None),
            state: SectorState::new(),
            find_many,
            considered: Vec::new()
        }
    }

    fn base(&self) -> &StrategyBase {
        &self.base
    }

    fn considered_index(&self, row: usize, column: usize, value: usize)
            -> usize {
        crate::index(row, column, self.base.size()) * self.base.size()
            + value - 1
    }
}

impl Default for LeastCandidatesSector {
    fn default() -> LeastCandidatesSector {
        LeastCandidatesSector::new()
    }
}

impl Strategy for LeastCandidatesSector {

    fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool> {
        self.base.setup(grid);
        self.state.setup(grid.block_width(), grid.block_height());

        if self.find_many {
            let size = self.base.size();
            self.considered.clear();
            self.considered.resize(size * size * size, false);
        }

        self.base.replay_clues(&mut self.state, grid)
    }

    fn find_candidates(&mut self, _grid: &SudokuGrid) -> usize {
        let size = self.base.size();
        self.base.clear_candidates();
        let mut max_eliminated: Option<usize> = None;

        for value in 1..=size {
            for sector in 0..3 * size {
                let eliminated = self.state.n_eliminated(value, sector);

                if eliminated == size {
                    self.base.set_score(0);
                    return 0;
                }

                if self.state.is_filled(value, sector) {
                    continue;
                }

                if max_eliminated.map_or(true, |max| eliminated > max) {
                    max_eliminated = Some(eliminated);
                }
            }
        }

        let max_eliminated = match max_eliminated {
            Some(max) => max,
            None => {
                // Every (value, sector) pair is filled.
                self.base.set_score(0);
                return 0;
            }
        };

        self.base.set_score(size - max_eliminated);

        if self.find_many {
            for flag in self.considered.iter_mut() {
                *flag = false;
            }
        }

        // Convert the winning pairs into (row, column) := value moves. In
        // find-many mode the same move can win through its row, column,
        // and block sector, so duplicates are suppressed.
        for value in 1..=size {
            for sector in 0..3 * size {
                if self.state.is_filled(value, sector)
                        || self.state.n_eliminated(value, sector)
                            != max_eliminated {
                    continue;
                }

                for position in 0..size {
                    if self.state.is_eliminated(value, sector, position) {
                        continue;
                    }

                    let (row, column) = sector_cell(sector, position,
                        self.base.block_width(), self.base.block_height());

                    if self.find_many {
                        let index = self.considered_index(row, column, value);

                        if self.considered[index] {
                            continue;
                        }

                        self.considered[index] = true;
                    }

                    let count = self.base.push_candidate(Move {
                        row,
                        column,
                        value
                    });

                    if !self.find_many {
                        return count;
                    }
                }
            }
        }

        self.base.candidates().len()
    }

    fn select_candidate(&mut self) -> Move {
        self.base.select_candidate()
    }

    fn score(&self) -> usize {
        self.base.score()
    }

    fn update_state(&mut self, mv: Move, write_state: bool)
            -> SudokuResult<()> {
        self.base.update_state(&mut self.state, mv, write_state)
    }

    fn unwind(&mut self, grid: &mut SudokuGrid, new_len: Option<usize>,
            reset: bool) -> bool {
        self.base.unwind(&mut self.state, grid, new_len, reset)
    }

    fn reset(&mut self, grid: &mut SudokuGrid) {
        self.base.reset(grid);
    }

    fn thread_len(&self) -> usize {
        self.base.thread_len()
    }

    fn last_written_move(&self) -> Option<usize> {
        self.base.last_written_move()
    }
}

/// A strategy that runs [LeastCandidatesCell] and [LeastCandidatesSector]
/// on every step, compares their scores, and adopts the candidate pool of
/// whichever reported the more constrained position. Commits and unwinds
/// are forwarded to both children so they stay synchronized, and the
/// reported branch point is the earlier of the children's, so neither
/// child's snapshot is ever referenced after it became invalid.
///
/// This is the recommended general-purpose solving strategy.
pub struct LeastCandidatesHybrid {
    base: StrategyBase,
    cell: LeastCandidatesCell,
    sector: LeastCandidatesSector
}

impl LeastCandidatesHybrid {

    /// Creates a deterministic instance.
    pub fn new() -> LeastCandidatesHybrid {
        LeastCandidatesHybrid {
            base: StrategyBase::new(None),
            cell: LeastCandidatesCell::child(false),
            sector: LeastCandidatesSector::child(false)
        }
    }

    /// Creates an instance that selects uniformly at random among tied
    /// candidates with the given random number generator. Both children
    /// then enumerate their complete candidate pools, so the random pick
    /// sees every tied move.
    pub fn with_rng(rng: impl RngCore + 'static) -> LeastCandidatesHybrid {
        LeastCandidatesHybrid {
            base: StrategyBase::new(Some(Box::new(rng))),
            cell: LeastCandidatesCell::child(true),
            sector: LeastCandidatesSector::child(true)
        }
    }
}

impl Default for LeastCandidatesHybrid {
    fn default() -> LeastCandidatesHybrid {
        LeastCandidatesHybrid::new()
    }
}

impl Strategy for LeastCandidatesHybrid {

    fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool> {
        self.base.setup(grid);
        let cell_consistent = self.cell.setup(grid)?;
        let sector_consistent = self.sector.setup(grid)?;
        Ok(cell_consistent && sector_consistent)
    }

    fn find_candidates(&mut self, grid: &SudokuGrid) -> usize {
        if self.cell.find_candidates(grid) == 0
                || self.sector.find_candidates(grid) == 0 {
            self.base.clear_candidates();
            self.base.set_score(0);
            return 0;
        }

        let better = if self.cell.score() < self.sector.score() {
            self.cell.base()
        }
        else {
            self.sector.base()
        };

        self.base.adopt_candidates(better);
        self.base.candidates().len()
    }

    fn select_candidate(&mut self) -> Move {
        self.base.select_candidate()
    }

    fn score(&self) -> usize {
        self.base.score()
    }

    fn update_state(&mut self, mv: Move, write_state: bool)
            -> SudokuResult<()> {
        self.base.record_move(mv, write_state);
        self.cell.update_state(mv, write_state)?;
        self.sector.update_state(mv, write_state)
    }

    fn unwind(&mut self, grid: &mut SudokuGrid, new_len: Option<usize>,
            reset: bool) -> bool {
        // The children restore their states and prune the undone move
        // while it is still on the grid; the cells are cleared afterwards.
        self.cell.unwind(grid, new_len, false);
        self.sector.unwind(grid, new_len, false);
        self.base.truncate_thread(grid, new_len, reset);
        new_len.is_some()
    }

    fn reset(&mut self, grid: &mut SudokuGrid) {
        self.base.reset(grid);
    }

    fn thread_len(&self) -> usize {
        self.base.thread_len()
    }

    fn last_written_move(&self) -> Option<usize> {
        match (self.cell.last_written_move(),
                self.sector.last_written_move()) {
            (Some(cell_move), Some(sector_move)) =>
                Some(cell_move.min(sector_move)),
            _ => None
        }
    }
}
