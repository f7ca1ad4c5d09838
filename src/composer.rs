//! This module contains the high-level driver for composing puzzles.
//!
//! Composition starts from an empty grid and fills cells permitted by a
//! [Mask] with values chosen by the [MostEliminating] strategy, which
//! prefers maximally constraining placements. After every placement beyond
//! a configurable threshold, an independent verifier counts the solutions
//! of the partial grid: placements that kill the grid are backtracked, and
//! as soon as exactly one solution remains, the placed cells are the
//! finished puzzle.

use crate::{Mask, SudokuGrid};
use crate::error::{SudokuError, SudokuResult};
use crate::solver::{Compose, SolveLimits, Solver};
use crate::solver::strategy::{LeastCandidatesHybrid, MostEliminating};

use log::debug;

use rand::RngCore;

/// A successfully composed puzzle: the grid holding the chosen clues and a
/// difficulty estimate.
#[derive(Clone, Debug)]
pub struct ComposedPuzzle {
    grid: SudokuGrid,
    complexity: usize
}

impl ComposedPuzzle {

    /// Gets the puzzle grid. Its filled cells are the clues; every empty
    /// cell is uniquely determined by them.
    pub fn grid(&self) -> &SudokuGrid {
        &self.grid
    }

    /// Extracts the puzzle grid.
    pub fn into_grid(self) -> SudokuGrid {
        self.grid
    }

    /// The cumulative complexity a solver spent proving the puzzle
    /// uniquely solvable: the total number of moves it had to undo. Higher
    /// numbers indicate puzzles that require more search effort, which
    /// makes this a rough, human-facing difficulty measure.
    pub fn complexity(&self) -> usize {
        self.complexity
    }
}

/// Composes puzzles with a unique solution from a [Mask] of permitted clue
/// cells. The composer owns the [Solver] it drives, so repeated
/// compositions of the same grid size reuse the allocated search state.
pub struct Composer {
    solver: Solver
}

impl Composer {

    /// Creates a new composer.
    pub fn new() -> Composer {
        Composer {
            solver: Solver::new()
        }
    }

    /// Composes a puzzle deterministically: the same mask and threshold
    /// always produce the same puzzle.
    ///
    /// # Arguments
    ///
    /// * `mask`: The cells the composition may fill with clues.
    /// * `threshold`: The number of filled cells from which on every
    /// placement is followed by a uniqueness check. Lower thresholds prune
    /// dead placements earlier at the cost of more verification runs.
    ///
    /// # Errors
    ///
    /// `SudokuError::UnsatisfiableMask` if no assignment of clues to the
    /// masked cells pins down a unique solution.
    pub fn compose(&mut self, mask: &Mask, threshold: usize)
            -> SudokuResult<ComposedPuzzle> {
        self.compose_with(MostEliminating::new(mask.clone()), mask,
            threshold)
    }

    /// Composes a puzzle like [Composer::compose], but breaks ties between
    /// equally constraining placements with the given random number
    /// generator, so different seeds yield different puzzles.
    ///
    /// # Errors
    ///
    /// `SudokuError::UnsatisfiableMask` if no assignment of clues to the
    /// masked cells pins down a unique solution.
    pub fn compose_with_rng(&mut self, mask: &Mask, threshold: usize,
            rng: impl RngCore + 'static) -> SudokuResult<ComposedPuzzle> {
        self.compose_with(MostEliminating::with_rng(mask.clone(), rng), mask,
            threshold)
    }

    fn compose_with(&mut self, mut strategy: MostEliminating, mask: &Mask,
            threshold: usize) -> SudokuResult<ComposedPuzzle> {
        let mut grid = SudokuGrid::new(mask.block_width(),
            mask.block_height())?;
        let mut verifier = LeastCandidatesHybrid::new();
        let mut puzzle = None;
        let mut on_solution = |solved: &SudokuGrid| {
            puzzle = Some(solved.clone());
        };
        let compose = Compose::new(&mut verifier, threshold,
            &mut on_solution);
        let limits = SolveLimits::default().with_max_solutions(1);
        self.solver.solve(&mut grid, &mut strategy, Some(compose), &limits)?;

        let puzzle = match puzzle {
            Some(puzzle) => puzzle,
            None => return Err(SudokuError::UnsatisfiableMask)
        };

        // Solve the finished puzzle once more to measure how much search
        // effort it takes, which doubles as a uniqueness check.
        let mut copy = puzzle.clone();
        let mut check = LeastCandidatesHybrid::new();
        let n_solutions = self.solver.solve(&mut copy, &mut check, None,
            &SolveLimits::default().with_max_solutions(2))?;
        debug_assert_eq!(1, n_solutions);
        debug!("composed a puzzle with {} clues and complexity {}",
            puzzle.count_filled(), self.solver.complexity());

        Ok(ComposedPuzzle {
            grid: puzzle,
            complexity: self.solver.complexity()
        })
    }
}

impl Default for Composer {
    fn default() -> Composer {
        Composer::new()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use rand::SeedableRng;

    use rand_chacha::ChaCha8Rng;

    fn assert_unique(puzzle: &SudokuGrid) {
        let mut copy = puzzle.clone();
        let mut strategy = LeastCandidatesHybrid::new();
        let n_solutions = Solver::new()
            .solve(&mut copy, &mut strategy, None,
                &SolveLimits::default().with_max_solutions(2))
            .unwrap();
        assert_eq!(1, n_solutions);
    }

    #[test]
    fn composed_puzzle_is_unique() {
        let mask = Mask::all(2, 2).unwrap();
        let mut composer = Composer::new();
        let puzzle = composer.compose(&mask, 4).unwrap();

        assert!(puzzle.grid().is_valid());
        assert!(!puzzle.grid().is_empty());
        assert_unique(puzzle.grid());
    }

    #[test]
    fn composed_clues_respect_the_mask() {
        // Clues confined to the top three rows suffice: three full rows
        // force the fourth, so a unique puzzle exists within the mask.
        let cells = (0..3).flat_map(
            |row| (0..4).map(move |column| (row, column)));
        let mask = Mask::from_cells(2, 2, cells).unwrap();
        let mut composer = Composer::new();
        let puzzle = composer.compose(&mask, 4).unwrap();

        for column in 0..4 {
            assert_eq!(None, puzzle.grid().get_cell(3, column).unwrap());
        }

        assert_unique(puzzle.grid());
    }

    #[test]
    fn composition_is_reproducible() {
        let mask = Mask::all(2, 2).unwrap();
        let mut composer = Composer::new();
        let first = composer.compose(&mask, 4).unwrap();
        let second = composer.compose(&mask, 4).unwrap();

        assert_eq!(first.grid(), second.grid());
        assert_eq!(first.complexity(), second.complexity());
    }

    #[test]
    fn seeded_composition_is_reproducible() {
        let mask = Mask::all(2, 2).unwrap();
        let mut composer = Composer::new();
        let first = composer
            .compose_with_rng(&mask, 4, ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        let second = composer
            .compose_with_rng(&mask, 4, ChaCha8Rng::seed_from_u64(42))
            .unwrap();

        assert_eq!(first.grid(), second.grid());
        assert!(first.grid().is_valid());
        assert_unique(first.grid());
    }

    #[test]
    fn insufficient_mask_is_unsatisfiable() {
        // Clues confined to the top two rows can never pin down the
        // bottom half: every completed top half admits several
        // completions.
        let cells = (0..2).flat_map(
            |row| (0..4).map(move |column| (row, column)));
        let mask = Mask::from_cells(2, 2, cells).unwrap();
        let mut composer = Composer::new();

        assert_eq!(Err(SudokuError::UnsatisfiableMask),
            composer.compose(&mask, 4).map(|puzzle| puzzle.grid().clone()));
    }

    #[test]
    fn empty_mask_is_unsatisfiable() {
        let mask = Mask::new(2, 2).unwrap();
        let mut composer = Composer::new();

        assert_eq!(Err(SudokuError::UnsatisfiableMask),
            composer.compose(&mask, 0).map(|puzzle| puzzle.grid().clone()));
    }

    #[test]
    fn random_mask_composes_with_enough_cells() {
        // A symmetric random mask with most of the grid selectable leaves
        // plenty of room for a unique puzzle.
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mask = Mask::random(2, 2, 12, &mut rng).unwrap();
        let mut composer = Composer::new();
        let puzzle = composer
            .compose_with_rng(&mask, 4, ChaCha8Rng::seed_from_u64(7))
            .unwrap();

        assert_unique(puzzle.grid());
    }

    #[test]
    fn composed_puzzle_reports_difficulty() {
        let mask = Mask::all(2, 2).unwrap();
        let mut composer = Composer::new();
        let puzzle = composer.compose(&mask, 4).unwrap();

        // Proving uniqueness requires searching past the first solution,
        // which undoes at least one move.
        assert!(puzzle.complexity() >= 1);
    }

    #[test]
    fn composer_handles_non_square_blocks() {
        let mask = Mask::all(3, 2).unwrap();
        let mut composer = Composer::new();
        let puzzle = composer.compose(&mask, 8).unwrap();

        assert!(puzzle.grid().is_valid());
        assert_unique(puzzle.grid());
    }
}
