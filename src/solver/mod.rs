//! This module contains the backtracking engine that drives a
//! [Strategy](strategy::Strategy) across the search space of a grid.
//!
//! The [Solver] repeatedly asks its strategy for candidate moves, commits
//! one of them, and, when the strategy reports a dead end, unwinds the
//! thread to the most recent branch point. Complete solutions are counted
//! up to a caller-specified maximum, and runaway searches can be bounded
//! by budgets on the number of unwinds and on the cumulative complexity.
//!
//! When a [Compose] context is supplied, the solver additionally runs a
//! nested uniqueness check with an independent verifier strategy after
//! every move once enough cells are filled, which turns the search into a
//! puzzle composer: it stops as soon as the placed values pin down exactly
//! one solution.

pub mod strategy;

use crate::SudokuGrid;
use crate::error::SudokuResult;
use crate::solver::strategy::Strategy;

use log::{debug, trace};

/// The budgets that bound one [Solver::solve] call. All limits default to
/// unbounded; a limit of `Some(0)` trips before the first unwind is even
/// performed, which makes the solver give up at the first dead end.
#[derive(Clone, Debug)]
pub struct SolveLimits {
    max_solutions: Option<usize>,
    max_unwinds: Option<usize>,
    max_complexity: Option<usize>,
    count_unwinds: bool
}

impl SolveLimits {

    /// Limits the number of solutions to find before the solver returns.
    /// Searching for one solution more than necessary is the standard way
    /// to prove uniqueness, so verification passes use a limit of 2.
    pub fn with_max_solutions(mut self, max_solutions: usize) -> SolveLimits {
        self.max_solutions = Some(max_solutions);
        self
    }

    /// Limits the number of unwinds the solver may perform. With a limit
    /// of `n`, the solver returns the solutions found so far as soon as
    /// unwind `n + 1` would be needed.
    pub fn with_max_unwinds(mut self, max_unwinds: usize) -> SolveLimits {
        self.max_unwinds = Some(max_unwinds);
        self
    }

    /// Limits the cumulative complexity, that is, the total number of
    /// moves undone by unwinding. The solver returns the solutions found
    /// so far as soon as the counter reaches the limit.
    pub fn with_max_complexity(mut self, max_complexity: usize)
            -> SolveLimits {
        self.max_complexity = Some(max_complexity);
        self
    }

    /// Disables unwind counting for this call: the unwind and complexity
    /// counters of the solver are neither reset nor checked. The nested
    /// uniqueness check runs in this mode so that it cannot clip the
    /// budgets of the search it serves.
    pub fn without_unwind_counting(mut self) -> SolveLimits {
        self.count_unwinds = false;
        self
    }
}

impl Default for SolveLimits {
    fn default() -> SolveLimits {
        SolveLimits {
            max_solutions: None,
            max_unwinds: None,
            max_complexity: None,
            count_unwinds: true
        }
    }
}

/// The composition context for a [Solver::solve] call. Supplying one turns
/// the search into puzzle composition: after every committed move that
/// brings the number of filled cells to `threshold` or above, the
/// `verifier` counts the solutions of the current grid, searching for at
/// most 2.
///
/// * 0 solutions mean the last placement made the grid unsolvable; it is
/// treated as a dead end of the outer search.
/// * Exactly 1 solution proves the composed puzzle is already uniquely
/// solvable; the solver takes a fast path to success without filling the
/// remaining cells.
/// * 2 solutions mean the puzzle is still ambiguous and composition
/// continues.
///
/// The callback is invoked synchronously once per counted solution, with
/// the grid in its solved (or, on the fast path, uniquely solvable)
/// configuration. It must not mutate the grid; it receives a shared
/// borrow.
pub struct Compose<'a> {
    verifier: &'a mut dyn Strategy,
    threshold: usize,
    on_solution: &'a mut dyn FnMut(&SudokuGrid)
}

impl<'a> Compose<'a> {

    /// Bundles a composition context from the uniqueness `verifier`, the
    /// filled-cell `threshold` at which verification starts, and the
    /// completion callback.
    pub fn new(verifier: &'a mut dyn Strategy, threshold: usize,
            on_solution: &'a mut dyn FnMut(&SudokuGrid)) -> Compose<'a> {
        Compose {
            verifier,
            threshold,
            on_solution
        }
    }
}

/// The backtracking engine. It borrows a grid and a strategy for the
/// duration of one [Solver::solve] call and keeps the counters of the most
/// recent call readable afterwards.
///
/// The solver is single-threaded and synchronous; the only nested
/// execution is the composition sub-search, a plain reentrant call with an
/// independent strategy that completes before the outer search continues.
pub struct Solver {
    n_solutions: usize,
    n_unwinds: usize,
    complexity: usize
}

impl Solver {

    /// Creates a solver with zeroed counters.
    pub fn new() -> Solver {
        Solver {
            n_solutions: 0,
            n_unwinds: 0,
            complexity: 0
        }
    }

    /// Returns the number of solutions found by the most recent
    /// [Solver::solve] call.
    pub fn n_solutions(&self) -> usize {
        self.n_solutions
    }

    /// Returns the number of unwinds the most recent counted
    /// [Solver::solve] call had to perform.
    pub fn n_unwinds(&self) -> usize {
        self.n_unwinds
    }

    /// Returns the cumulative complexity of the most recent counted
    /// [Solver::solve] call: the total number of moves that had to be
    /// undone, including those of nested verification runs. This is a
    /// proxy for the search effort and serves as a difficulty measure for
    /// composed puzzles.
    pub fn complexity(&self) -> usize {
        self.complexity
    }

    /// Solves the given grid with the given strategy, returning the number
    /// of complete solutions that were found, capped at the configured
    /// maximum. On success the grid is left in the last found solution;
    /// when the search space or a budget is exhausted instead, every
    /// tentatively filled cell has been restored and the grid holds its
    /// original clues again.
    ///
    /// A grid whose clues contradict each other yields 0 without any
    /// search, as does a grid that is already full.
    ///
    /// # Arguments
    ///
    /// * `grid`: The grid to be solved. Exclusively borrowed for the
    /// duration of the call.
    /// * `strategy`: The strategy that proposes and commits moves. Must be
    /// freshly constructed or have completed a previous solve.
    /// * `compose`: When present, enables the composition mode described
    /// at [Compose].
    /// * `limits`: The budgets bounding this call.
    ///
    /// # Errors
    ///
    /// `SudokuError::CandidateAlreadyEliminated` if the strategy commits a
    /// move that was not a live candidate. This indicates a defect in the
    /// strategy implementation, not a property of the grid.
    pub fn solve(&mut self, grid: &mut SudokuGrid,
            strategy: &mut dyn Strategy, compose: Option<Compose<'_>>,
            limits: &SolveLimits) -> SudokuResult<usize> {
        if limits.count_unwinds {
            self.n_unwinds = 0;
            self.complexity = 0;
        }

        let n_solutions = self.run(grid, strategy, compose, limits)?;
        self.n_solutions = n_solutions;
        Ok(n_solutions)
    }

    fn run(&mut self, grid: &mut SudokuGrid, strategy: &mut dyn Strategy,
            mut compose: Option<Compose<'_>>, limits: &SolveLimits)
            -> SudokuResult<usize> {
        if !strategy.setup(grid)? {
            return Ok(0);
        }

        let cell_count = grid.size() * grid.size();
        let mut n_solutions = 0;
        let mut n_verifier_solutions = 2;

        loop {
            if strategy.find_candidates(grid) == 0 {
                // Stuck.
                if !self.unwind_to_branch_point(grid, strategy, limits) {
                    return Ok(n_solutions);
                }

                continue;
            }

            let mv = strategy.select_candidate();
            grid.set_value(mv.row, mv.column, mv.value);
            let write_state = strategy.score() > 1;
            strategy.update_state(mv, write_state)?;
            let count = grid.count_filled();

            if let Some(compose) = compose.as_mut() {
                if count >= compose.threshold {
                    let verifier_limits = SolveLimits::default()
                        .with_max_solutions(2)
                        .without_unwind_counting();
                    n_verifier_solutions = self.run(grid,
                        &mut *compose.verifier, None, &verifier_limits)?;
                    trace!("verifier found {} solutions for {} placed cells",
                        n_verifier_solutions, count);

                    if n_verifier_solutions == 0 {
                        n_verifier_solutions = 2;

                        // The last placement killed the grid.
                        compose.verifier.reset(grid);

                        if !self.unwind_to_branch_point(grid, strategy,
                                limits) {
                            return Ok(n_solutions);
                        }

                        continue;
                    }
                }
            }

            if count == cell_count || n_verifier_solutions == 1 {
                n_verifier_solutions = 2;
                n_solutions += 1;
                debug!("solution {} found with {} filled cells", n_solutions,
                    count);

                if let Some(compose) = compose.as_mut() {
                    (compose.on_solution)(grid);
                }

                if limits.max_solutions
                        .map_or(false, |max| n_solutions >= max) {
                    return Ok(n_solutions);
                }

                if !self.unwind_to_branch_point(grid, strategy, limits) {
                    return Ok(n_solutions);
                }
            }
            else if let Some(compose) = compose.as_mut() {
                if count >= compose.threshold {
                    compose.verifier.reset(grid);
                }
            }
        }
    }

    // Unwinds to the strategy's last branch point, accounting for the
    // undone moves and enforcing the unwind and complexity budgets.
    // Returns whether the search can continue.
    fn unwind_to_branch_point(&mut self, grid: &mut SudokuGrid,
            strategy: &mut dyn Strategy, limits: &SolveLimits) -> bool {
        let branch_point = strategy.last_written_move();
        let restored_len = branch_point.unwrap_or(0);
        self.complexity += strategy.thread_len() - restored_len;

        if limits.count_unwinds {
            self.n_unwinds += 1;

            if limits.max_unwinds.map_or(false, |max| self.n_unwinds > max) {
                debug!("unwind budget exhausted after {} unwinds",
                    self.n_unwinds - 1);
                return false;
            }

            if limits.max_complexity
                    .map_or(false, |max| self.complexity >= max) {
                debug!("complexity budget exhausted at {}", self.complexity);
                return false;
            }
        }

        strategy.unwind(grid, branch_point, true)
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    use crate::Mask;
    use crate::error::SudokuError;
    use crate::solver::strategy::{
        LeastCandidatesCell,
        LeastCandidatesHybrid,
        LeastCandidatesSector,
        Move,
        MostEliminating
    };
    use crate::state::{CellState, ConstraintState};

    /// The reference 4x4 puzzle. Its clues are only 1s and 4s, so every
    /// solution stays a solution under swapping 2 and 3, which makes the
    /// solution count exactly 2.
    fn reference_puzzle() -> SudokuGrid {
        SudokuGrid::parse("2x2;1, , ,4, , ,1, , ,1, , ,4, , ,1").unwrap()
    }

    /// A grid with two unavoidable {3, 4} rectangles, one in the top and
    /// one in the bottom half, whose choices are independent: exactly 4
    /// solutions.
    fn four_solution_puzzle() -> SudokuGrid {
        SudokuGrid::parse("2x2; ,1, ,2, ,2, ,1,1, ,2, ,2, ,1,").unwrap()
    }

    fn strategies() -> Vec<(&'static str, Box<dyn Strategy>)> {
        vec![
            ("cell", Box::new(LeastCandidatesCell::new())),
            ("sector", Box::new(LeastCandidatesSector::new())),
            ("hybrid", Box::new(LeastCandidatesHybrid::new()))
        ]
    }

    #[test]
    fn reference_puzzle_is_solved() {
        for (name, mut strategy) in strategies() {
            let mut grid = reference_puzzle();
            let mut solver = Solver::new();
            let limits = SolveLimits::default().with_max_solutions(1);
            let n_solutions = solver
                .solve(&mut grid, strategy.as_mut(), None, &limits)
                .unwrap();

            assert_eq!(1, n_solutions, "strategy {} failed", name);
            assert!(grid.is_full(), "strategy {} left holes", name);
            assert!(grid.is_valid(), "strategy {} broke the rules", name);

            // The clues are untouched.
            assert_eq!(Some(1), grid.get_cell(0, 0).unwrap());
            assert_eq!(Some(4), grid.get_cell(0, 3).unwrap());
            assert_eq!(Some(1), grid.get_cell(1, 2).unwrap());
            assert_eq!(Some(1), grid.get_cell(2, 1).unwrap());
            assert_eq!(Some(4), grid.get_cell(3, 0).unwrap());
            assert_eq!(Some(1), grid.get_cell(3, 3).unwrap());
        }
    }

    #[test]
    fn reference_puzzle_has_two_solutions() {
        for (name, mut strategy) in strategies() {
            let mut grid = reference_puzzle();
            let mut solver = Solver::new();
            let n_solutions = solver
                .solve(&mut grid, strategy.as_mut(), None,
                    &SolveLimits::default())
                .unwrap();

            assert_eq!(2, n_solutions, "strategy {} miscounted", name);

            // The exhausted search restored the original clues.
            assert_eq!(reference_puzzle(), grid,
                "strategy {} did not restore the grid", name);
        }
    }

    #[test]
    fn solving_is_deterministic() {
        let solve_once = || {
            let mut grid = reference_puzzle();
            let mut strategy = LeastCandidatesHybrid::new();
            Solver::new()
                .solve(&mut grid, &mut strategy, None,
                    &SolveLimits::default().with_max_solutions(1))
                .unwrap();
            grid
        };

        assert_eq!(solve_once(), solve_once());
    }

    #[test]
    fn contradictory_clues_yield_zero() {
        // Two 1s in the top row.
        let mut grid =
            SudokuGrid::parse("2x2;1, , ,1, , , , , , , , , , , ,").unwrap();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None, &SolveLimits::default())
            .unwrap();

        assert_eq!(0, n_solutions);
    }

    #[test]
    fn unsolvable_grid_is_restored() {
        // Both (0, 3) and (1, 3) can only hold a 4, so the single forced
        // inference chain dead-ends and the thread is fully unwound.
        let puzzle =
            SudokuGrid::parse("2x2;1,2,3, , , , , , , , ,1, , , ,2").unwrap();

        for (name, mut strategy) in strategies() {
            let mut grid = puzzle.clone();
            let mut solver = Solver::new();
            let n_solutions = solver
                .solve(&mut grid, strategy.as_mut(), None,
                    &SolveLimits::default())
                .unwrap();

            assert_eq!(0, n_solutions, "strategy {} found a solution", name);
            assert_eq!(puzzle, grid,
                "strategy {} did not restore the grid", name);
            assert!(solver.n_unwinds() >= 1);
        }
    }

    #[test]
    fn four_solution_puzzle_is_enumerated() {
        for (name, mut strategy) in strategies() {
            let mut grid = four_solution_puzzle();
            let mut solver = Solver::new();
            let n_solutions = solver
                .solve(&mut grid, strategy.as_mut(), None,
                    &SolveLimits::default())
                .unwrap();

            assert_eq!(4, n_solutions, "strategy {} miscounted", name);
            assert!(solver.n_unwinds() >= 4);
            assert!(solver.complexity() >= 4);
        }
    }

    #[test]
    fn max_solutions_caps_enumeration() {
        let mut grid = four_solution_puzzle();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None,
                &SolveLimits::default().with_max_solutions(2))
            .unwrap();

        assert_eq!(2, n_solutions);

        // The search stopped mid-thread, leaving the second solution on
        // the grid.
        assert!(grid.is_full());
        assert!(grid.is_valid());
    }

    #[test]
    fn unwind_budget_cuts_off_early() {
        // Enumerating all 4 solutions needs several unwinds; a budget of 0
        // stops the search right after the first solution although more
        // exist.
        let mut grid = four_solution_puzzle();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None,
                &SolveLimits::default().with_max_unwinds(0))
            .unwrap();

        assert_eq!(1, n_solutions);
        assert_eq!(1, solver.n_unwinds());
    }

    #[test]
    fn complexity_budget_cuts_off_early() {
        let mut grid = four_solution_puzzle();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None,
                &SolveLimits::default().with_max_complexity(0))
            .unwrap();

        assert_eq!(1, n_solutions);
    }

    #[test]
    fn unwind_budget_on_unsolvable_grid_yields_zero() {
        let mut grid =
            SudokuGrid::parse("2x2;1,2,3, , , , , , , , ,1, , , ,2").unwrap();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None,
                &SolveLimits::default().with_max_unwinds(0))
            .unwrap();

        assert_eq!(0, n_solutions);
    }

    #[test]
    fn full_grid_yields_zero() {
        let mut grid =
            SudokuGrid::parse("2x2;1,2,3,4,3,4,1,2,2,1,4,3,4,3,2,1").unwrap();
        let mut strategy = LeastCandidatesHybrid::new();
        let mut solver = Solver::new();
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, None, &SolveLimits::default())
            .unwrap();

        assert_eq!(0, n_solutions);
    }

    #[test]
    fn composition_produces_unique_puzzle() {
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mut strategy = MostEliminating::new(Mask::all(2, 2).unwrap());
        let mut verifier = LeastCandidatesHybrid::new();
        let mut puzzle = None;
        let mut callback = |solved: &SudokuGrid| {
            puzzle = Some(solved.clone());
        };
        let mut solver = Solver::new();
        let compose = Compose::new(&mut verifier, 4, &mut callback);
        let n_solutions = solver
            .solve(&mut grid, &mut strategy, Some(compose),
                &SolveLimits::default().with_max_solutions(1))
            .unwrap();

        assert_eq!(1, n_solutions);

        let puzzle = puzzle.expect("completion callback did not run");
        assert!(puzzle.is_valid());
        assert!(!puzzle.is_empty());

        // The composed puzzle has exactly one completion.
        let mut copy = puzzle.clone();
        let mut check = LeastCandidatesHybrid::new();
        let n_completions = Solver::new()
            .solve(&mut copy, &mut check, None,
                &SolveLimits::default().with_max_solutions(2))
            .unwrap();
        assert_eq!(1, n_completions);
    }

    #[test]
    fn composition_is_deterministic() {
        let compose_once = || {
            let mut grid = SudokuGrid::new(2, 2).unwrap();
            let mut strategy = MostEliminating::new(Mask::all(2, 2).unwrap());
            let mut verifier = LeastCandidatesHybrid::new();
            let mut puzzle = None;
            let mut callback = |solved: &SudokuGrid| {
                puzzle = Some(solved.clone());
            };
            let compose = Compose::new(&mut verifier, 4, &mut callback);
            Solver::new()
                .solve(&mut grid, &mut strategy, Some(compose),
                    &SolveLimits::default().with_max_solutions(1))
                .unwrap();
            puzzle
        };

        assert_eq!(compose_once(), compose_once());
    }

    /// A deliberately broken strategy that proposes the top-left cell with
    /// value 1 regardless of what its state has eliminated.
    struct TopLeftOneStrategy {
        state: CellState,
        thread_len: usize
    }

    impl TopLeftOneStrategy {
        fn new() -> TopLeftOneStrategy {
            TopLeftOneStrategy {
                state: CellState::new(),
                thread_len: 0
            }
        }
    }

    impl Strategy for TopLeftOneStrategy {
        fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool> {
            self.state.setup(grid.block_width(), grid.block_height());
            self.thread_len = 0;

            for row in 0..grid.size() {
                for column in 0..grid.size() {
                    if let Some(value) = grid.get_cell(row, column).unwrap() {
                        self.state.add_move(row, column, value)?;
                    }
                }
            }

            Ok(true)
        }

        fn find_candidates(&mut self, _grid: &SudokuGrid) -> usize {
            1
        }

        fn select_candidate(&mut self) -> Move {
            Move { row: 0, column: 0, value: 1 }
        }

        fn score(&self) -> usize {
            1
        }

        fn update_state(&mut self, mv: Move, _write_state: bool)
                -> SudokuResult<()> {
            self.thread_len += 1;
            self.state.add_move(mv.row, mv.column, mv.value)
        }

        fn unwind(&mut self, _grid: &mut SudokuGrid,
                _new_len: Option<usize>, _reset: bool) -> bool {
            false
        }

        fn reset(&mut self, _grid: &mut SudokuGrid) { }

        fn thread_len(&self) -> usize {
            self.thread_len
        }

        fn last_written_move(&self) -> Option<usize> {
            None
        }
    }

    #[test]
    fn committing_eliminated_candidate_is_an_error() {
        // The broken strategy insists on (0, 0) := 1 although the clue in
        // the top row has eliminated it.
        let mut grid =
            SudokuGrid::parse("2x2; , , ,1, , , , , , , , , , , ,").unwrap();
        let mut strategy = TopLeftOneStrategy::new();
        let mut solver = Solver::new();
        let result = solver.solve(&mut grid, &mut strategy, None,
            &SolveLimits::default());

        assert_eq!(
            Err(SudokuError::CandidateAlreadyEliminated {
                row: 0,
                column: 0,
                value: 1
            }),
            result);
    }
}
