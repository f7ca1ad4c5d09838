//! Contains the composition strategy. See [MostEliminating] for more
//! details.

use crate::{Mask, SudokuGrid};
use crate::error::SudokuResult;
use crate::solver::strategy::{Move, Strategy, StrategyBase};
use crate::state::{ConstraintState, ImpactState};

use rand::RngCore;

/// A strategy that picks, among the empty cells covered by a [Mask], the
/// move that would eliminate the most remaining live candidates, as scored
/// by an [ImpactState]. This is the opposite of the least-candidates
/// heuristics: instead of following the most constrained part of the grid,
/// it creates constraint, which biases puzzle composition toward hard,
/// maximally constraining clue placements.
///
/// The strategy is only meant to drive the composition search; a
/// uniqueness verifier supplied alongside it decides when the placed clues
/// pin down a single solution. Unlike the solving strategies, it writes a
/// state snapshot on every move, since composition backtracking must never
/// lose the ability to reconsider a clue placement, and it reports the
/// search as exhausted once its thread is down to a single move: the first
/// placed value is fixed without loss of generality.
pub struct MostEliminating {
    base: StrategyBase,
    state: ImpactState,
    mask: Mask
}

impl MostEliminating {

    /// Creates a deterministic instance that composes within the given
    /// mask.
    pub fn new(mask: Mask) -> MostEliminating {
        MostEliminating {
            base: StrategyBase::new(None),
            state: ImpactState::new(),
            mask
        }
    }

    /// Creates an instance that composes within the given mask and uses
    /// the given random number generator when picking among tied moves.
    pub fn with_rng(mask: Mask, rng: impl RngCore + 'static)
            -> MostEliminating {
        MostEliminating {
            base: StrategyBase::new(Some(Box::new(rng))),
            state: ImpactState::new(),
            mask
        }
    }

    /// Gets the mask restricting which cells this strategy may fill.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }
}

impl Strategy for MostEliminating {

    fn setup(&mut self, grid: &SudokuGrid) -> SudokuResult<bool> {
        self.base.setup(grid);
        self.state.setup(grid.block_width(), grid.block_height());
        self.base.replay_clues(&mut self.state, grid)
    }

    fn find_candidates(&mut self, grid: &SudokuGrid) -> usize {
        let size = self.base.size();
        self.base.clear_candidates();
        let mut min_invulnerability: Option<usize> = None;

        for row in 0..size {
            for column in 0..size {
                if grid.value(row, column) > 0
                        || !self.mask.is_selectable(row, column) {
                    continue;
                }

                for value in 1..=size {
                    if self.state.is_eliminated(row, column, value) {
                        continue;
                    }

                    let score = self.state.invulnerability(row, column,
                        value);

                    if min_invulnerability.map_or(true, |min| score < min) {
                        min_invulnerability = Some(score);
                    }
                }
            }
        }

        let min_invulnerability = match min_invulnerability {
            Some(min) => min,
            None => {
                self.base.set_score(0);
                return 0;
            }
        };

        self.base.set_score(self.state.ceiling() - min_invulnerability);

        for row in 0..size {
            for column in 0..size {
                if grid.value(row, column) > 0
                        || !self.mask.is_selectable(row, column) {
                    continue;
                }

                for value in 1..=size {
                    if self.state.is_eliminated(row, column, value)
                            || self.state.invulnerability(row, column, value)
                                != min_invulnerability {
                        continue;
                    }

                    let count = self.base.push_candidate(Move {
                        row,
                        column,
                        value
                    });

                    if self.base.randomizes() {
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

    fn update_state(&mut self, mv: Move, _write_state: bool)
            -> SudokuResult<()> {
        // Composition snapshots on every move so that any clue placement
        // can be reconsidered.
        self.base.update_state(&mut self.state, mv, true)
    }

    fn unwind(&mut self, grid: &mut SudokuGrid, new_len: Option<usize>,
            reset: bool) -> bool {
        self.base.unwind(&mut self.state, grid, new_len, reset);
        new_len.map_or(false, |len| len >= 1)
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

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn candidates_are_restricted_to_the_mask() {
        let grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::from_cells(2, 2, vec![(1, 2)]).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        // On the empty grid, every value of the masked cell ties at an
        // invulnerability of zero.
        assert_eq!(4, strategy.find_candidates(&grid));
        let mv = strategy.select_candidate();
        assert_eq!(1, mv.row);
        assert_eq!(2, mv.column);
    }

    #[test]
    fn filled_cells_are_not_selected() {
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::from_cells(2, 2, vec![(0, 0), (0, 1)]).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        assert!(strategy.find_candidates(&grid) > 0);
        let mv = strategy.select_candidate();
        assert_eq!((0, 0), (mv.row, mv.column));
        grid.set_cell(mv.row, mv.column, mv.value).unwrap();
        strategy.update_state(mv, false).unwrap();

        assert!(strategy.find_candidates(&grid) > 0);
        let mv = strategy.select_candidate();
        assert_eq!((0, 1), (mv.row, mv.column));
    }

    #[test]
    fn exhausted_mask_yields_no_candidates() {
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::from_cells(2, 2, vec![(3, 3)]).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        assert!(strategy.find_candidates(&grid) > 0);
        let mv = strategy.select_candidate();
        grid.set_cell(mv.row, mv.column, mv.value).unwrap();
        strategy.update_state(mv, false).unwrap();

        assert_eq!(0, strategy.find_candidates(&grid));
    }

    #[test]
    fn state_is_snapshot_on_every_move() {
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::all(2, 2).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        for _ in 0..3 {
            assert!(strategy.find_candidates(&grid) > 0);
            let mv = strategy.select_candidate();
            grid.set_cell(mv.row, mv.column, mv.value).unwrap();

            // The caller asks for no snapshot; one is taken regardless.
            strategy.update_state(mv, false).unwrap();
        }

        assert_eq!(Some(2), strategy.last_written_move());
    }

    #[test]
    fn unwind_never_reopens_the_first_move() {
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::all(2, 2).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        for _ in 0..2 {
            assert!(strategy.find_candidates(&grid) > 0);
            let mv = strategy.select_candidate();
            grid.set_cell(mv.row, mv.column, mv.value).unwrap();
            strategy.update_state(mv, false).unwrap();
        }

        assert!(strategy.unwind(&mut grid, Some(1), true));
        assert_eq!(1, strategy.thread_len());
        assert!(!strategy.unwind(&mut grid, Some(0), true));
        assert!(grid.is_empty());
    }

    #[test]
    fn prefers_the_most_constraining_move() {
        // After 1 is placed in the top-left corner, a 1 elsewhere loses
        // candidates it would otherwise have eliminated, so a fresh value
        // in a fresh area outscores it.
        let mut grid = SudokuGrid::new(2, 2).unwrap();
        let mask = Mask::all(2, 2).unwrap();
        let mut strategy = MostEliminating::new(mask);
        assert!(strategy.setup(&grid).unwrap());

        assert!(strategy.find_candidates(&grid) > 0);
        let mv = strategy.select_candidate();
        assert_eq!(Move { row: 0, column: 0, value: 1 }, mv);
        grid.set_cell(mv.row, mv.column, mv.value).unwrap();
        strategy.update_state(mv, false).unwrap();

        assert!(strategy.find_candidates(&grid) > 0);
        let second = strategy.select_candidate();

        // Candidates that share a sector with the first move, or place the
        // same value within its reach, are no longer fully vulnerable.
        assert_ne!(0, strategy.state.invulnerability(0, 1, 2));
        assert_eq!(0, strategy.state.invulnerability(second.row,
            second.column, second.value));
    }
}
