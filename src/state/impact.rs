//! Contains the impact-oriented constraint state. See [ImpactState] for
//! more details.

use crate::error::{SudokuError, SudokuResult};
use crate::index;
use crate::state::ConstraintState;
use crate::util::USizeSet;

/// A constraint state that scores every (cell, value) pair by its
/// invulnerability: the number of moves in the pair's domain (the same
/// value on a cell sharing a row, column, or block) that have already
/// been eliminated. A freshly set up grid scores 0 everywhere; the fewer
/// domain members are left alive, the higher the score climbs.
///
/// Committing a move with a *low* invulnerability score therefore
/// eliminates many of the still-live candidates at once, which is what the
/// composition strategy is after when it places clues: maximally
/// constraining moves make the puzzle unique with few clues. Once a move is
/// committed, the placing cell's own scores are reset to the sentinel
/// [ImpactState::ceiling], one more than the largest reachable score, since
/// a filled cell has no candidates left to protect.
#[derive(Clone, Debug)]
pub struct ImpactState {
    block_width: usize,
    block_height: usize,
    size: usize,
    eliminated: Vec<USizeSet>,
    invulnerability: Vec<usize>,
    snapshot_eliminated: Vec<Vec<USizeSet>>,
    snapshot_invulnerability: Vec<Vec<usize>>
}

impl ImpactState {

    /// Creates a state for an empty grid. [ConstraintState::setup] must be
    /// called before any other operation.
    pub fn new() -> ImpactState {
        ImpactState {
            block_width: 0,
            block_height: 0,
            size: 0,
            eliminated: Vec::new(),
            invulnerability: Vec::new(),
            snapshot_eliminated: Vec::new(),
            snapshot_invulnerability: Vec::new()
        }
    }

    /// The sentinel score assigned to the moves of a filled cell. It equals
    /// the number of moves in any move's domain plus one, so it is strictly
    /// greater than every reachable invulnerability score.
    pub fn ceiling(&self) -> usize {
        2 * self.size + self.block_width * self.block_height
            - self.block_width - self.block_height
    }

    /// Indicates whether the move `(row, column) := value` has been
    /// eliminated.
    pub fn is_eliminated(&self, row: usize, column: usize, value: usize)
            -> bool {
        self.eliminated[index(row, column, self.size)].contains(value)
    }

    /// Returns the invulnerability score of the move
    /// `(row, column) := value`, that is, the number of moves in its domain
    /// that have already been eliminated.
    pub fn invulnerability(&self, row: usize, column: usize, value: usize)
            -> usize {
        self.invulnerability[
            index(row, column, self.size) * self.size + value - 1]
    }

    fn eliminate(&mut self, row: usize, column: usize, value: usize) {
        let index = index(row, column, self.size);
        self.eliminated[index].insert(value).unwrap();
    }

    fn set_invulnerability(&mut self, row: usize, column: usize,
            value: usize, score: usize) {
        let index = index(row, column, self.size) * self.size + value - 1;
        self.invulnerability[index] = score;
    }

    fn raise_invulnerability(&mut self, row: usize, column: usize,
            value: usize) {
        let index = index(row, column, self.size) * self.size + value - 1;
        self.invulnerability[index] += 1;
    }

    fn in_domain(&self, row: usize, column: usize, other_row: usize,
            other_column: usize) -> bool {
        row == other_row
            || column == other_column
            || (row / self.block_height == other_row / self.block_height
                && column / self.block_width
                    == other_column / self.block_width)
    }
}

impl Default for ImpactState {
    fn default() -> ImpactState {
        ImpactState::new()
    }
}

impl ConstraintState for ImpactState {

    fn setup(&mut self, block_width: usize, block_height: usize) {
        self.block_width = block_width;
        self.block_height = block_height;

        if self.size != block_width * block_height {
            self.size = block_width * block_height;
            let cells = self.size * self.size;
            let empty = USizeSet::new(1, self.size).unwrap();
            self.eliminated = vec![empty; cells];
            self.invulnerability = vec![0; cells * self.size];
            self.snapshot_eliminated = vec![self.eliminated.clone(); cells];
            self.snapshot_invulnerability =
                vec![self.invulnerability.clone(); cells];
        }
        else {
            for set in self.eliminated.iter_mut() {
                set.clear();
            }

            for score in self.invulnerability.iter_mut() {
                *score = 0;
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
        let ceiling = self.ceiling();

        // The placing cell has no candidates left to protect.
        for v in 1..=size {
            self.set_invulnerability(row, column, v, ceiling);
        }

        // Every live candidate of the placing cell dies with this move, so
        // the live domain members of each of them lose one protector. The
        // candidates for the placed value on peer cells die themselves.
        for v in 1..=size {
            if self.is_eliminated(row, column, v) {
                continue;
            }

            for i in 0..size {
                if i != row && !self.is_eliminated(i, column, v) {
                    if v == value {
                        self.set_invulnerability(i, column, v, ceiling);
                    }
                    else {
                        self.raise_invulnerability(i, column, v);
                    }
                }

                if i != column && !self.is_eliminated(row, i, v) {
                    if v == value {
                        self.set_invulnerability(row, i, v, ceiling);
                    }
                    else {
                        self.raise_invulnerability(row, i, v);
                    }
                }
            }

            let block_row = row / self.block_height * self.block_height;
            let block_column = column / self.block_width * self.block_width;

            for i in block_row..(block_row + self.block_height) {
                for j in block_column..(block_column + self.block_width) {
                    if i == row || j == column
                            || self.is_eliminated(i, j, v) {
                        continue;
                    }

                    if v == value {
                        self.set_invulnerability(i, j, v, ceiling);
                    }
                    else {
                        self.raise_invulnerability(i, j, v);
                    }
                }
            }
        }

        // The placed value dying on the peers also weakens candidates that
        // share a sector with a peer but not with the placing cell itself.
        for i in 0..size {
            for j in 0..size {
                if self.is_eliminated(i, j, value)
                        || !self.in_domain(row, column, i, j) {
                    continue;
                }

                for other_row in 0..size {
                    for other_column in 0..size {
                        if !self.is_eliminated(other_row, other_column, value)
                                && !self.in_domain(row, column, other_row,
                                    other_column)
                                && self.in_domain(other_row, other_column,
                                    i, j) {
                            self.raise_invulnerability(other_row,
                                other_column, value);
                        }
                    }
                }
            }
        }

        // Record the eliminations themselves.
        for v in 1..=size {
            if v != value {
                self.eliminate(row, column, v);
            }
        }

        for i in 0..size {
            if i != column && !self.is_eliminated(row, i, value) {
                self.eliminate(row, i, value);
            }

            if i != row && !self.is_eliminated(i, column, value) {
                self.eliminate(i, column, value);
            }
        }

        let block_row = row / self.block_height * self.block_height;
        let block_column = column / self.block_width * self.block_width;

        for i in block_row..(block_row + self.block_height) {
            for j in block_column..(block_column + self.block_width) {
                if i != row && j != column
                        && !self.is_eliminated(i, j, value) {
                    self.eliminate(i, j, value);
                }
            }
        }

        Ok(())
    }

    fn eliminate_move(&mut self, row: usize, column: usize, value: usize) {
        let size = self.size;
        let ceiling = self.ceiling();

        for i in 0..size {
            for j in 0..size {
                if i == row && j == column {
                    self.eliminate(row, column, value);
                    self.set_invulnerability(row, column, value, ceiling);
                }
                else if !self.is_eliminated(i, j, value)
                        && self.in_domain(row, column, i, j) {
                    self.raise_invulnerability(i, j, value);
                }
            }
        }
    }

    fn push_state(&mut self, position: usize) {
        self.snapshot_eliminated[position].clone_from(&self.eliminated);
        self.snapshot_invulnerability[position]
            .clone_from(&self.invulnerability);
    }

    fn pop_state(&mut self, position: usize) {
        self.eliminated.clone_from(&self.snapshot_eliminated[position]);
        self.invulnerability
            .clone_from(&self.snapshot_invulnerability[position]);
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn setup_2x2() -> ImpactState {
        let mut state = ImpactState::new();
        state.setup(2, 2);
        state
    }

    #[test]
    fn ceiling_matches_domain_size() {
        let state = setup_2x2();

        // 3 row peers + 3 column peers + 1 block-only peer = 7 cells that
        // can carry the same value; the sentinel is one more.
        assert_eq!(8 + 4 - 2 - 2, state.ceiling());
        assert_eq!(8, state.ceiling());

        let mut state = ImpactState::new();
        state.setup(3, 3);
        assert_eq!(18 + 9 - 3 - 3, state.ceiling());
    }

    #[test]
    fn fresh_state_is_fully_vulnerable() {
        let state = setup_2x2();

        for row in 0..4 {
            for column in 0..4 {
                for value in 1..=4 {
                    assert_eq!(0,
                        state.invulnerability(row, column, value));
                }
            }
        }
    }

    #[test]
    fn add_move_maxes_out_placing_cell() {
        let mut state = setup_2x2();
        state.add_move(1, 2, 3).unwrap();

        for value in 1..=4 {
            assert_eq!(state.ceiling(),
                state.invulnerability(1, 2, value));
        }
    }

    #[test]
    fn add_move_maxes_out_peer_candidates_for_value() {
        let mut state = setup_2x2();
        state.add_move(1, 2, 3).unwrap();

        assert_eq!(state.ceiling(), state.invulnerability(1, 0, 3));
        assert_eq!(state.ceiling(), state.invulnerability(3, 2, 3));
        assert_eq!(state.ceiling(), state.invulnerability(0, 3, 3));
    }

    #[test]
    fn add_move_raises_scores_of_surviving_peers() {
        let mut state = setup_2x2();
        state.add_move(1, 2, 3).unwrap();

        // (1, 0) keeps its candidates for other values, but lost the
        // placing cell from each of their domains.
        assert!(state.invulnerability(1, 0, 1) >= 1);
        assert!(!state.is_eliminated(1, 0, 1));

        // A candidate for 3 with no sector shared with the move can only
        // have been touched by the second-order update.
        assert!(!state.is_eliminated(3, 0, 3));
        assert!(state.invulnerability(3, 0, 3) >= 1);
    }

    #[test]
    fn add_move_records_eliminations() {
        let mut state = setup_2x2();
        state.add_move(1, 2, 3).unwrap();

        assert!(state.is_eliminated(1, 2, 1));
        assert!(!state.is_eliminated(1, 2, 3));
        assert!(state.is_eliminated(1, 3, 3));
        assert!(state.is_eliminated(0, 2, 3));
        assert!(state.is_eliminated(0, 3, 3));
        assert!(!state.is_eliminated(3, 0, 3));
    }

    #[test]
    fn add_eliminated_move_is_a_fault() {
        let mut state = setup_2x2();
        state.add_move(1, 2, 3).unwrap();

        assert_eq!(
            Err(SudokuError::CandidateAlreadyEliminated {
                row: 1,
                column: 2,
                value: 4
            }),
            state.add_move(1, 2, 4));
    }

    #[test]
    fn eliminate_move_raises_live_domain_scores() {
        let mut state = setup_2x2();
        state.eliminate_move(0, 0, 2);

        assert!(state.is_eliminated(0, 0, 2));
        assert_eq!(state.ceiling(), state.invulnerability(0, 0, 2));

        // Domain members of the pruned candidate lost one protector.
        assert_eq!(1, state.invulnerability(0, 3, 2));
        assert_eq!(1, state.invulnerability(3, 0, 2));
        assert_eq!(1, state.invulnerability(1, 1, 2));

        // Unrelated pairs are untouched.
        assert_eq!(0, state.invulnerability(3, 3, 2));
        assert_eq!(0, state.invulnerability(0, 3, 1));
    }

    #[test]
    fn snapshot_round_trip_is_identity() {
        let mut state = setup_2x2();
        state.add_move(0, 0, 1).unwrap();
        state.push_state(0);
        let eliminated = state.eliminated.clone();
        let invulnerability = state.invulnerability.clone();
        state.pop_state(0);

        assert_eq!(eliminated, state.eliminated);
        assert_eq!(invulnerability, state.invulnerability);
    }

    #[test]
    fn pop_state_restores_earlier_position() {
        let mut state = setup_2x2();
        state.add_move(0, 0, 1).unwrap();
        state.push_state(0);
        let eliminated = state.eliminated.clone();
        let invulnerability = state.invulnerability.clone();

        state.add_move(1, 2, 3).unwrap();
        state.pop_state(0);

        assert_eq!(eliminated, state.eliminated);
        assert_eq!(invulnerability, state.invulnerability);
    }
}
