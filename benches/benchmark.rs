use criterion::{criterion_group, criterion_main, Criterion};

use sudoku_compose::{Mask, SudokuGrid};
use sudoku_compose::composer::Composer;
use sudoku_compose::solver::{SolveLimits, Solver};
use sudoku_compose::solver::strategy::{
    LeastCandidatesCell,
    LeastCandidatesHybrid,
    LeastCandidatesSector,
    Strategy
};

// Taken from the World Puzzle Federation Sudoku GP 2020 Round 8, Puzzle 2.
const CLASSIC_PUZZLE: &str = "3x3;\
     , , , ,8,1, , , ,\
     , ,2, , ,7,8, , ,\
     ,5,3, , , ,1,7, ,\
    3,7, , , , , , , ,\
    6, , , , , , , ,3,\
     , , , , , , ,2,4,\
     ,6,9, , , ,2,3, ,\
     , ,5,9, , ,4, , ,\
     , , ,6,5, , , , ";

fn solve_classic(strategy: &mut dyn Strategy) {
    let mut grid = SudokuGrid::parse(CLASSIC_PUZZLE).unwrap();
    let mut solver = Solver::new();
    let limits = SolveLimits::default().with_max_solutions(1);
    let n_solutions =
        solver.solve(&mut grid, strategy, None, &limits).unwrap();
    assert_eq!(1, n_solutions);
}

fn benchmark_solving(c: &mut Criterion) {
    let mut group = c.benchmark_group("solving");

    group.bench_function("least candidates cell", |b| b.iter(|| {
        let mut strategy = LeastCandidatesCell::new();
        solve_classic(&mut strategy)
    }));
    group.bench_function("least candidates sector", |b| b.iter(|| {
        let mut strategy = LeastCandidatesSector::new();
        solve_classic(&mut strategy)
    }));
    group.bench_function("least candidates hybrid", |b| b.iter(|| {
        let mut strategy = LeastCandidatesHybrid::new();
        solve_classic(&mut strategy)
    }));
}

fn benchmark_counting(c: &mut Criterion) {
    let mut group = c.benchmark_group("counting");

    group.bench_function("two solutions", |b| b.iter(|| {
        let mut grid =
            SudokuGrid::parse("2x2;1, , ,4, , ,1, , ,1, , ,4, , ,1").unwrap();
        let mut strategy = LeastCandidatesHybrid::new();
        let n_solutions = Solver::new()
            .solve(&mut grid, &mut strategy, None, &SolveLimits::default())
            .unwrap();
        assert_eq!(2, n_solutions);
    }));
}

fn benchmark_composing(c: &mut Criterion) {
    let mut group = c.benchmark_group("composing");

    group.bench_function("full mask 4x4", |b| b.iter(|| {
        let mask = Mask::all(2, 2).unwrap();
        let mut composer = Composer::new();
        composer.compose(&mask, 8).unwrap()
    }));
}

criterion_group!(all,
    benchmark_solving,
    benchmark_counting,
    benchmark_composing
);

criterion_main!(all);
