//! Solver contract invariants and the concrete solving scenarios.

mod common;

use common::{assert_path_valid, generated, seeded};
use warren_core::{
    solve, CancelToken, Cell, GenAlgorithm, GenOptions, Grid, NullSink, SolveAlgorithm,
};

fn solve_fresh(grid: &mut Grid, algo: SolveAlgorithm) -> warren_core::SolveOutcome {
    solve(grid, algo, &CancelToken::new(), &mut NullSink).expect("solver error")
}

/// Every solver finds a structurally valid path on perfect mazes from
/// every generator, and the optimal ones match the BFS length.
#[test]
fn all_solvers_succeed_on_perfect_mazes() {
    for gen in GenAlgorithm::ALL {
        let mut grid = generated(20, 20, gen, seeded(77));
        let start = grid.start();
        let exit = grid.exit();
        let cells = grid.len();

        let shortest = solve_fresh(&mut grid, SolveAlgorithm::Bfs).path.len();

        for algo in SolveAlgorithm::ALL {
            let outcome = solve_fresh(&mut grid, algo);
            assert!(outcome.found, "{algo} failed on a {gen} maze");
            assert_path_valid(&grid, &outcome.path, start, exit);
            assert!(outcome.visited_count <= cells, "{algo} overcounted visits");

            if algo.claims_optimality() {
                assert_eq!(
                    outcome.path.len(),
                    shortest,
                    "{algo} path is not shortest on a {gen} maze"
                );
            } else {
                assert!(outcome.path.len() >= shortest);
            }
        }
    }
}

/// Optimal solvers stay optimal on braided mazes (dead-end filler is
/// exempt: it only guarantees shortest paths on perfect mazes).
#[test]
fn optimal_solvers_agree_on_braided_mazes() {
    let opts = GenOptions {
        seed: 3,
        braid: 0.5,
        ..GenOptions::default()
    };
    let mut grid = generated(24, 24, GenAlgorithm::Prim, opts);
    let start = grid.start();
    let exit = grid.exit();

    let shortest = solve_fresh(&mut grid, SolveAlgorithm::Bfs).path.len();
    for algo in [
        SolveAlgorithm::Dijkstra,
        SolveAlgorithm::Astar,
        SolveAlgorithm::Swarm,
    ] {
        let outcome = solve_fresh(&mut grid, algo);
        assert!(outcome.found);
        assert_path_valid(&grid, &outcome.path, start, exit);
        assert_eq!(outcome.path.len(), shortest, "{algo} lost optimality");
    }

    // Bidirectional A* stops at the first expansion-time meeting. On a
    // tree that meeting provably lies on the unique path; with cycles the
    // guarantee weakens to a valid path, so equality is not pinned here.
    let outcome = solve_fresh(&mut grid, SolveAlgorithm::BiAstar);
    assert!(outcome.found);
    assert_path_valid(&grid, &outcome.path, start, exit);
    assert!(outcome.path.len() >= shortest);
}

/// Solver marks land in the grid: path cells carry ON_PATH, expanded
/// cells carry VISITED_SOLVE, and a re-solve starts clean.
#[test]
fn solver_flags_reflect_the_traversal() {
    let mut grid = generated(16, 16, GenAlgorithm::Dfs, seeded(21));

    let outcome = solve_fresh(&mut grid, SolveAlgorithm::Bfs);
    for &(x, y) in &outcome.path {
        assert!(grid.cell(x, y).on_path());
        assert!(grid.cell(x, y).visited_solve());
    }

    let mut marked = 0u64;
    for y in 0..16 {
        for x in 0..16 {
            if grid.cell(x, y).visited_solve() {
                marked += 1;
            }
        }
    }
    assert_eq!(marked, outcome.visited_count);

    // The dispatch resets flags before each run.
    let again = solve_fresh(&mut grid, SolveAlgorithm::DfsSolve);
    for y in 0..16u32 {
        for x in 0..16u32 {
            let bits = grid.cell(x, y).bits();
            if bits & Cell::ON_PATH != 0 {
                assert!(
                    again.path.contains(&(x, y)),
                    "stale ON_PATH at ({x}, {y}) after re-solve"
                );
            }
        }
    }
}

/// Scenario 4: BFS vs A* on a perfect 50x50 maze at seed 123.
#[test]
fn scenario_bfs_vs_astar_50x50() {
    let mut grid = generated(50, 50, GenAlgorithm::Dfs, seeded(123));
    let cells = grid.len();

    let by_bfs = solve_fresh(&mut grid, SolveAlgorithm::Bfs);
    let by_astar = solve_fresh(&mut grid, SolveAlgorithm::Astar);

    assert_eq!(by_bfs.path.len(), by_astar.path.len());
    for outcome in [&by_bfs, &by_astar] {
        assert!(outcome.visited_count >= outcome.path.len() as u64);
        assert!(outcome.visited_count <= cells);
    }
    assert!(by_astar.visited_count <= by_bfs.visited_count);
}

/// Scenario 5: left wall follower on a perfect 10x10 maze at seed 9.
#[test]
fn scenario_left_follower_10x10() {
    let mut grid = generated(10, 10, GenAlgorithm::Dfs, seeded(9));
    let shortest = solve_fresh(&mut grid, SolveAlgorithm::Bfs).path.len();

    let outcome = solve_fresh(&mut grid, SolveAlgorithm::Left);
    assert!(outcome.found);
    assert!(outcome.path.len() >= shortest);
    assert!(outcome.visited_count <= 400);
}

/// Trémaux succeeds on braided mazes too, where wall followers may not.
#[test]
fn tremaux_handles_full_braids() {
    let opts = GenOptions {
        seed: 11,
        braid: 1.0,
        ..GenOptions::default()
    };
    let mut grid = generated(20, 20, GenAlgorithm::Dfs, opts);
    let start = grid.start();
    let exit = grid.exit();

    let outcome = solve_fresh(&mut grid, SolveAlgorithm::Tremaux);
    assert!(outcome.found);
    assert_path_valid(&grid, &outcome.path, start, exit);
}

/// An unreachable exit is algorithm failure — data, not an error.
#[test]
fn unreachable_exit_is_reported_not_raised() {
    let mut grid = Grid::new(8, 8).unwrap();
    grid.fill_walls();

    for algo in SolveAlgorithm::ALL {
        let outcome = solve_fresh(&mut grid, algo);
        assert!(!outcome.found, "{algo} claimed success in a sealed grid");
        assert!(outcome.path.is_empty(), "{algo} returned a path on failure");
    }
}

/// Solver output is deterministic: same maze, same result.
#[test]
fn solver_output_is_deterministic() {
    let grid = generated(24, 24, GenAlgorithm::Organic, seeded(8));
    for algo in SolveAlgorithm::ALL {
        let mut a = grid.clone();
        let mut b = grid.clone();
        let one = solve_fresh(&mut a, algo);
        let two = solve_fresh(&mut b, algo);
        assert_eq!(one.path, two.path, "{algo} path diverged between runs");
        assert_eq!(one.visited_count, two.visited_count);
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}

/// Cancellation aborts solvers with the dedicated error.
#[test]
fn cancelled_solve_reports_cancelled() {
    use warren_core::EngineError;

    let grid = generated(16, 16, GenAlgorithm::Dfs, seeded(2));
    for algo in SolveAlgorithm::ALL {
        let mut work = grid.clone();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = solve(&mut work, algo, &cancel, &mut NullSink);
        assert!(
            matches!(result, Err(EngineError::Cancelled)),
            "{algo} ignored cancellation"
        );
    }
}
