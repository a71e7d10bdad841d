//! Swarm solver ("swarm").
//!
//! A level-synchronous BFS whose frontier is partitioned into worker
//! lanes each level. Lanes scan their share of the frontier in parallel
//! against the level-start grid; the discovered candidates are then
//! unioned sequentially in lane order, which assigns parents
//! deterministically and dedupes cells reached by several lanes at once.
//! Because levels are processed strictly in order, the first level that
//! reaches the exit yields a shortest path, same as plain BFS — the
//! swarm only changes who does the scanning.

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::EventSink;
use crate::grid::{Dir, Grid};
use crate::solver::{mark_visited, ParentMap, SolveOutcome};

/// Number of frontier lanes per level.
const LANES: usize = 8;

/// Runs the swarm search between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let mut parents = ParentMap::new(grid);

    mark_visited(grid, start.0, start.1, sink);
    let mut visited_count = 1u64;
    let mut frontier: Vec<(u32, u32)> = vec![start];
    let mut found = start == exit;

    while !found && !frontier.is_empty() {
        cancel.check()?;

        // Parallel scan: each lane reads the level-start grid only.
        let lane_size = frontier.len().div_ceil(LANES);
        let view: &Grid = grid;
        let lanes: Vec<Vec<(u32, u32, Dir)>> = frontier
            .par_chunks(lane_size)
            .map(|lane| {
                let mut discovered = Vec::new();
                for &(x, y) in lane {
                    for (nx, ny, dir) in view.open_neighbors(x, y) {
                        if !view.cell(nx, ny).visited_solve() {
                            discovered.push((nx, ny, dir));
                        }
                    }
                }
                discovered
            })
            .collect();

        // Sequential union in lane order: the first lane to report a cell
        // becomes its parent, later reports are duplicates.
        let mut next = Vec::new();
        for lane in lanes {
            for (nx, ny, dir) in lane {
                if grid.cell(nx, ny).visited_solve() {
                    continue;
                }
                mark_visited(grid, nx, ny, sink);
                visited_count += 1;
                parents.set(nx, ny, dir.opposite());
                if (nx, ny) == exit {
                    found = true;
                }
                next.push((nx, ny));
            }
        }
        frontier = next;
    }

    if !found {
        return Ok(SolveOutcome::failure(visited_count));
    }
    let path = parents.reconstruct(grid, start, exit, sink)?;
    Ok(SolveOutcome {
        found: true,
        path,
        visited_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::generator::{backtracker, organic};
    use crate::rng;
    use crate::solver::bfs;

    #[test]
    fn matches_bfs_length() {
        let cancel = CancelToken::new();
        let mut grid = Grid::new(24, 24).unwrap();
        backtracker::carve(&mut grid, &mut rng::seeded(17), &cancel, &mut NullSink).unwrap();
        let exit = grid.exit();

        let by_bfs = bfs::solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_swarm = solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();

        assert!(by_swarm.found);
        assert_eq!(by_bfs.path.len(), by_swarm.path.len());
    }

    #[test]
    fn deterministic_across_runs() {
        let cancel = CancelToken::new();
        let mut grid = Grid::new(32, 32).unwrap();
        organic::carve(&mut grid, 4, Some(16), &cancel, &mut NullSink).unwrap();
        let mut other = grid.clone();
        let exit = grid.exit();

        let one = solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        let two = solve(&mut other, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        assert_eq!(one.path, two.path);
        assert_eq!(one.visited_count, two.visited_count);
        assert_eq!(grid.as_bytes(), other.as_bytes());
    }

    #[test]
    fn unreachable_exit_reports_failure() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.fill_walls();
        let outcome = solve(&mut grid, (0, 0), (3, 3), &CancelToken::new(), &mut NullSink).unwrap();
        assert!(!outcome.found);
        assert!(outcome.path.is_empty());
    }
}
