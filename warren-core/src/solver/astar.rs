//! A* and Dijkstra.
//!
//! One search over two heuristics: Manhattan distance for A*, zero for
//! Dijkstra (uniform edge costs make Dijkstra "weighted BFS"). The heap
//! key is `(f, h, insertion)`, which pins the expansion order exactly:
//! lowest f first, ties to the lower heuristic, remaining ties to
//! insertion order. With the zero heuristic that degenerates to
//! `(g, insertion)` — lowest cost, ties by insertion — so both documented
//! tie-break rules fall out of the same key.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::EventSink;
use crate::grid::Grid;
use crate::solver::{manhattan, mark_visited, ParentMap, SolveOutcome};

#[derive(Clone, Copy)]
enum Heuristic {
    Manhattan,
    Zero,
}

impl Heuristic {
    #[inline]
    fn estimate(self, from: (u32, u32), to: (u32, u32)) -> u32 {
        match self {
            Heuristic::Manhattan => manhattan(from, to),
            Heuristic::Zero => 0,
        }
    }
}

/// Heap entry: `(f, h, insertion, x, y)` under `Reverse` for a min-heap.
type Entry = Reverse<(u32, u32, u64, u32, u32)>;

/// A* with the Manhattan heuristic. Optimal: the heuristic is admissible
/// and consistent on a uniform grid.
pub fn solve_astar(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    search(grid, start, exit, Heuristic::Manhattan, cancel, sink)
}

/// Dijkstra over uniform costs.
pub fn solve_dijkstra(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    search(grid, start, exit, Heuristic::Zero, cancel, sink)
}

fn search(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    heuristic: Heuristic,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let width = grid.width() as usize;
    let mut parents = ParentMap::new(grid);
    let mut g_score = vec![u32::MAX; grid.len() as usize];
    let mut open: BinaryHeap<Entry> = BinaryHeap::new();

    let start_idx = start.1 as usize * width + start.0 as usize;
    g_score[start_idx] = 0;
    let h0 = heuristic.estimate(start, exit);
    open.push(Reverse((h0, h0, 0, start.0, start.1)));
    let mut seq = 1u64;

    let mut visited_count = 0u64;
    let mut found = false;

    while let Some(Reverse((_, _, _, x, y))) = open.pop() {
        cancel.check()?;
        if grid.cell(x, y).visited_solve() {
            continue; // stale heap entry, cell already expanded
        }
        mark_visited(grid, x, y, sink);
        visited_count += 1;
        if (x, y) == exit {
            found = true;
            break;
        }

        let g_here = g_score[y as usize * width + x as usize];
        for (nx, ny, dir) in grid.open_neighbors(x, y) {
            let n_idx = ny as usize * width + nx as usize;
            let g_next = g_here + 1;
            if g_next < g_score[n_idx] {
                g_score[n_idx] = g_next;
                parents.set(nx, ny, dir.opposite());
                let h = heuristic.estimate((nx, ny), exit);
                open.push(Reverse((g_next + h, h, seq, nx, ny)));
                seq += 1;
            }
        }
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
    use crate::generator::backtracker;
    use crate::rng;
    use crate::solver::bfs;

    fn generated(size: u32, seed: u64) -> Grid {
        let mut grid = Grid::new(size, size).unwrap();
        backtracker::carve(
            &mut grid,
            &mut rng::seeded(seed),
            &CancelToken::new(),
            &mut NullSink,
        )
        .unwrap();
        grid
    }

    #[test]
    fn astar_matches_bfs_length() {
        let cancel = CancelToken::new();
        let mut grid = generated(25, 123);
        let exit = grid.exit();

        let by_bfs = bfs::solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_astar = solve_astar(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();

        assert!(by_bfs.found && by_astar.found);
        assert_eq!(by_bfs.path.len(), by_astar.path.len());
    }

    #[test]
    fn astar_expands_no_more_than_dijkstra() {
        let cancel = CancelToken::new();
        let mut grid = generated(30, 9);
        let exit = grid.exit();

        let by_dijkstra = solve_dijkstra(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_astar = solve_astar(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();

        assert!(by_astar.visited_count <= by_dijkstra.visited_count);
    }

    #[test]
    fn dijkstra_matches_bfs_length() {
        let cancel = CancelToken::new();
        let mut grid = generated(18, 4);
        let exit = grid.exit();

        let by_bfs = bfs::solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_dij = solve_dijkstra(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();

        assert_eq!(by_bfs.path.len(), by_dij.path.len());
    }
}
