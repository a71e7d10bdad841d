//! Dead-end filler ("deadend").
//!
//! A cellular pruning pass rather than a search: repeatedly fill every
//! non-terminal cell with at most one unfilled open neighbor, using
//! `MARK_AUX` as the filled bit, until nothing fills. What survives is the
//! start→exit corridor (plus any cycles, which is why the solver is
//! optimal on perfect mazes only). A final walk along unfilled cells
//! produces the ordered path.
//!
//! Implemented with a leaf queue instead of whole-grid sweeps — the same
//! fixpoint, reached in O(cells) instead of O(cells · diameter).

use std::collections::VecDeque;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Grid};
use crate::solver::SolveOutcome;

/// Runs the dead-end filler between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let width = grid.width() as usize;
    let mut degree = vec![0u8; grid.len() as usize];
    let mut leaves: VecDeque<(u32, u32)> = VecDeque::new();

    for y in 0..grid.height() {
        cancel.check()?;
        for x in 0..grid.width() {
            let open = grid.open_neighbors(x, y).count() as u8;
            degree[y as usize * width + x as usize] = open;
            if open <= 1 && (x, y) != start && (x, y) != exit {
                leaves.push_back((x, y));
            }
        }
    }

    let mut visited_count = 0u64;
    while let Some((x, y)) = leaves.pop_front() {
        cancel.check()?;
        if grid.cell(x, y).mark_aux() {
            continue;
        }
        grid.set_flag(x, y, Cell::MARK_AUX, true);
        sink.on_event(Event::visit_aux(x, y));
        visited_count += 1;

        for (nx, ny, _) in grid.open_neighbors(x, y) {
            if grid.cell(nx, ny).mark_aux() {
                continue;
            }
            let n_idx = ny as usize * width + nx as usize;
            degree[n_idx] -= 1;
            if degree[n_idx] <= 1 && (nx, ny) != start && (nx, ny) != exit {
                leaves.push_back((nx, ny));
            }
        }
    }

    // Walk the surviving corridor. On a perfect maze the unfilled cells
    // are exactly the solution path, so never-step-backwards suffices.
    let mut path = vec![start];
    grid.set_flag(start.0, start.1, Cell::VISITED_SOLVE | Cell::ON_PATH, true);
    sink.on_event(Event::visit(start.0, start.1));
    sink.on_event(Event::path(start.0, start.1));
    visited_count += 1;

    let (mut x, mut y) = start;
    let mut prev = start;
    let step_cap = grid.len();
    let mut steps = 0u64;

    while (x, y) != exit && steps < step_cap {
        cancel.check()?;
        let mut next = None;
        for (nx, ny, _) in grid.open_neighbors(x, y) {
            if (nx, ny) == prev || grid.cell(nx, ny).mark_aux() {
                continue;
            }
            next = Some((nx, ny));
            break;
        }
        let Some((nx, ny)) = next else {
            return Ok(SolveOutcome::failure(visited_count));
        };
        prev = (x, y);
        x = nx;
        y = ny;
        path.push((x, y));
        grid.set_flag(x, y, Cell::VISITED_SOLVE | Cell::ON_PATH, true);
        sink.on_event(Event::visit(x, y));
        sink.on_event(Event::path(x, y));
        visited_count += 1;
        steps += 1;
    }

    if (x, y) != exit {
        return Ok(SolveOutcome::failure(visited_count));
    }
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
    use crate::generator::{backtracker, prim};
    use crate::rng;
    use crate::solver::bfs;

    #[test]
    fn optimal_on_perfect_mazes() {
        let cancel = CancelToken::new();
        let mut grid = Grid::new(20, 20).unwrap();
        backtracker::carve(&mut grid, &mut rng::seeded(31), &cancel, &mut NullSink).unwrap();
        let exit = grid.exit();

        let by_bfs = bfs::solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_filler = solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();

        assert!(by_filler.found);
        assert_eq!(by_bfs.path.len(), by_filler.path.len());
        assert_eq!(by_filler.path[0], (0, 0));
        assert_eq!(*by_filler.path.last().unwrap(), exit);
    }

    #[test]
    fn works_across_generators() {
        let cancel = CancelToken::new();
        let mut grid = Grid::new(14, 14).unwrap();
        prim::carve(&mut grid, &mut rng::seeded(6), &cancel, &mut NullSink).unwrap();
        let exit = grid.exit();

        let by_bfs = bfs::solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        grid.reset_solver_flags();
        let by_filler = solve(&mut grid, (0, 0), exit, &cancel, &mut NullSink).unwrap();
        assert_eq!(by_bfs.path.len(), by_filler.path.len());
    }

    #[test]
    fn path_cells_survive_the_fill() {
        let cancel = CancelToken::new();
        let mut grid = Grid::new(12, 12).unwrap();
        backtracker::carve(&mut grid, &mut rng::seeded(100), &cancel, &mut NullSink).unwrap();

        let outcome = solve(&mut grid, (0, 0), (11, 11), &cancel, &mut NullSink).unwrap();
        for &(x, y) in &outcome.path {
            assert!(!grid.cell(x, y).mark_aux(), "path cell ({x}, {y}) was filled");
            assert!(grid.cell(x, y).on_path());
        }
    }
}
