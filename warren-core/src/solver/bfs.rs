//! Breadth-first search: shortest path in steps, FIFO expansion order.

use std::collections::VecDeque;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::EventSink;
use crate::grid::Grid;
use crate::solver::{mark_visited, ParentMap, SolveOutcome};

/// Runs BFS between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let mut parents = ParentMap::new(grid);
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

    mark_visited(grid, start.0, start.1, sink);
    let mut visited_count = 1u64;
    queue.push_back(start);

    let mut found = false;
    while let Some((x, y)) = queue.pop_front() {
        cancel.check()?;
        if (x, y) == exit {
            found = true;
            break;
        }
        for (nx, ny, dir) in grid.open_neighbors(x, y) {
            if grid.cell(nx, ny).visited_solve() {
                continue;
            }
            mark_visited(grid, nx, ny, sink);
            visited_count += 1;
            parents.set(nx, ny, dir.opposite());
            queue.push_back((nx, ny));
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
