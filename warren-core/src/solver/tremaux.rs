//! Trémaux's algorithm ("tremaux").
//!
//! A robot that begins at the start and physically walks, keeping a
//! per-cell mark that counts entries: 0, 1 or 2. `VISITED_SOLVE` encodes
//! "entered once", `MARK_AUX` "entered twice". At each cell the robot
//! prefers an unmarked passage, then a once-marked one, and refuses
//! anything marked twice; when everything around is twice-marked it
//! retreats along its walk stack. Marks only ever increase, so total
//! forward entries are bounded by `2 · cells`; the defensive step cap is
//! `4 · cells`, past which the solver reports failure.
//!
//! Solves braided mazes as well as perfect ones, and on perfect mazes the
//! surviving walk stack *is* the solution path.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Grid};
use crate::solver::SolveOutcome;

/// Entry count of a cell, saturated at 2.
#[inline]
fn marks(grid: &Grid, x: u32, y: u32) -> u8 {
    let cell = grid.cell(x, y);
    if cell.mark_aux() {
        2
    } else if cell.visited_solve() {
        1
    } else {
        0
    }
}

/// Bumps a cell's entry count, emitting the matching event. Returns the
/// new count.
fn bump(grid: &mut Grid, x: u32, y: u32, sink: &mut dyn EventSink) -> u8 {
    if grid.cell(x, y).visited_solve() {
        grid.set_flag(x, y, Cell::MARK_AUX, true);
        sink.on_event(Event::visit_aux(x, y));
        2
    } else {
        grid.set_flag(x, y, Cell::VISITED_SOLVE, true);
        sink.on_event(Event::visit(x, y));
        1
    }
}

/// Runs the Trémaux walk between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let mut stack: Vec<(u32, u32)> = vec![start];
    bump(grid, start.0, start.1, sink);
    let mut visited_count = 1u64;

    let step_cap = 4 * grid.len();
    let mut steps = 0u64;
    let mut found = start == exit;

    while !found && steps < step_cap {
        cancel.check()?;
        let Some(&(x, y)) = stack.last() else {
            break; // retreated past the start: no path exists
        };

        // Lowest-marked open neighbor; ties resolve to N, E, S, W order.
        let mut best: Option<(u32, u32, u8)> = None;
        for (nx, ny, _) in grid.open_neighbors(x, y) {
            let m = marks(grid, nx, ny);
            if m >= 2 {
                continue;
            }
            match best {
                Some((_, _, b)) if b <= m => {}
                _ => best = Some((nx, ny, m)),
            }
        }

        match best {
            Some((nx, ny, seen)) => {
                bump(grid, nx, ny, sink);
                if seen == 0 {
                    visited_count += 1;
                    stack.push((nx, ny));
                } else if stack.len() >= 2 && stack[stack.len() - 2] == (nx, ny) {
                    stack.pop(); // walking back down the corridor we came from
                } else {
                    stack.push((nx, ny)); // closing a loop in a braided maze
                }
                if (nx, ny) == exit {
                    found = true;
                }
            }
            None => {
                // Every passage here is twice-marked: retreat.
                stack.pop();
            }
        }
        steps += 1;
    }

    if !found {
        return Ok(SolveOutcome::failure(visited_count));
    }

    for &(x, y) in &stack {
        grid.set_flag(x, y, Cell::ON_PATH, true);
        sink.on_event(Event::path(x, y));
    }
    Ok(SolveOutcome {
        found: true,
        path: stack,
        visited_count,
    })
}
