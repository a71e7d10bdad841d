//! Wall followers ("left" / "right").
//!
//! No memory beyond the current cell and facing: keep one hand on the
//! wall and walk. Complete on perfect mazes; in braided mazes a follower
//! can orbit an isolated cycle forever, so the walk is capped at
//! `4 · cells` steps and reports failure past the cap instead of looping.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Dir, Grid};
use crate::solver::SolveOutcome;

/// Which hand stays on the wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hand {
    /// Prefer turning left.
    Left,
    /// Prefer turning right.
    Right,
}

/// Directions in clockwise turning order.
const CLOCKWISE: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

/// Runs the wall follower between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    hand: Hand,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let mut facing = 1usize; // east
    let (mut x, mut y) = start;

    let mut path = vec![start];
    grid.set_flag(x, y, Cell::VISITED_SOLVE, true);
    sink.on_event(Event::visit(x, y));
    let mut visited_count = 1u64;

    let step_cap = 4 * grid.len();
    let mut steps = 0u64;

    while (x, y) != exit && steps < step_cap {
        cancel.check()?;

        // Left hand: try the left turn, then straight, right, and back.
        // Right hand mirrors. Offsets are in clockwise index space.
        let offsets: [usize; 4] = match hand {
            Hand::Left => [3, 0, 1, 2],
            Hand::Right => [1, 0, 3, 2],
        };

        let mut moved = false;
        for offset in offsets {
            let candidate = (facing + offset) % 4;
            let dir = CLOCKWISE[candidate];
            if grid.has_wall(x, y, dir) {
                continue;
            }
            if let Some((nx, ny)) = grid.neighbor(x, y, dir) {
                x = nx;
                y = ny;
                facing = candidate;
                path.push((x, y));
                if !grid.cell(x, y).visited_solve() {
                    grid.set_flag(x, y, Cell::VISITED_SOLVE, true);
                    sink.on_event(Event::visit(x, y));
                    visited_count += 1;
                }
                moved = true;
                break;
            }
        }

        if !moved {
            break; // sealed cell, nothing reachable
        }
        steps += 1;
    }

    if (x, y) != exit {
        return Ok(SolveOutcome::failure(visited_count));
    }

    for &(px, py) in &path {
        grid.set_flag(px, py, Cell::ON_PATH, true);
        sink.on_event(Event::path(px, py));
    }
    Ok(SolveOutcome {
        found: true,
        path,
        visited_count,
    })
}
