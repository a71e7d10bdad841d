//! Bidirectional A*.
//!
//! Two A* searches — forward from the start, backward from the exit —
//! expanding strictly one node each in alternation. The forward front
//! closes cells with `VISITED_SOLVE`, the backward front with `MARK_AUX`.
//! When a cell about to be expanded on one side is already closed on the
//! other, that cell is the meeting point; because the Manhattan heuristic
//! is admissible and consistent on a unit-cost grid, performing this check
//! at *expansion* time (not insertion time) makes the first meeting
//! optimal. The path is stitched from the two parent chains, one half
//! reversed.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Grid};
use crate::solver::{manhattan, ParentMap, SolveOutcome};

type Entry = Reverse<(u32, u32, u64, u32, u32)>;

struct Front {
    open: BinaryHeap<Entry>,
    g_score: Vec<u32>,
    parents: ParentMap,
    /// Flag this front closes cells with.
    own_flag: u8,
    /// Flag the opposing front closes cells with.
    other_flag: u8,
    /// Heuristic target (the opposing endpoint).
    target: (u32, u32),
    seq: u64,
}

impl Front {
    fn new(grid: &Grid, source: (u32, u32), target: (u32, u32), own_flag: u8, other_flag: u8) -> Front {
        let mut front = Front {
            open: BinaryHeap::new(),
            g_score: vec![u32::MAX; grid.len() as usize],
            parents: ParentMap::new(grid),
            own_flag,
            other_flag,
            target,
            seq: 1,
        };
        let idx = source.1 as usize * grid.width() as usize + source.0 as usize;
        front.g_score[idx] = 0;
        let h = manhattan(source, target);
        front.open.push(Reverse((h, h, 0, source.0, source.1)));
        front
    }

    /// Expands one node. Returns the meeting cell if this front ran into
    /// territory the other front has closed.
    fn expand_one(
        &mut self,
        grid: &mut Grid,
        sink: &mut dyn EventSink,
        visited_count: &mut u64,
    ) -> Option<(u32, u32)> {
        let width = grid.width() as usize;
        while let Some(Reverse((_, _, _, x, y))) = self.open.pop() {
            if grid.get_flag(x, y, self.own_flag) {
                continue; // stale entry
            }
            if grid.get_flag(x, y, self.other_flag) {
                return Some((x, y)); // expansion-time meeting check
            }

            grid.set_flag(x, y, self.own_flag, true);
            sink.on_event(if self.own_flag == Cell::VISITED_SOLVE {
                Event::visit(x, y)
            } else {
                Event::visit_aux(x, y)
            });
            *visited_count += 1;

            let g_here = self.g_score[y as usize * width + x as usize];
            for (nx, ny, dir) in grid.open_neighbors(x, y) {
                let n_idx = ny as usize * width + nx as usize;
                let g_next = g_here + 1;
                if g_next < self.g_score[n_idx] {
                    self.g_score[n_idx] = g_next;
                    self.parents.set(nx, ny, dir.opposite());
                    let h = manhattan((nx, ny), self.target);
                    self.open.push(Reverse((g_next + h, h, self.seq, nx, ny)));
                    self.seq += 1;
                }
            }
            return None;
        }
        None
    }
}

/// Runs the bidirectional search between the endpoints.
pub fn solve(
    grid: &mut Grid,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let mut forward = Front::new(grid, start, exit, Cell::VISITED_SOLVE, Cell::MARK_AUX);
    let mut backward = Front::new(grid, exit, start, Cell::MARK_AUX, Cell::VISITED_SOLVE);

    let mut visited_count = 0u64;
    let mut meeting = None;

    while !(forward.open.is_empty() && backward.open.is_empty()) {
        cancel.check()?;
        if let Some(meet) = forward.expand_one(grid, sink, &mut visited_count) {
            meeting = Some(meet);
            break;
        }
        if let Some(meet) = backward.expand_one(grid, sink, &mut visited_count) {
            meeting = Some(meet);
            break;
        }
    }

    let Some(meet) = meeting else {
        return Ok(SolveOutcome::failure(visited_count));
    };

    // Stitch: start→meet from the forward chain (reversed by
    // reconstruct), then meet→exit by following the backward chain, whose
    // parent pointers lead toward the exit.
    let mut path = forward.parents.reconstruct(grid, start, meet, sink)?;
    let (mut x, mut y) = meet;
    while (x, y) != exit {
        let dir = backward
            .parents
            .get(x, y)
            .ok_or(crate::EngineError::InvariantViolation(
                "backward parent chain broken before reaching the exit",
            ))?;
        let (px, py) = grid
            .neighbor(x, y, dir)
            .ok_or(crate::EngineError::InvariantViolation(
                "backward parent chain walked off the grid",
            ))?;
        x = px;
        y = py;
        path.push((x, y));
        grid.set_flag(x, y, Cell::ON_PATH, true);
        sink.on_event(Event::path(x, y));
    }

    Ok(SolveOutcome {
        found: true,
        path,
        visited_count,
    })
}
