//! Recursive backtracker ("dfs").
//!
//! Depth-first carving with an explicit LIFO buffer. Runs deep before it
//! runs wide, which is what produces the algorithm's signature long
//! corridors. Neighbors are filtered for visitedness first, then one
//! survivor is drawn uniformly — never in a fixed cardinal order, which
//! would bias the texture toward one corner.

use rand::Rng;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Dir, Grid};
use crate::rng::MazeRng;

/// Carves a perfect maze over the whole grid.
pub fn carve(
    grid: &mut Grid,
    rng: &mut MazeRng,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<()> {
    grid.fill_walls();
    let (w, h) = (grid.width(), grid.height());
    carve_window(grid, rng, 0, 0, w, h, cancel, sink)
}

/// Carves a perfect maze inside the window `[x0, x0+w) × [y0, y0+h)`,
/// treating the window edge as a wall. The fractal generator runs this
/// per block.
#[allow(clippy::too_many_arguments)]
pub(crate) fn carve_window(
    grid: &mut Grid,
    rng: &mut MazeRng,
    x0: u32,
    y0: u32,
    w: u32,
    h: u32,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<()> {
    let x1 = x0 + w;
    let y1 = y0 + h;

    let mut stack: Vec<(u32, u32)> = Vec::new();
    grid.set_flag(x0, y0, Cell::VISITED_GEN, true);
    stack.push((x0, y0));

    let mut candidates = [Dir::North; 4];
    while let Some(&(cx, cy)) = stack.last() {
        cancel.check()?;

        let mut count = 0;
        for (nx, ny, dir) in grid.neighbors(cx, cy) {
            if nx < x0 || nx >= x1 || ny < y0 || ny >= y1 {
                continue;
            }
            if !grid.cell(nx, ny).visited_gen() {
                candidates[count] = dir;
                count += 1;
            }
        }

        if count == 0 {
            stack.pop();
            continue;
        }

        let dir = candidates[rng.random_range(0..count)];
        grid.carve(cx, cy, dir)?;
        sink.on_event(Event::carve(cx, cy, dir));

        // carve() validated the neighbor, so this coordinate exists.
        let (nx, ny) = match dir {
            Dir::North => (cx, cy - 1),
            Dir::South => (cx, cy + 1),
            Dir::East => (cx + 1, cy),
            Dir::West => (cx - 1, cy),
        };
        grid.set_flag(nx, ny, Cell::VISITED_GEN, true);
        stack.push((nx, ny));
    }

    Ok(())
}
