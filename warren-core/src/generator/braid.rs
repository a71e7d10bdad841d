//! Braiding: dead-end removal.
//!
//! Walks the grid once in scan order. Every cell that is still a dead end
//! (exactly three walls) when reached is, with independent probability
//! `factor`, opened toward one random closed in-bounds neighbor. Border
//! walls are never touched. The removed fraction is `factor` in
//! expectation, not exactly — knocking out one dead end can demote a
//! later one before it is reached.

use rand::Rng;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::events::{Event, EventSink};
use crate::grid::{Dir, Grid};
use crate::rng::MazeRng;

/// Runs the braiding pass. Returns how many dead ends were opened.
///
/// `factor = 0` is a no-op (the RNG is not consumed); `factor = 1`
/// removes every dead end.
pub fn knock_out_dead_ends(
    grid: &mut Grid,
    factor: f64,
    rng: &mut MazeRng,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<u64> {
    if factor <= 0.0 {
        return Ok(0);
    }

    let mut removed = 0u64;
    let mut closed = [Dir::North; 4];

    for y in 0..grid.height() {
        cancel.check()?;
        for x in 0..grid.width() {
            if grid.cell(x, y).wall_count() != 3 {
                continue;
            }
            if rng.random::<f64>() >= factor {
                continue;
            }

            let mut count = 0;
            for dir in Dir::ORDER {
                if grid.has_wall(x, y, dir) && grid.neighbor(x, y, dir).is_some() {
                    closed[count] = dir;
                    count += 1;
                }
            }
            if count == 0 {
                continue; // dead end fenced in by the border on all closed sides
            }

            let dir = closed[rng.random_range(0..count)];
            grid.carve(x, y, dir)?;
            sink.on_event(Event::connect(x, y, dir));
            removed += 1;
        }
    }

    Ok(removed)
}
