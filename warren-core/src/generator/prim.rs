//! Randomized Prim's ("prim").
//!
//! Grows the maze from the entrance by repeatedly opening a uniformly
//! random wall on the frontier — the set of walls separating a visited
//! cell from an unvisited one. Walls whose far side was visited in the
//! meantime are discarded on draw. Produces short, spiky branches.

use rand::Rng;

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Dir, Grid};
use crate::rng::MazeRng;

/// Frontier wall: the visited side plus the direction across the wall.
type FrontierWall = (u32, u32, Dir);

/// Carves a perfect maze over the whole grid.
pub fn carve(
    grid: &mut Grid,
    rng: &mut MazeRng,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<()> {
    grid.fill_walls();

    let (sx, sy) = grid.start();
    grid.set_flag(sx, sy, Cell::VISITED_GEN, true);

    let mut frontier: Vec<FrontierWall> = Vec::new();
    push_frontier_walls(grid, sx, sy, &mut frontier);

    while !frontier.is_empty() {
        cancel.check()?;

        // Uniform draw with O(1) removal; frontier order is irrelevant.
        let pick = rng.random_range(0..frontier.len());
        let (x, y, dir) = frontier.swap_remove(pick);

        let (nx, ny) = grid
            .neighbor(x, y, dir)
            .ok_or(EngineError::InvariantViolation(
                "frontier wall without an in-bounds far side",
            ))?;
        if grid.cell(nx, ny).visited_gen() {
            continue; // discard: the far side was reached another way
        }

        grid.carve(x, y, dir)?;
        grid.set_flag(nx, ny, Cell::VISITED_GEN, true);
        sink.on_event(Event::carve(x, y, dir));
        push_frontier_walls(grid, nx, ny, &mut frontier);
    }

    Ok(())
}

fn push_frontier_walls(grid: &Grid, x: u32, y: u32, frontier: &mut Vec<FrontierWall>) {
    for (nx, ny, dir) in grid.neighbors(x, y) {
        if !grid.cell(nx, ny).visited_gen() {
            frontier.push((x, y, dir));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::rng;

    #[test]
    fn visits_every_cell() {
        let mut grid = Grid::new(11, 5).unwrap();
        carve(
            &mut grid,
            &mut rng::seeded(42),
            &CancelToken::new(),
            &mut NullSink,
        )
        .unwrap();

        for y in 0..5 {
            for x in 0..11 {
                assert!(grid.cell(x, y).visited_gen(), "unvisited cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn same_seed_same_bytes() {
        let mut a = Grid::new(12, 12).unwrap();
        let mut b = Grid::new(12, 12).unwrap();
        let cancel = CancelToken::new();
        carve(&mut a, &mut rng::seeded(5), &cancel, &mut NullSink).unwrap();
        carve(&mut b, &mut rng::seeded(5), &cancel, &mut NullSink).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }
}
