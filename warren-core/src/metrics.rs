//! Complexity metrics.
//!
//! One scan classifies every cell by wall count; one flag-free BFS
//! measures the shortest start→exit distance. Nothing here touches the
//! grid's solver flags, so metrics can run between a generator and a
//! solver without disturbing either.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::grid::Grid;

/// Wall-count classification of a grid, from a single scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WallCensus {
    /// Cells with exactly three walls.
    pub dead_ends: u64,
    /// Cells with exactly two walls.
    pub corridors: u64,
    /// Cells with one wall or none.
    pub junctions: u64,
}

/// Classifies every cell by wall count.
pub fn census(grid: &Grid) -> WallCensus {
    let mut tally = WallCensus::default();
    for &bits in grid.as_bytes() {
        match crate::grid::Cell::from_bits(bits).wall_count() {
            3 => tally.dead_ends += 1,
            2 => tally.corridors += 1,
            0 | 1 => tally.junctions += 1,
            _ => {}
        }
    }
    tally
}

/// Full complexity report for a generated maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComplexityReport {
    /// Cells with exactly three walls.
    pub dead_ends: u64,
    /// Cells with exactly two walls.
    pub corridors: u64,
    /// Cells with at most one wall.
    pub junctions: u64,
    /// Dead ends as a fraction of all cells.
    pub dead_end_fraction: f64,
    /// Mean of `open_edges − 1` over non-dead-end carved cells.
    pub branching_factor: f64,
    /// Shortest start→exit distance in steps, `None` when unreachable.
    pub path_length: Option<u64>,
}

/// Computes the full report: one classification scan plus one BFS.
pub fn analyze(grid: &Grid, cancel: &CancelToken) -> Result<ComplexityReport> {
    let mut tally = WallCensus::default();
    let mut branch_sum = 0u64;
    let mut branch_cells = 0u64;

    for y in 0..grid.height() {
        cancel.check()?;
        for x in 0..grid.width() {
            let open = grid.open_neighbors(x, y).count() as u64;
            match open {
                1 => tally.dead_ends += 1,
                2 => tally.corridors += 1,
                3 | 4 => tally.junctions += 1,
                _ => {}
            }
            if open >= 2 {
                branch_sum += open - 1;
                branch_cells += 1;
            }
        }
    }

    let cells = grid.len();
    Ok(ComplexityReport {
        dead_ends: tally.dead_ends,
        corridors: tally.corridors,
        junctions: tally.junctions,
        dead_end_fraction: tally.dead_ends as f64 / cells as f64,
        branching_factor: if branch_cells > 0 {
            branch_sum as f64 / branch_cells as f64
        } else {
            0.0
        },
        path_length: shortest_path_len(grid, cancel)?,
    })
}

/// BFS distance start→exit using a private visited bitset — grid flags
/// stay untouched.
pub fn shortest_path_len(grid: &Grid, cancel: &CancelToken) -> Result<Option<u64>> {
    let width = grid.width() as usize;
    let mut seen = vec![0u64; (grid.len() as usize).div_ceil(64)];
    let exit = grid.exit();

    let mark = |seen: &mut [u64], x: u32, y: u32| {
        let idx = y as usize * width + x as usize;
        seen[idx / 64] |= 1 << (idx % 64);
    };
    let is_marked = |seen: &[u64], x: u32, y: u32| {
        let idx = y as usize * width + x as usize;
        seen[idx / 64] & (1 << (idx % 64)) != 0
    };

    if grid.start() == exit {
        return Ok(Some(0));
    }
    let mut frontier = vec![grid.start()];
    mark(&mut seen, 0, 0);
    let mut distance = 0u64;

    while !frontier.is_empty() {
        cancel.check()?;
        let mut next = Vec::new();
        for &(x, y) in &frontier {
            for (nx, ny, _) in grid.open_neighbors(x, y) {
                if is_marked(&seen, nx, ny) {
                    continue;
                }
                mark(&mut seen, nx, ny);
                if (nx, ny) == exit {
                    return Ok(Some(distance + 1));
                }
                next.push((nx, ny));
            }
        }
        frontier = next;
        distance += 1;
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::generator::backtracker;
    use crate::rng;

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
    fn census_classes_partition_carved_cells() {
        let grid = generated(20, 8);
        let tally = census(&grid);
        // Every carved cell has 1..=3 walls, so the classes cover the grid.
        assert_eq!(tally.dead_ends + tally.corridors + tally.junctions, 400);
        assert!(tally.dead_ends > 0);
    }

    #[test]
    fn analyze_reports_a_reachable_exit() {
        let grid = generated(16, 2);
        let report = analyze(&grid, &CancelToken::new()).unwrap();

        let len = report.path_length.expect("exit must be reachable");
        // Manhattan lower bound for opposite corners of a 16x16 grid.
        assert!(len >= 30);
        assert!(report.branching_factor >= 1.0);
        assert!(report.dead_end_fraction > 0.0 && report.dead_end_fraction < 1.0);
    }

    #[test]
    fn unreachable_exit_reports_none() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.fill_walls();
        assert_eq!(
            shortest_path_len(&grid, &CancelToken::new()).unwrap(),
            None
        );
    }

    #[test]
    fn metrics_leave_solver_flags_alone() {
        let grid = generated(10, 3);
        let before = grid.as_bytes().to_vec();
        analyze(&grid, &CancelToken::new()).unwrap();
        assert_eq!(grid.as_bytes(), &before[..]);
    }
}
