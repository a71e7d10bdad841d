//! Shared invariant checkers for warren-core tests.

#![allow(dead_code)] // Not every test file uses every checker

use warren_core::{CancelToken, Dir, GenAlgorithm, GenOptions, Grid, NullSink};

/// Generates a maze with the given algorithm and options, panicking on
/// any engine error.
pub fn generated(width: u32, height: u32, algo: GenAlgorithm, opts: GenOptions) -> Grid {
    let mut grid = Grid::new(width, height).expect("valid dimensions");
    warren_core::generate(&mut grid, algo, &opts, &CancelToken::new(), &mut NullSink)
        .expect("generation failed");
    grid
}

/// Seed-only options.
pub fn seeded(seed: u64) -> GenOptions {
    GenOptions {
        seed,
        ..GenOptions::default()
    }
}

/// Asserts the wall-symmetry invariant: each edge flag matches its
/// neighbor's opposing flag.
pub fn assert_wall_symmetry(grid: &Grid) {
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            for dir in Dir::ORDER {
                if let Some((nx, ny)) = grid.neighbor(x, y, dir) {
                    assert_eq!(
                        grid.has_wall(x, y, dir),
                        grid.has_wall(nx, ny, dir.opposite()),
                        "asymmetric wall between ({x}, {y}) and ({nx}, {ny})"
                    );
                }
            }
        }
    }
}

/// Number of open (carved) interior edges, counting each edge once.
pub fn open_edge_count(grid: &Grid) -> u64 {
    let mut open = 0u64;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if x + 1 < grid.width() && !grid.has_wall(x, y, Dir::East) {
                open += 1;
            }
            if y + 1 < grid.height() && !grid.has_wall(x, y, Dir::South) {
                open += 1;
            }
        }
    }
    open
}

/// Whether every cell is reachable from the entrance through open edges.
pub fn is_connected(grid: &Grid) -> bool {
    let cells = grid.len() as usize;
    let width = grid.width() as usize;
    let mut seen = vec![false; cells];
    let mut stack = vec![grid.start()];
    seen[0] = true;
    let mut reached = 1usize;

    while let Some((x, y)) = stack.pop() {
        for (nx, ny, _) in grid.open_neighbors(x, y) {
            let idx = ny as usize * width + nx as usize;
            if !seen[idx] {
                seen[idx] = true;
                reached += 1;
                stack.push((nx, ny));
            }
        }
    }
    reached == cells
}

/// Cells with exactly three walls.
pub fn dead_end_count(grid: &Grid) -> u64 {
    let mut count = 0u64;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.cell(x, y).wall_count() == 3 {
                count += 1;
            }
        }
    }
    count
}

/// Asserts a solver path is structurally valid: endpoints right, steps
/// adjacent, shared edges open.
pub fn assert_path_valid(grid: &Grid, path: &[(u32, u32)], start: (u32, u32), exit: (u32, u32)) {
    assert!(!path.is_empty(), "valid path cannot be empty");
    assert_eq!(path[0], start, "path must begin at the start");
    assert_eq!(*path.last().unwrap(), exit, "path must end at the exit");

    for pair in path.windows(2) {
        let (ax, ay) = pair[0];
        let (bx, by) = pair[1];
        assert_eq!(
            ax.abs_diff(bx) + ay.abs_diff(by),
            1,
            "path steps {:?} -> {:?} are not adjacent",
            pair[0],
            pair[1]
        );
        let open = grid
            .open_neighbors(ax, ay)
            .any(|(nx, ny, _)| (nx, ny) == (bx, by));
        assert!(open, "wall between path cells {:?} and {:?}", pair[0], pair[1]);
    }
}
