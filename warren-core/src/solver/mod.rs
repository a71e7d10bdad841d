//! Pathfinding solvers.
//!
//! Ten algorithms share one contract: given a generated grid and a
//! start/exit pair, report `(found, path, visited_count)`. On success the
//! path runs from start to exit through open edges, every expanded cell
//! carries `VISITED_SOLVE`, and the path cells carry `ON_PATH`. On failure
//! the path is empty — a solver running to exhaustion is data for the
//! caller, not an error.
//!
//! | Solver | Structure | Optimal? |
//! |--------|-----------|----------|
//! | `bfs` | FIFO queue | shortest in steps |
//! | `dijkstra` | cost-keyed heap | shortest |
//! | `astar` | f-keyed heap, Manhattan h | shortest |
//! | `biastar` | two alternating A* fronts | shortest |
//! | `dfs_solve` | LIFO stack | no |
//! | `left` / `right` | hand on wall, no memory | no; may fail in braids |
//! | `deadend` | dead-end filling automaton | perfect mazes only |
//! | `tremaux` | two-bit corridor marks | no, but robust |
//! | `swarm` | level-parallel BFS lanes | shortest |
//!
//! Neighbor examination order is fixed (N, E, S, W) everywhere, so solver
//! output is fully deterministic. Every solver checks the cancellation
//! token once per expansion.

pub mod astar;
pub mod bfs;
pub mod biastar;
pub mod deadend;
pub mod dfs;
pub mod swarm;
pub mod tremaux;
pub mod wall;

use std::fmt;
use std::str::FromStr;

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Dir, Grid};

/// The solver family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveAlgorithm {
    /// Breadth-first search.
    Bfs,
    /// Dijkstra over uniform edge costs.
    Dijkstra,
    /// A* with the Manhattan heuristic.
    Astar,
    /// Bidirectional A*.
    BiAstar,
    /// Depth-first probe.
    DfsSolve,
    /// Left-hand wall follower.
    Left,
    /// Right-hand wall follower.
    Right,
    /// Dead-end filler.
    DeadEnd,
    /// Trémaux's corridor-marking walk.
    Tremaux,
    /// Frontier-partitioned parallel BFS.
    Swarm,
}

impl SolveAlgorithm {
    /// Every solver, in CLI listing order.
    pub const ALL: [SolveAlgorithm; 10] = [
        SolveAlgorithm::Bfs,
        SolveAlgorithm::Dijkstra,
        SolveAlgorithm::Astar,
        SolveAlgorithm::BiAstar,
        SolveAlgorithm::DfsSolve,
        SolveAlgorithm::Left,
        SolveAlgorithm::Right,
        SolveAlgorithm::DeadEnd,
        SolveAlgorithm::Tremaux,
        SolveAlgorithm::Swarm,
    ];

    /// The CLI name of this solver.
    pub fn as_str(self) -> &'static str {
        match self {
            SolveAlgorithm::Bfs => "bfs",
            SolveAlgorithm::Dijkstra => "dijkstra",
            SolveAlgorithm::Astar => "astar",
            SolveAlgorithm::BiAstar => "biastar",
            SolveAlgorithm::DfsSolve => "dfs_solve",
            SolveAlgorithm::Left => "left",
            SolveAlgorithm::Right => "right",
            SolveAlgorithm::DeadEnd => "deadend",
            SolveAlgorithm::Tremaux => "tremaux",
            SolveAlgorithm::Swarm => "swarm",
        }
    }

    /// Whether this solver guarantees shortest paths (on perfect mazes for
    /// `deadend`).
    pub fn claims_optimality(self) -> bool {
        matches!(
            self,
            SolveAlgorithm::Bfs
                | SolveAlgorithm::Dijkstra
                | SolveAlgorithm::Astar
                | SolveAlgorithm::BiAstar
                | SolveAlgorithm::DeadEnd
                | SolveAlgorithm::Swarm
        )
    }
}

impl fmt::Display for SolveAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolveAlgorithm {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<SolveAlgorithm> {
        match name {
            "bfs" => Ok(SolveAlgorithm::Bfs),
            "dijkstra" => Ok(SolveAlgorithm::Dijkstra),
            "astar" => Ok(SolveAlgorithm::Astar),
            "biastar" => Ok(SolveAlgorithm::BiAstar),
            "dfs_solve" => Ok(SolveAlgorithm::DfsSolve),
            "left" => Ok(SolveAlgorithm::Left),
            "right" => Ok(SolveAlgorithm::Right),
            "deadend" => Ok(SolveAlgorithm::DeadEnd),
            "tremaux" => Ok(SolveAlgorithm::Tremaux),
            "swarm" => Ok(SolveAlgorithm::Swarm),
            other => Err(EngineError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// What a solver reports back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Whether the exit was reached.
    pub found: bool,
    /// Ordered start→exit coordinates; empty on failure.
    pub path: Vec<(u32, u32)>,
    /// Cells the solver touched (marked `VISITED_SOLVE` or `MARK_AUX`).
    pub visited_count: u64,
}

impl SolveOutcome {
    fn failure(visited_count: u64) -> SolveOutcome {
        SolveOutcome {
            found: false,
            path: Vec::new(),
            visited_count,
        }
    }
}

/// Solves from the canonical entrance to the canonical exit.
pub fn solve(
    grid: &mut Grid,
    algo: SolveAlgorithm,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    let start = grid.start();
    let exit = grid.exit();
    solve_from(grid, algo, start, exit, cancel, sink)
}

/// Solves between arbitrary endpoints.
///
/// Clears the solver flags of any previous run first (emitting a
/// whole-grid `ClearVisit` when a sink is recording), then dispatches.
pub fn solve_from(
    grid: &mut Grid,
    algo: SolveAlgorithm,
    start: (u32, u32),
    exit: (u32, u32),
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<SolveOutcome> {
    for (x, y) in [start, exit] {
        if !grid.in_bounds(x, y) {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: grid.width(),
                height: grid.height(),
            });
        }
    }

    grid.reset_solver_flags();
    if sink.enabled() {
        sink.on_event(Event::clear_all());
    }

    match algo {
        SolveAlgorithm::Bfs => bfs::solve(grid, start, exit, cancel, sink),
        SolveAlgorithm::Dijkstra => astar::solve_dijkstra(grid, start, exit, cancel, sink),
        SolveAlgorithm::Astar => astar::solve_astar(grid, start, exit, cancel, sink),
        SolveAlgorithm::BiAstar => biastar::solve(grid, start, exit, cancel, sink),
        SolveAlgorithm::DfsSolve => dfs::solve(grid, start, exit, cancel, sink),
        SolveAlgorithm::Left => wall::solve(grid, start, exit, wall::Hand::Left, cancel, sink),
        SolveAlgorithm::Right => wall::solve(grid, start, exit, wall::Hand::Right, cancel, sink),
        SolveAlgorithm::DeadEnd => deadend::solve(grid, start, exit, cancel, sink),
        SolveAlgorithm::Tremaux => tremaux::solve(grid, start, exit, cancel, sink),
        SolveAlgorithm::Swarm => swarm::solve(grid, start, exit, cancel, sink),
    }
}

/// Dense direction-to-parent map: one byte per cell holding the wall bit
/// of the direction from the cell toward its parent, 0 for "no parent".
///
/// At 400M cells a coordinate hash map would be ruinous; one byte per
/// cell is the same budget as the grid itself.
pub(crate) struct ParentMap {
    dirs: Vec<u8>,
    width: u32,
}

impl ParentMap {
    pub(crate) fn new(grid: &Grid) -> ParentMap {
        ParentMap {
            dirs: vec![0u8; grid.len() as usize],
            width: grid.width(),
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Records that the parent of `(x, y)` lies toward `dir`.
    #[inline]
    pub(crate) fn set(&mut self, x: u32, y: u32, dir: Dir) {
        let idx = self.index(x, y);
        self.dirs[idx] = dir.wall_bit();
    }

    /// Direction from `(x, y)` toward its parent, if recorded.
    #[inline]
    pub(crate) fn get(&self, x: u32, y: u32) -> Option<Dir> {
        Dir::from_wall_bit(self.dirs[self.index(x, y)])
    }

    /// Walks the parent chain exit→start, marking `ON_PATH` and emitting
    /// path events, and returns the start→exit path.
    ///
    /// Parent chains are acyclic by construction; a break in the chain
    /// before reaching `start` is an internal bug.
    pub(crate) fn reconstruct(
        &self,
        grid: &mut Grid,
        start: (u32, u32),
        exit: (u32, u32),
        sink: &mut dyn EventSink,
    ) -> Result<Vec<(u32, u32)>> {
        let mut path = Vec::new();
        let (mut x, mut y) = exit;
        loop {
            path.push((x, y));
            grid.set_flag(x, y, Cell::ON_PATH, true);
            sink.on_event(Event::path(x, y));
            if (x, y) == start {
                break;
            }
            let dir = self.get(x, y).ok_or(EngineError::InvariantViolation(
                "parent chain broken before reaching the start",
            ))?;
            let (px, py) = grid
                .neighbor(x, y, dir)
                .ok_or(EngineError::InvariantViolation(
                    "parent chain walked off the grid",
                ))?;
            x = px;
            y = py;
        }
        path.reverse();
        Ok(path)
    }
}

/// Manhattan distance, the admissible heuristic on a uniform grid.
#[inline]
pub(crate) fn manhattan(a: (u32, u32), b: (u32, u32)) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Marks `VISITED_SOLVE` and emits the visit event.
#[inline]
pub(crate) fn mark_visited(grid: &mut Grid, x: u32, y: u32, sink: &mut dyn EventSink) {
    grid.set_flag(x, y, Cell::VISITED_SOLVE, true);
    sink.on_event(Event::visit(x, y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for algo in SolveAlgorithm::ALL {
            assert_eq!(algo.as_str().parse::<SolveAlgorithm>().unwrap(), algo);
        }
        assert!("bellman".parse::<SolveAlgorithm>().is_err());
    }

    #[test]
    fn manhattan_is_symmetric() {
        assert_eq!(manhattan((0, 0), (4, 7)), 11);
        assert_eq!(manhattan((4, 7), (0, 0)), 11);
        assert_eq!(manhattan((3, 3), (3, 3)), 0);
    }

    #[test]
    fn out_of_bounds_endpoints_are_rejected() {
        let mut grid = Grid::new(4, 4).unwrap();
        let result = solve_from(
            &mut grid,
            SolveAlgorithm::Bfs,
            (0, 0),
            (9, 9),
            &CancelToken::new(),
            &mut crate::events::NullSink,
        );
        assert!(matches!(result, Err(EngineError::OutOfBounds { .. })));
    }
}
