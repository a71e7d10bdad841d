//! # warren-core: Bit-Packed Maze Generation and Solving Engine
//!
//! `warren-core` generates, solves and serializes rectangular grid mazes
//! at scales up to hundreds of millions of cells. One byte per cell holds
//! four wall bits and four flag bits; generators carve passages into that
//! byte array, solvers read walls and write visit marks into the same
//! bytes, and the serializer persists them with optional zlib compression.
//!
//! ## Overview
//!
//! A run moves a grid through three exclusive-ownership phases:
//!
//! 1. **Generate** — a generator takes the grid mutably, sets all walls,
//!    and carves a maze (perfect by default; braiding adds cycles).
//! 2. **Solve** — a solver takes the grid mutably, reads walls and writes
//!    `VISITED_SOLVE`/`ON_PATH` marks.
//! 3. **Persist / replay** — grid bytes round-trip through `.maze` files,
//!    and the carve/visit event stream through `.events` logs that replay
//!    deterministically.
//!
//! ## Quick Start
//!
//! ```
//! use warren_core::{
//!     generate, solve, CancelToken, GenAlgorithm, GenOptions, Grid, NullSink, SolveAlgorithm,
//! };
//!
//! let mut grid = Grid::new(64, 64)?;
//! let opts = GenOptions { seed: 42, ..GenOptions::default() };
//! let cancel = CancelToken::new();
//!
//! generate(&mut grid, GenAlgorithm::Dfs, &opts, &cancel, &mut NullSink)?;
//! let outcome = solve(&mut grid, SolveAlgorithm::Astar, &cancel, &mut NullSink)?;
//! assert!(outcome.found);
//! # Ok::<(), warren_core::EngineError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`grid`] - packed cell grid, directions, neighbor arithmetic
//! - [`rng`] - deterministic seeded RNG and per-worker stream derivation
//! - [`events`] - event stream, `.events` log, replay
//! - [`generator`] - dfs / prim / fractal / organic carvers and braiding
//! - [`solver`] - the ten pathfinding solvers
//! - [`serialize`] - `.maze` file read/write
//! - [`metrics`] - dead ends, branching factor, shortest-path length
//! - [`cancel`] - cooperative cancellation token
//! - [`error`] - the error taxonomy
//!
//! ## Determinism
//!
//! For a fixed `(seed, width, height, algorithm, options)` the final grid
//! is byte-for-byte reproducible, including the data-parallel generators:
//! every fractal block and organic agent owns an RNG stream derived from
//! the seed and its index, so thread scheduling never reaches the output.
//! Solver output is deterministic outright — tie-breaks are fixed, not
//! random.

#![deny(missing_docs)]

pub mod cancel;
pub mod error;
pub mod events;
pub mod generator;
pub mod grid;
pub mod metrics;
pub mod rng;
pub mod serialize;
pub mod solver;

pub use cancel::CancelToken;
pub use error::{EngineError, Result};
pub use events::{
    apply_event, replay, Event, EventKind, EventLog, EventReader, EventSink, EventWriter, NullSink,
};
pub use generator::{generate, GenAlgorithm, GenOptions};
pub use grid::{Cell, Dir, Grid, GridReader, MAX_CELLS};
pub use metrics::{analyze, census, ComplexityReport, WallCensus};
pub use serialize::{load_maze, read_maze, save_maze, write_maze, MazeFile, Metadata};
pub use solver::{solve, solve_from, SolveAlgorithm, SolveOutcome};
