//! Maze generators.
//!
//! Four algorithms share one contract: given a grid, a seed and options,
//! leave behind a maze in which every cell is reachable from the entrance.
//! With `braid = 0` the carved edges form a spanning tree (a *perfect*
//! maze); with `braid > 0` a post-pass knocks out dead ends to introduce
//! cycles.
//!
//! | Algorithm | Style | Texture |
//! |-----------|-------|---------|
//! | [`backtracker`] | serial DFS | long corridors, low branching |
//! | [`prim`] | serial frontier | short spiky branches |
//! | [`fractal`] | fork-join over blocks | block seam aesthetic |
//! | [`organic`] | multi-agent ticks | fuzzy, high branching |
//!
//! All four run in O(cells) expected work and memory, check the
//! cancellation token once per outer iteration, and are byte-for-byte
//! reproducible at a fixed `(seed, dimensions, options)` tuple — the
//! parallel pair derives one RNG stream per block/agent so thread
//! scheduling cannot leak into the output.

pub mod backtracker;
pub mod braid;
pub mod fractal;
pub mod organic;
pub mod prim;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use crate::events::EventSink;
use crate::grid::Grid;
use crate::metrics;
use crate::rng;

/// Sub-stream index for the braiding pass of parallel generators.
const STREAM_BRAID: u64 = u64::MAX;

/// The generator family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenAlgorithm {
    /// Recursive backtracker (serial DFS).
    Dfs,
    /// Randomized Prim's over a wall frontier.
    Prim,
    /// Hierarchical divide and conquer, data-parallel over blocks.
    Fractal,
    /// Multi-agent parallel carving.
    Organic,
}

impl GenAlgorithm {
    /// Every generator, in CLI listing order.
    pub const ALL: [GenAlgorithm; 4] = [
        GenAlgorithm::Dfs,
        GenAlgorithm::Prim,
        GenAlgorithm::Fractal,
        GenAlgorithm::Organic,
    ];

    /// The CLI name of this generator.
    pub fn as_str(self) -> &'static str {
        match self {
            GenAlgorithm::Dfs => "dfs",
            GenAlgorithm::Prim => "prim",
            GenAlgorithm::Fractal => "fractal",
            GenAlgorithm::Organic => "organic",
        }
    }
}

impl fmt::Display for GenAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenAlgorithm {
    type Err = EngineError;

    fn from_str(name: &str) -> Result<GenAlgorithm> {
        match name {
            "dfs" => Ok(GenAlgorithm::Dfs),
            "prim" => Ok(GenAlgorithm::Prim),
            "fractal" => Ok(GenAlgorithm::Fractal),
            "organic" => Ok(GenAlgorithm::Organic),
            other => Err(EngineError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Tuning knobs shared by all generators.
#[derive(Clone, Copy, Debug)]
pub struct GenOptions {
    /// Master RNG seed.
    pub seed: u64,
    /// Fraction of dead ends to knock out afterwards, in `[0, 1]`.
    pub braid: f64,
    /// Fractal block side. Dimensions that are not multiples are handled
    /// by clipped residual blocks.
    pub block_side: u32,
    /// Organic agent count. `None` derives `min(cells / 64, 16384)`.
    pub agents: Option<u32>,
}

impl Default for GenOptions {
    fn default() -> Self {
        GenOptions {
            seed: 0,
            braid: 0.0,
            block_side: 32,
            agents: None,
        }
    }
}

/// Runs `algo` over `grid`, then the braiding pass when requested.
///
/// The grid is taken exclusively for the duration; events are pushed into
/// `sink` as carving proceeds. Event order is reproducible for the serial
/// generators; the parallel pair guarantees a reproducible *final grid*
/// (their per-worker event buffers are drained in a fixed order, but the
/// assignment of work to streams is what carries the determinism).
pub fn generate(
    grid: &mut Grid,
    algo: GenAlgorithm,
    opts: &GenOptions,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<()> {
    if !(0.0..=1.0).contains(&opts.braid) {
        return Err(EngineError::InvalidOption(format!(
            "braid factor {} outside [0, 1]",
            opts.braid
        )));
    }

    match algo {
        GenAlgorithm::Dfs => {
            let mut master = rng::seeded(opts.seed);
            backtracker::carve(grid, &mut master, cancel, sink)?;
            braid::knock_out_dead_ends(grid, opts.braid, &mut master, cancel, sink)?;
        }
        GenAlgorithm::Prim => {
            let mut master = rng::seeded(opts.seed);
            prim::carve(grid, &mut master, cancel, sink)?;
            braid::knock_out_dead_ends(grid, opts.braid, &mut master, cancel, sink)?;
        }
        GenAlgorithm::Fractal => {
            fractal::carve(grid, opts.seed, opts.block_side, cancel, sink)?;
            let mut braid_rng = rng::stream(opts.seed, STREAM_BRAID);
            braid::knock_out_dead_ends(grid, opts.braid, &mut braid_rng, cancel, sink)?;
        }
        GenAlgorithm::Organic => {
            organic::carve(grid, opts.seed, opts.agents, cancel, sink)?;
            let mut braid_rng = rng::stream(opts.seed, STREAM_BRAID);
            braid::knock_out_dead_ends(grid, opts.braid, &mut braid_rng, cancel, sink)?;
        }
    }

    let census = metrics::census(grid);
    debug!(
        algo = %algo,
        seed = opts.seed,
        dead_ends = census.dead_ends,
        corridors = census.corridors,
        junctions = census.junctions,
        "generation finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_round_trip() {
        for algo in GenAlgorithm::ALL {
            assert_eq!(algo.as_str().parse::<GenAlgorithm>().unwrap(), algo);
        }
        assert!(matches!(
            "kruskal".parse::<GenAlgorithm>(),
            Err(EngineError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn braid_out_of_range_is_a_usage_error() {
        let mut grid = Grid::new(4, 4).unwrap();
        let opts = GenOptions {
            braid: 1.5,
            ..GenOptions::default()
        };
        let result = generate(
            &mut grid,
            GenAlgorithm::Dfs,
            &opts,
            &CancelToken::new(),
            &mut crate::events::NullSink,
        );
        assert!(matches!(result, Err(EngineError::InvalidOption(_))));
    }
}
