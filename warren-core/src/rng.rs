//! Deterministic seeded randomness.
//!
//! Every component that makes random choices (generators, the braider,
//! organic agents) draws from a Xoshiro256++ generator seeded from a single
//! `u64`. Reproducibility at a fixed seed is a hard requirement: the same
//! `(seed, width, height, algorithm, options)` tuple must always produce the
//! same final grid.
//!
//! Serial algorithms borrow one master stream. Data-parallel algorithms
//! derive one independent stream per unit of work (fractal block, organic
//! agent) with [`stream`], so the output does not depend on thread
//! scheduling.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The engine's PRNG. 64-bit seedable, 256-bit state, fast and splittable.
pub type MazeRng = Xoshiro256PlusPlus;

/// Weyl increment used to decorrelate derived stream seeds.
const STREAM_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// Creates the master stream for a run.
pub fn seeded(seed: u64) -> MazeRng {
    MazeRng::seed_from_u64(seed)
}

/// Derives the `index`-th sub-stream of `seed`.
///
/// `seed_from_u64` runs its input through SplitMix64, so distinct
/// `(seed, index)` pairs land on unrelated points of the state space. Used
/// by the parallel generators to give each block or agent its own stream.
pub fn stream(seed: u64, index: u64) -> MazeRng {
    MazeRng::seed_from_u64(seed.wrapping_add(index.wrapping_add(1).wrapping_mul(STREAM_GAMMA)))
}
