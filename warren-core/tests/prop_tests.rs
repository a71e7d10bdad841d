//! Property-based sweeps over dimensions, seeds and braid factors.

mod common;

use common::{assert_wall_symmetry, generated, is_connected, open_edge_count};
use proptest::prelude::*;
use warren_core::{
    read_maze, solve, write_maze, CancelToken, GenAlgorithm, GenOptions, Metadata, NullSink,
    SolveAlgorithm,
};

proptest! {
    /// Serial generators produce connected spanning trees with symmetric
    /// walls at any size and seed.
    #[test]
    fn prop_serial_generators_build_trees(
        w in 2u32..24,
        h in 2u32..24,
        seed in any::<u64>(),
        serial_algo in prop_oneof![Just(GenAlgorithm::Dfs), Just(GenAlgorithm::Prim)],
    ) {
        let grid = generated(w, h, serial_algo, GenOptions { seed, ..GenOptions::default() });
        assert_wall_symmetry(&grid);
        prop_assert!(is_connected(&grid));
        prop_assert_eq!(open_edge_count(&grid), u64::from(w) * u64::from(h) - 1);
    }

    /// The parallel generators hold the same invariants, including odd
    /// shapes that force residual fractal blocks.
    #[test]
    fn prop_parallel_generators_build_trees(
        w in 2u32..40,
        h in 2u32..40,
        seed in any::<u64>(),
        block_side in 2u32..12,
    ) {
        let fractal = generated(w, h, GenAlgorithm::Fractal, GenOptions {
            seed,
            block_side,
            ..GenOptions::default()
        });
        assert_wall_symmetry(&fractal);
        prop_assert!(is_connected(&fractal));
        prop_assert_eq!(open_edge_count(&fractal), u64::from(w) * u64::from(h) - 1);

        let organic = generated(w, h, GenAlgorithm::Organic, GenOptions {
            seed,
            agents: Some(4),
            ..GenOptions::default()
        });
        assert_wall_symmetry(&organic);
        prop_assert!(is_connected(&organic));
        prop_assert_eq!(open_edge_count(&organic), u64::from(w) * u64::from(h) - 1);
    }

    /// Braiding keeps connectivity and symmetry at any factor.
    #[test]
    fn prop_braiding_preserves_connectivity(
        seed in any::<u64>(),
        braid in 0.0f64..=1.0,
    ) {
        let grid = generated(12, 12, GenAlgorithm::Dfs, GenOptions {
            seed,
            braid,
            ..GenOptions::default()
        });
        assert_wall_symmetry(&grid);
        prop_assert!(is_connected(&grid));
        // Braiding only opens walls, never closes them.
        prop_assert!(open_edge_count(&grid) >= 12 * 12 - 1);
    }

    /// The optimal solvers agree with BFS on arbitrary perfect mazes.
    #[test]
    fn prop_optimal_solvers_agree(
        w in 2u32..20,
        h in 2u32..20,
        seed in any::<u64>(),
    ) {
        let mut grid = generated(w, h, GenAlgorithm::Dfs, GenOptions { seed, ..GenOptions::default() });
        let cancel = CancelToken::new();

        let shortest = solve(&mut grid, SolveAlgorithm::Bfs, &cancel, &mut NullSink)
            .unwrap()
            .path
            .len();
        for algo in SolveAlgorithm::ALL.into_iter().filter(|a| a.claims_optimality()) {
            let outcome = solve(&mut grid, algo, &cancel, &mut NullSink).unwrap();
            prop_assert!(outcome.found);
            prop_assert_eq!(outcome.path.len(), shortest);
        }
    }

    /// Serialization round-trips arbitrary generated grids bit-for-bit,
    /// compressed or not.
    #[test]
    fn prop_maze_files_round_trip(
        w in 2u32..32,
        h in 2u32..32,
        seed in any::<u64>(),
        compress in any::<bool>(),
    ) {
        let grid = generated(w, h, GenAlgorithm::Prim, GenOptions { seed, ..GenOptions::default() });
        let mut bytes = Vec::new();
        write_maze(&mut bytes, &grid, &Metadata::new(), compress).unwrap();
        let loaded = read_maze(&mut &bytes[..]).unwrap();
        prop_assert_eq!(loaded.grid.as_bytes(), grid.as_bytes());
    }
}
