//! Event-stream replay: recorded runs reproduce the recorded state.

mod common;

use common::{generated, open_edge_count, seeded};
use warren_core::{
    generate, replay, solve, CancelToken, Cell, Dir, EventLog, EventReader, EventSink, EventWriter,
    GenAlgorithm, GenOptions, Grid, SolveAlgorithm,
};

/// Serial generator events replayed onto a fresh all-walls grid rebuild
/// the exact walls and generator-visit flags.
#[test]
fn serial_generation_replays_byte_exact() {
    for algo in [GenAlgorithm::Dfs, GenAlgorithm::Prim] {
        let mut recorded = Grid::new(18, 14).unwrap();
        let mut log = EventLog::new();
        generate(
            &mut recorded,
            algo,
            &seeded(42),
            &CancelToken::new(),
            &mut log,
        )
        .unwrap();

        let mut rebuilt = Grid::new(18, 14).unwrap();
        rebuilt.fill_walls();
        replay(&mut rebuilt, log.events().iter().copied()).unwrap();

        assert_eq!(rebuilt.as_bytes(), recorded.as_bytes(), "{algo} replay diverged");
    }
}

/// Parallel generator events replay to the same *edges* (visit-flag
/// interleaving is not part of the parallel guarantee).
#[test]
fn parallel_generation_replays_same_edges() {
    for algo in [GenAlgorithm::Fractal, GenAlgorithm::Organic] {
        let opts = GenOptions {
            seed: 3,
            block_side: 16,
            agents: Some(8),
            ..GenOptions::default()
        };
        let mut recorded = Grid::new(32, 32).unwrap();
        let mut log = EventLog::new();
        generate(&mut recorded, algo, &opts, &CancelToken::new(), &mut log).unwrap();

        let mut rebuilt = Grid::new(32, 32).unwrap();
        rebuilt.fill_walls();
        replay(&mut rebuilt, log.events().iter().copied()).unwrap();

        for y in 0..32 {
            for x in 0..32 {
                for dir in [Dir::East, Dir::South] {
                    if rebuilt.neighbor(x, y, dir).is_some() {
                        assert_eq!(
                            recorded.has_wall(x, y, dir),
                            rebuilt.has_wall(x, y, dir),
                            "{algo} edge mismatch at ({x}, {y}) {dir:?}"
                        );
                    }
                }
            }
        }
        assert_eq!(open_edge_count(&recorded), open_edge_count(&rebuilt));
    }
}

/// Solver events replayed on top of the generated maze reproduce the
/// visit and path marks.
#[test]
fn solver_replay_reproduces_marks() {
    let mut grid = generated(20, 20, GenAlgorithm::Dfs, seeded(5));
    let pristine = grid.clone();

    let mut log = EventLog::new();
    let outcome = solve(
        &mut grid,
        SolveAlgorithm::Bfs,
        &CancelToken::new(),
        &mut log,
    )
    .unwrap();
    assert!(outcome.found);

    let mut rebuilt = pristine;
    replay(&mut rebuilt, log.events().iter().copied()).unwrap();
    assert_eq!(rebuilt.as_bytes(), grid.as_bytes());
}

/// Full pipeline through the binary log: write to a file, read back,
/// replay, compare.
#[test]
fn event_log_file_round_trip() {
    let mut path = std::env::temp_dir();
    path.push(format!("warren-test-{}-replay.events", std::process::id()));

    let mut recorded = Grid::new(12, 12).unwrap();
    {
        let mut writer = EventWriter::create(&path, true).unwrap();
        generate(
            &mut recorded,
            GenAlgorithm::Dfs,
            &seeded(8),
            &CancelToken::new(),
            &mut writer,
        )
        .unwrap();
        writer.finish().unwrap();
    }

    let mut reader = EventReader::open(&path).unwrap();
    let events = reader.read_to_end().unwrap();
    std::fs::remove_file(&path).ok();

    let mut rebuilt = Grid::new(12, 12).unwrap();
    rebuilt.fill_walls();
    replay(&mut rebuilt, events).unwrap();
    assert_eq!(rebuilt.as_bytes(), recorded.as_bytes());
}

/// A whole-grid ClearVisit event wipes solver flags during replay, so a
/// generate-then-solve log replays cleanly end to end.
#[test]
fn generate_then_solve_log_replays_end_to_end() {
    let mut grid = Grid::new(16, 16).unwrap();
    let mut log = EventLog::new();
    generate(
        &mut grid,
        GenAlgorithm::Dfs,
        &seeded(30),
        &CancelToken::new(),
        &mut log,
    )
    .unwrap();
    // Scribble a stray mark, then solve: the dispatch records the reset.
    grid.set_flag(3, 3, Cell::MARK_AUX, true);
    log.on_event(warren_core::Event::visit_aux(3, 3));
    solve(
        &mut grid,
        SolveAlgorithm::Tremaux,
        &CancelToken::new(),
        &mut log,
    )
    .unwrap();

    let mut rebuilt = Grid::new(16, 16).unwrap();
    rebuilt.fill_walls();
    replay(&mut rebuilt, log.events().iter().copied()).unwrap();
    assert_eq!(rebuilt.as_bytes(), grid.as_bytes());
}
