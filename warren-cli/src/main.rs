//! Command-line front-end for the warren maze engine.
//!
//! # Usage
//!
//! ```bash
//! # Generate a braided organic maze and persist it
//! warren generate --width 512 --height 512 --algo organic --seed 7 \
//!     --braid 0.2 --out big.maze
//!
//! # Solve it, recording the solver's event stream
//! warren solve big.maze --algo astar --record-events solve.events
//!
//! # Replay the events headlessly against the base maze
//! warren replay solve.events --maze big.maze
//!
//! # Time every generator and solver at 1000x1000
//! warren benchmark --size 1000
//! ```
//!
//! Exit codes: 0 success, 1 usage error, 2 I/O error, 3 the solver found
//! no path, 4 cancelled (Ctrl-C).

mod stats;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use warren_core::{
    analyze, apply_event, census, generate, load_maze, save_maze, solve, write_maze, CancelToken,
    EngineError, EventReader, EventSink, EventWriter, GenAlgorithm, GenOptions, Grid, Metadata,
    NullSink, SolveAlgorithm,
};

#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Generate, solve and replay grid mazes", version)]
struct Cli {
    /// Verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new maze
    Generate {
        /// Maze width in cells
        #[arg(long, default_value_t = 100)]
        width: u32,

        /// Maze height in cells
        #[arg(long, default_value_t = 100)]
        height: u32,

        /// Generation algorithm
        #[arg(long, default_value = "dfs")]
        algo: GenAlgorithm,

        /// Random seed
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Fraction of dead ends to remove, 0.0..=1.0
        #[arg(long, default_value_t = 0.0)]
        braid: f64,

        /// Fractal block side
        #[arg(long, default_value_t = 32)]
        block_side: u32,

        /// Organic agent count (default scales with the grid)
        #[arg(long)]
        agents: Option<u32>,

        /// Output .maze file
        #[arg(long)]
        out: Option<PathBuf>,

        /// Record carve events to a .events file
        #[arg(long)]
        record_events: Option<PathBuf>,

        /// Force zlib compression of the output regardless of size
        #[arg(long)]
        compress: bool,
    },

    /// Solve an existing maze
    Solve {
        /// Input .maze file
        input: PathBuf,

        /// Solver algorithm
        #[arg(long, default_value = "bfs")]
        algo: SolveAlgorithm,

        /// Record solver events to a .events file
        #[arg(long)]
        record_events: Option<PathBuf>,
    },

    /// Replay an event log headlessly and report the final grid state
    Replay {
        /// Input .events file
        events: PathBuf,

        /// Base maze to apply the events to (fresh all-walls grid otherwise)
        #[arg(long)]
        maze: Option<PathBuf>,

        /// Grid width when no base maze is given
        #[arg(long)]
        width: Option<u32>,

        /// Grid height when no base maze is given
        #[arg(long)]
        height: Option<u32>,

        /// Persist the replayed grid to a .maze file
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run every generator and solver at NxN and print a timing table
    Benchmark {
        /// Side length of the benchmark grid
        #[arg(long, default_value_t = 1000)]
        size: u32,

        /// Random seed shared by all runs
        #[arg(long, default_value_t = 123)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(1);
        }
    };

    init_logging(cli.verbose);

    let cancel = CancelToken::new();
    let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, cancel.as_flag());

    match run(cli.command, &cancel) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("warren: {err}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn exit_code_for(err: &EngineError) -> u8 {
    match err {
        EngineError::InvalidDimensions { .. }
        | EngineError::InvalidOption(_)
        | EngineError::UnknownAlgorithm(_)
        | EngineError::OutOfBounds { .. }
        | EngineError::InvariantViolation(_) => 1,
        EngineError::Io(_)
        | EngineError::BadMagic { .. }
        | EngineError::UnsupportedVersion(_)
        | EngineError::Corrupt(_) => 2,
        EngineError::Cancelled => 4,
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command, cancel: &CancelToken) -> Result<ExitCode, EngineError> {
    match command {
        Command::Generate {
            width,
            height,
            algo,
            seed,
            braid,
            block_side,
            agents,
            out,
            record_events,
            compress,
        } => cmd_generate(
            width,
            height,
            algo,
            GenOptions {
                seed,
                braid,
                block_side,
                agents,
            },
            out.as_deref(),
            record_events.as_deref(),
            compress,
            cancel,
        ),
        Command::Solve {
            input,
            algo,
            record_events,
        } => cmd_solve(&input, algo, record_events.as_deref(), cancel),
        Command::Replay {
            events,
            maze,
            width,
            height,
            out,
        } => cmd_replay(&events, maze.as_deref(), width, height, out.as_deref(), cancel),
        Command::Benchmark { size, seed } => cmd_benchmark(size, seed, cancel),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    width: u32,
    height: u32,
    algo: GenAlgorithm,
    opts: GenOptions,
    out: Option<&Path>,
    record_events: Option<&Path>,
    compress: bool,
    cancel: &CancelToken,
) -> Result<ExitCode, EngineError> {
    info!("generating {width}x{height} maze with {algo}, seed {}", opts.seed);
    let mut grid = Grid::new(width, height)?;

    let mut writer = match record_events {
        Some(path) => Some(EventWriter::create(path, false)?),
        None => None,
    };
    let mut null = NullSink;

    let started = Instant::now();
    {
        let sink: &mut dyn EventSink = match writer.as_mut() {
            Some(w) => w,
            None => &mut null,
        };
        generate(&mut grid, algo, &opts, cancel, sink)?;
    }
    info!("generated in {:.3}s", started.elapsed().as_secs_f64());

    if let (Some(writer), Some(path)) = (writer, record_events) {
        writer.finish()?;
        debug!("event log written to {}", path.display());
    }

    if let Some(path) = out {
        let mut meta = Metadata::new();
        meta.insert("algo", algo)?;
        meta.insert("seed", opts.seed)?;
        if opts.braid > 0.0 {
            meta.insert("braid", opts.braid)?;
        }
        if compress {
            let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
            write_maze(&mut file, &grid, &meta, true)?;
        } else {
            save_maze(path, &grid, &meta)?;
        }
        info!("maze written to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_solve(
    input: &Path,
    algo: SolveAlgorithm,
    record_events: Option<&Path>,
    cancel: &CancelToken,
) -> Result<ExitCode, EngineError> {
    let loaded = load_maze(input)?;
    let mut grid = loaded.grid;
    info!(
        "loaded {}x{} maze from {}",
        grid.width(),
        grid.height(),
        input.display()
    );
    if let Some(gen_algo) = loaded.meta.get("algo") {
        debug!("maze metadata: algo={gen_algo}");
    }

    let mut writer = match record_events {
        Some(path) => Some(EventWriter::create(path, false)?),
        None => None,
    };
    let mut null = NullSink;

    let started = Instant::now();
    let outcome = {
        let sink: &mut dyn EventSink = match writer.as_mut() {
            Some(w) => w,
            None => &mut null,
        };
        solve(&mut grid, algo, cancel, sink)?
    };
    let elapsed = started.elapsed();

    if let Some(writer) = writer {
        writer.finish()?;
    }

    if !outcome.found {
        eprintln!(
            "warren: {algo} found no path ({} cells visited)",
            outcome.visited_count
        );
        return Ok(ExitCode::from(3));
    }

    println!(
        "{algo}: path length {}, visited {} cells in {:.3}s",
        outcome.path.len(),
        outcome.visited_count,
        elapsed.as_secs_f64()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_replay(
    events: &Path,
    maze: Option<&Path>,
    width: Option<u32>,
    height: Option<u32>,
    out: Option<&Path>,
    cancel: &CancelToken,
) -> Result<ExitCode, EngineError> {
    let mut grid = match (maze, width, height) {
        (Some(path), _, _) => {
            let loaded = load_maze(path)?;
            info!(
                "replaying onto {}x{} base maze",
                loaded.grid.width(),
                loaded.grid.height()
            );
            loaded.grid
        }
        (None, Some(w), Some(h)) => {
            let mut grid = Grid::new(w, h)?;
            grid.fill_walls();
            grid
        }
        _ => {
            return Err(EngineError::InvalidOption(
                "replay needs --maze, or --width and --height for a fresh grid".to_string(),
            ))
        }
    };

    let mut reader = EventReader::open(events)?;
    let mut applied = 0u64;
    while let Some(event) = reader.next_event()? {
        cancel.check()?;
        apply_event(&mut grid, event)?;
        applied += 1;
    }

    let tally = census(&grid);
    println!(
        "replayed {applied} events onto {}x{} grid: {} dead ends, {} corridors, {} junctions",
        grid.width(),
        grid.height(),
        tally.dead_ends,
        tally.corridors,
        tally.junctions
    );

    if let Some(path) = out {
        save_maze(path, &grid, &Metadata::new())?;
        info!("replayed grid written to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_benchmark(size: u32, seed: u64, cancel: &CancelToken) -> Result<ExitCode, EngineError> {
    info!("benchmarking all algorithms at {size}x{size}, seed {seed}");

    let mut gen_rows = Vec::new();
    for algo in GenAlgorithm::ALL {
        let mut grid = Grid::new(size, size)?;
        let opts = GenOptions {
            seed,
            ..GenOptions::default()
        };
        let started = Instant::now();
        generate(&mut grid, algo, &opts, cancel, &mut NullSink)?;
        let time = started.elapsed();

        let report = analyze(&grid, cancel)?;
        gen_rows.push(stats::GenRow {
            name: algo.as_str(),
            time,
            dead_ends: report.dead_ends,
            branching: report.branching_factor,
        });
    }
    stats::print_generator_table(size, &gen_rows);

    // All solvers run against the same dfs maze; solve() resets the
    // solver flags between runs.
    let mut grid = Grid::new(size, size)?;
    generate(
        &mut grid,
        GenAlgorithm::Dfs,
        &GenOptions {
            seed,
            ..GenOptions::default()
        },
        cancel,
        &mut NullSink,
    )?;

    let mut solve_rows = Vec::new();
    for algo in SolveAlgorithm::ALL {
        let started = Instant::now();
        let outcome = solve(&mut grid, algo, cancel, &mut NullSink)?;
        solve_rows.push(stats::SolveRow {
            name: algo.as_str(),
            time: started.elapsed(),
            found: outcome.found,
            path_len: outcome.path.len(),
            visited: outcome.visited_count,
        });
    }
    stats::print_solver_table(size, &solve_rows);

    Ok(ExitCode::SUCCESS)
}
