//! Benchmark table formatting.
//!
//! The `benchmark` subcommand times every generator and solver at a given
//! size and prints two aligned tables. Formatting only — the timing loops
//! live in `main.rs`.

use std::time::Duration;

/// One generator timing row.
#[derive(Debug, Clone)]
pub struct GenRow {
    /// Generator name.
    pub name: &'static str,
    /// Wall-clock generation time.
    pub time: Duration,
    /// Dead ends in the produced maze.
    pub dead_ends: u64,
    /// Mean branching factor of the produced maze.
    pub branching: f64,
}

/// One solver timing row.
#[derive(Debug, Clone)]
pub struct SolveRow {
    /// Solver name.
    pub name: &'static str,
    /// Wall-clock solve time.
    pub time: Duration,
    /// Whether a path was found.
    pub found: bool,
    /// Length of the reported path in cells.
    pub path_len: usize,
    /// Cells the solver marked.
    pub visited: u64,
}

/// Prints the generator table.
pub fn print_generator_table(size: u32, rows: &[GenRow]) {
    println!();
    println!("Generators at {size}x{size}");
    println!(
        "{:<10} | {:>10} | {:>11} | {:>9}",
        "ALGORITHM", "TIME", "DEAD ENDS", "BRANCHING"
    );
    println!("{}", "-".repeat(49));
    for row in rows {
        println!(
            "{:<10} | {:>10} | {:>11} | {:>9.3}",
            row.name,
            format_duration(row.time),
            group_digits(row.dead_ends),
            row.branching,
        );
    }
}

/// Prints the solver table.
pub fn print_solver_table(size: u32, rows: &[SolveRow]) {
    println!();
    println!("Solvers at {size}x{size} (dfs maze)");
    println!(
        "{:<10} | {:>10} | {:>6} | {:>11} | {:>11}",
        "ALGORITHM", "TIME", "FOUND", "PATH", "VISITED"
    );
    println!("{}", "-".repeat(60));
    for row in rows {
        println!(
            "{:<10} | {:>10} | {:>6} | {:>11} | {:>11}",
            row.name,
            format_duration(row.time),
            if row.found { "yes" } else { "no" },
            group_digits(row.path_len as u64),
            group_digits(row.visited),
        );
    }
}

/// Renders a duration as `µs`, `ms` or `s` with one decimal.
pub fn format_duration(d: Duration) -> String {
    let micros = d.as_secs_f64() * 1e6;
    if micros < 1_000.0 {
        format!("{micros:.1}µs")
    } else if micros < 1_000_000.0 {
        format!("{:.1}ms", micros / 1e3)
    } else {
        format!("{:.2}s", micros / 1e6)
    }
}

/// Formats a count with thousands separators.
///
/// The table columns exist to compare path lengths and visit counts
/// across solvers, so counts stay exact — a 4e8-cell grid caps every
/// column at eleven digits and no approximate suffix scale is needed.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
