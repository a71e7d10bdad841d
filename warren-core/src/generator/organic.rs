//! Multi-agent organic generator ("organic").
//!
//! A population of carving agents advances in lockstep *ticks*. Per tick:
//!
//! 1. Dead agents respawn onto unvisited cells that border the carved
//!    region, carving the attachment wall as they land.
//! 2. Every live agent proposes a move: it filters its neighbors for
//!    unvisited cells and draws one uniformly from its own RNG stream.
//!    The propose phase runs in parallel against the tick-start grid.
//! 3. Claims are resolved sequentially in agent-index order: a claim
//!    succeeds iff the destination is still unvisited, and the winning
//!    agent carves the wall and moves. An agent whose claim fails, or
//!    that had no unvisited neighbor, is killed and queued for respawn.
//!
//! Because proposals read a frozen grid and resolution is a fixed
//! sequential order, tick movements are serializable and the final grid
//! is byte-for-byte reproducible for a given `(seed, dimensions, agent
//! count)` — scheduling never decides a contended cell, the agent index
//! does.
//!
//! Connectivity: agent 0 starts on the entrance, and every other visit
//! happens in the same step as a carve to an already-visited cell (move,
//! respawn attachment, or the final frontier sweep). By induction the
//! carved graph stays connected. Respawn sites are found by bounded
//! rejection probes; once probing starves — the unvisited remnant is tiny
//! or fenced off — a deterministic frontier sweep attaches every remaining
//! cell and the run terminates.
//!
//! The texture is the inverse of the backtracker's: high branching, short
//! dead ends, no long rivers.

use std::collections::VecDeque;

use rand::Rng;
use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::error::{EngineError, Result};
use crate::events::{Event, EventSink};
use crate::grid::{Cell, Dir, Grid};
use crate::rng::{self, MazeRng};

/// Sub-stream index of the respawn sampler.
const STREAM_RESPAWN: u64 = 0;

/// Rejection probes per dead agent per tick before giving up.
const RESPAWN_PROBES: u32 = 32;

/// Default population for a grid of `cells` cells.
pub fn default_agent_count(cells: u64) -> u32 {
    (cells / 64).clamp(1, 16_384) as u32
}

struct Agent {
    x: u32,
    y: u32,
    alive: bool,
    rng: MazeRng,
}

/// Carves a perfect maze with a parallel agent population.
pub fn carve(
    grid: &mut Grid,
    seed: u64,
    agents: Option<u32>,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<()> {
    grid.fill_walls();

    let cells = grid.len();
    let count = agents.unwrap_or_else(|| default_agent_count(cells)).max(1) as usize;

    let (sx, sy) = grid.start();
    grid.set_flag(sx, sy, Cell::VISITED_GEN, true);
    let mut unvisited = cells - 1;

    let mut population: Vec<Agent> = (0..count)
        .map(|i| Agent {
            x: sx,
            y: sy,
            alive: i == 0,
            rng: rng::stream(seed, 1 + i as u64),
        })
        .collect();
    let mut respawn_rng = rng::stream(seed, STREAM_RESPAWN);
    let mut proposals: Vec<Option<Dir>> = Vec::with_capacity(count);

    while unvisited > 0 {
        cancel.check()?;
        let mut progress = false;

        // Respawn phase: sequential, in agent order, so the shared
        // respawn stream is consumed deterministically.
        let mut alive = population.iter().filter(|a| a.alive).count() as u64;
        for agent in population.iter_mut() {
            if agent.alive {
                continue;
            }
            if unvisited <= alive {
                break; // endgame: shrink the population instead
            }
            if let Some((x, y, dir)) = probe_spawn(grid, &mut respawn_rng) {
                grid.set_flag(x, y, Cell::VISITED_GEN, true);
                grid.carve(x, y, dir)?;
                sink.on_event(Event::carve(x, y, dir));
                unvisited -= 1;
                alive += 1;
                progress = true;
                agent.x = x;
                agent.y = y;
                agent.alive = true;
            }
        }

        // Propose phase: parallel, each agent against the tick-start grid
        // with its own stream.
        {
            let view: &Grid = grid;
            population
                .par_iter_mut()
                .map(|agent| {
                    if !agent.alive {
                        return None;
                    }
                    let mut candidates = [Dir::North; 4];
                    let mut n = 0;
                    for (nx, ny, dir) in view.neighbors(agent.x, agent.y) {
                        if !view.cell(nx, ny).visited_gen() {
                            candidates[n] = dir;
                            n += 1;
                        }
                    }
                    if n == 0 {
                        None
                    } else {
                        Some(candidates[agent.rng.random_range(0..n)])
                    }
                })
                .collect_into_vec(&mut proposals);
        }

        // Resolve phase: sequential in agent order; the claim is
        // check-then-set on VISITED_GEN, lowest index wins.
        for (agent, proposal) in population.iter_mut().zip(&proposals) {
            if !agent.alive {
                continue;
            }
            let Some(dir) = *proposal else {
                agent.alive = false;
                continue;
            };
            let (nx, ny) = grid
                .neighbor(agent.x, agent.y, dir)
                .ok_or(EngineError::InvariantViolation(
                    "agent proposed a move off the grid",
                ))?;
            if grid.cell(nx, ny).visited_gen() {
                agent.alive = false; // lost the claim this tick
                continue;
            }
            grid.set_flag(nx, ny, Cell::VISITED_GEN, true);
            grid.carve(agent.x, agent.y, dir)?;
            sink.on_event(Event::carve(agent.x, agent.y, dir));
            agent.x = nx;
            agent.y = ny;
            unvisited -= 1;
            progress = true;
        }

        if !progress {
            unvisited = frontier_sweep(grid, unvisited, cancel, sink)?;
        }
    }

    Ok(())
}

/// Rejection-samples an unvisited cell with a visited neighbor. Returns
/// the cell and the direction of the attachment carve.
fn probe_spawn(grid: &Grid, rng: &mut MazeRng) -> Option<(u32, u32, Dir)> {
    for _ in 0..RESPAWN_PROBES {
        let x = rng.random_range(0..grid.width());
        let y = rng.random_range(0..grid.height());
        if grid.cell(x, y).visited_gen() {
            continue;
        }
        let spin = rng.random_range(0..4) as usize;
        for k in 0..4 {
            let dir = Dir::ORDER[(spin + k) % 4];
            if let Some((nx, ny)) = grid.neighbor(x, y, dir) {
                if grid.cell(nx, ny).visited_gen() {
                    return Some((x, y, dir));
                }
            }
        }
    }
    None
}

/// Attaches every remaining unvisited cell to the carved region with a
/// deterministic flood fill. Returns the new unvisited count (always 0 —
/// the lattice itself is connected).
fn frontier_sweep(
    grid: &mut Grid,
    mut unvisited: u64,
    cancel: &CancelToken,
    sink: &mut dyn EventSink,
) -> Result<u64> {
    let mut queue: VecDeque<(u32, u32, Dir)> = VecDeque::new();

    for y in 0..grid.height() {
        cancel.check()?;
        for x in 0..grid.width() {
            if grid.cell(x, y).visited_gen() {
                continue;
            }
            for dir in Dir::ORDER {
                if let Some((nx, ny)) = grid.neighbor(x, y, dir) {
                    if grid.cell(nx, ny).visited_gen() {
                        queue.push_back((x, y, dir));
                        break;
                    }
                }
            }
        }
    }

    while let Some((x, y, dir)) = queue.pop_front() {
        cancel.check()?;
        if grid.cell(x, y).visited_gen() {
            continue;
        }
        grid.set_flag(x, y, Cell::VISITED_GEN, true);
        grid.carve(x, y, dir)?;
        sink.on_event(Event::carve(x, y, dir));
        unvisited -= 1;

        for (nx, ny, toward) in grid.neighbors(x, y) {
            if !grid.cell(nx, ny).visited_gen() {
                queue.push_back((nx, ny, toward.opposite()));
            }
        }
    }

    Ok(unvisited)
}
