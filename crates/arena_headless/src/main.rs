//! Headless arena runner.
//!
//! Runs levels without graphics for scripted playthroughs, CI checks,
//! and determinism verification.
//!
//! # Usage
//!
//! ```bash
//! # Scripted playthrough of level 1
//! cargo run -p arena_headless -- run --level 1 --seed 42 --ticks 1000
//!
//! # Same run with an ASCII frame every 50 ticks
//! cargo run -p arena_headless -- run --level 3 --render-every 50
//!
//! # Verify determinism: same seed, several runs, identical hashes
//! cargo run -p arena_headless -- verify --level 5 --seed 12345 --runs 5
//!
//! # Print the campaign table
//! cargo run -p arena_headless -- levels
//! ```
//!
//! Logs go to stderr; results go to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use arena_core::prelude::*;

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless grid combat arena runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Optional RON stat file layered over the builtin templates
    #[arg(long, global = true)]
    stats: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one level with a scripted player
    Run {
        /// Campaign level to play (1-16)
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Maximum ticks before giving up
        #[arg(short, long, default_value = "2000")]
        ticks: u64,

        /// Print an ASCII frame every N ticks (0 = never)
        #[arg(long, default_value = "0")]
        render_every: u64,
    },

    /// Run the same seed several times and compare state hashes
    Verify {
        /// Campaign level to play (1-16)
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Ticks per run
        #[arg(short, long, default_value = "500")]
        ticks: u64,
    },

    /// Print the campaign level table
    Levels,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(log_level)
        .init();

    let stats = match load_stats(cli.stats.as_deref()) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Run {
            level,
            seed,
            ticks,
            render_every,
        } => cmd_run(&stats, level, seed, ticks, render_every),
        Commands::Verify {
            level,
            seed,
            runs,
            ticks,
        } => cmd_verify(&stats, level, seed, runs, ticks),
        Commands::Levels => cmd_levels(&stats),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_stats(path: Option<&std::path::Path>) -> Result<StatTable> {
    match path {
        None => Ok(StatTable::builtin()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| GameError::DataParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            StatTable::from_ron(&path.display().to_string(), &text)
        }
    }
}

/// The scripted player: cycle headings, throw a disc now and then.
fn scripted_direction(tick: u64) -> Direction {
    match (tick / 6) % 4 {
        0 => Direction::Right,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Up,
    }
}

fn cmd_run(stats: &StatTable, level: u32, seed: u64, ticks: u64, render_every: u64) -> Result<()> {
    let table = build_level_table(stats);
    let config = *table.get(level)?;
    let mut sim = Simulation::new(&config, stats, seed)?;
    let player = sim.player().id;

    println!(
        "level {} ({}, {} x {:?}), seed {seed}",
        config.level,
        config.arena.name(),
        config.enemy_count,
        config.enemy,
    );

    for t in 0..ticks {
        if !sim.outcome().in_progress() {
            break;
        }
        sim.set_direction(player, scripted_direction(t))?;
        if t % 17 == 0 {
            let _ = sim.throw_disc(player, scripted_direction(t), 2)?;
        }
        sim.tick();

        if render_every > 0 && sim.tick_count() % render_every == 0 {
            print!("{}", render_ascii(&sim));
        }
    }

    let p = sim.player();
    println!(
        "finished at tick {}: {:?} (player lives {}, xp {}, hash {:016x})",
        sim.tick_count(),
        sim.outcome(),
        p.lives,
        sim.progression().total_xp(),
        sim.state_hash(),
    );
    Ok(())
}

fn cmd_verify(stats: &StatTable, level: u32, seed: u64, runs: u32, ticks: u64) -> Result<()> {
    let table = build_level_table(stats);
    let config = *table.get(level)?;

    let mut reference: Option<u64> = None;
    for run in 1..=runs {
        let mut sim = Simulation::new(&config, stats, seed)?;
        let player = sim.player().id;
        for t in 0..ticks {
            if sim.outcome().in_progress() {
                sim.set_direction(player, scripted_direction(t))?;
            }
            sim.tick();
        }
        let hash = sim.state_hash();
        println!("run {run}: hash {hash:016x}");
        match reference {
            None => reference = Some(hash),
            Some(expected) if expected != hash => {
                println!("DIVERGED: run {run} differs from run 1");
                return Err(GameError::InvalidConfiguration(
                    "determinism verification failed".to_string(),
                ));
            }
            Some(_) => {}
        }
    }
    println!("determinism verified over {runs} runs");
    Ok(())
}

fn cmd_levels(stats: &StatTable) -> Result<()> {
    let table = build_level_table(stats);
    println!("level  chapter  arena             enemy       count  xp threshold");
    for c in table.iter() {
        println!(
            "{:>5}  {:>7}  {:<16}  {:<10}  {:>5}  {:>12}",
            c.level,
            c.chapter,
            c.arena.name(),
            format!("{:?}", c.enemy),
            c.enemy_count,
            c.xp_threshold,
        );
    }
    Ok(())
}

/// One-character-per-cell frame, entities and discs overlaid.
fn render_ascii(sim: &Simulation) -> String {
    let arena = sim.arena();
    let mut out = String::with_capacity((arena.width() as usize + 1) * arena.height() as usize);
    for y in 0..arena.height() {
        for x in 0..arena.width() {
            let pos = Position::new(x, y);
            let ch = if let Some(e) = sim
                .entities()
                .iter()
                .find(|e| e.alive && e.position == pos)
            {
                if e.is_player() {
                    '@'
                } else {
                    'E'
                }
            } else if sim
                .discs()
                .iter()
                .any(|d| d.is_in_flight() && d.position == pos)
            {
                'o'
            } else {
                match arena.cell_at(pos) {
                    Some(Cell::Empty) => '.',
                    Some(Cell::Wall) => '#',
                    Some(Cell::Obstacle) => '%',
                    Some(Cell::Trail { .. }) => '+',
                    Some(Cell::Void) | None => ' ',
                }
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out.push('\n');
    out
}
