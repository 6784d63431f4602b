use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pathpilot_core::{AutoPlay, EngineConfig, Pos, RunResult};
use pathpilot_tools::Scenario;
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario JSON file; a random one is generated from the seed when omitted
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,
    /// Engine tuning TOML file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 24)]
    cols: usize,
    #[arg(long, default_value_t = 16)]
    rows: usize,
    /// Number of generated levels played back to back
    #[arg(long, default_value_t = 1)]
    levels: usize,
    #[arg(short, long, default_value_t = 1000)]
    ticks: u32,
    #[arg(short, long, value_enum, default_value = "auto")]
    command: Command,
    /// Target cell for `--command go-to`, as `X,Y`
    #[arg(long, value_name = "X,Y", value_parser = parse_cell)]
    target: Option<Pos>,
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Command {
    /// Continuous autoplay until nothing is left to do
    Auto,
    /// Walk to the nearest live hostile and stop
    Attack,
    /// Walk to the nearest recovery item and stop
    Recover,
    /// Walk to `--target` and stop
    GoTo,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    result: RunResult,
    level_index: usize,
    final_pos: Pos,
    health: f32,
    energy: f32,
    hostiles_left: usize,
    snapshot_hash: u64,
}

fn parse_cell(text: &str) -> Result<Pos, String> {
    let (x, y) = text.split_once(',').ok_or_else(|| format!("expected X,Y, got {text:?}"))?;
    let x = x.trim().parse().map_err(|err| format!("bad X in {text:?}: {err}"))?;
    let y = y.trim().parse().map_err(|err| format!("bad Y in {text:?}: {err}"))?;
    Ok(Pos::new(x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::generate_levels(args.seed, args.cols, args.rows, args.levels),
    };
    let mut sim = scenario.simulation(args.seed, config)?;
    let mut driver = AutoPlay::new(config);
    let started = match args.command {
        Command::Auto => {
            let state = driver.start(&sim);
            info!(?state, "autoplay started");
            driver.is_active()
        }
        Command::Attack => driver.attack_nearest_threat(&sim),
        Command::Recover => driver.take_nearest_recovery(&sim),
        Command::GoTo => {
            let Some(target) = args.target else {
                bail!("--command go-to needs --target X,Y");
            };
            driver.go_to(&sim, target)
        }
    };
    if !started {
        info!("no route for the requested command");
    }

    let result = driver.run(&mut sim, args.ticks);
    info!(ticks = result.ticks, steps = result.steps, stop = ?result.stop_reason, "run finished");

    let report = Report {
        seed: args.seed,
        result,
        level_index: sim.level_index(),
        final_pos: sim.agent().pos,
        health: sim.agent().health,
        energy: sim.agent().energy,
        hostiles_left: sim.level().live_hostiles().count(),
        snapshot_hash: sim.snapshot_hash(),
    };
    match args.format {
        OutputFormat::Summary => {
            println!("Run complete.");
            println!(
                "Stop: {:?} after {} ticks ({} steps)",
                result.stop_reason, result.ticks, result.steps
            );
            println!(
                "Agent: ({}, {}) health {} energy {:.2}",
                report.final_pos.x, report.final_pos.y, report.health, report.energy
            );
            println!("Level: {} ({} queued)", report.level_index + 1, sim.levels_remaining());
            println!("Hostiles left: {}", report.hostiles_left);
            println!("Snapshot Hash: {}", report.snapshot_hash);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
        }
    }

    Ok(())
}
