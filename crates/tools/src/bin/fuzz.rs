use std::io;

use anyhow::Result;
use clap::Parser;
use pathpilot_core::{AutoPlay, EngineConfig, HostileId, StopReason, WorldView};
use pathpilot_tools::Scenario;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of generated scenarios to play through
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    #[arg(short, long, default_value_t = 1000)]
    ticks: u32,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let config = EngineConfig::default();
    let mut completed = 0;

    for run in 0..args.runs {
        let scenario_seed = rng.next_u64();
        let cols = choose(&mut rng, &[6, 12, 20, 32]);
        let rows = choose(&mut rng, &[6, 10, 16]);
        let levels = choose(&mut rng, &[1, 2, 3]);
        let scenario = Scenario::generate_levels(scenario_seed, cols, rows, levels);
        let mut sim = scenario.simulation(scenario_seed, config)?;
        let mut driver = AutoPlay::new(config);
        driver.start(&sim);

        let mut defeated: Vec<HostileId> = Vec::new();
        for _ in 0..args.ticks {
            let before = sim.agent().pos;
            let level_before = sim.level_index();
            let result = driver.tick(&mut sim);
            let level_changed = sim.level_index() != level_before;
            if level_changed {
                assert_eq!(
                    sim.level_index(),
                    level_before + 1,
                    "Invariant failed: skipped a level"
                );
                defeated.clear();
            }

            // Assert invariants
            let agent = sim.agent();
            assert!(!sim.level().grid.is_wall(agent.pos), "Invariant failed: agent inside wall");
            assert!(
                level_changed || agent.pos.chebyshev(before) <= 1,
                "Invariant failed: agent skipped a cell"
            );
            assert!(agent.health <= config.max_health, "Invariant failed: health above max");
            assert!(
                agent.health >= 0.0 && agent.energy >= 0.0,
                "Invariant failed: negative vitals"
            );
            for hostile in sim.level().hostiles.values() {
                if defeated.contains(&hostile.id) {
                    assert!(hostile.defeated, "Invariant failed: hostile resurrected");
                } else if hostile.defeated {
                    defeated.push(hostile.id);
                }
            }

            match result.stop_reason {
                Some(StopReason::AllLevelsCompleted) => {
                    assert!(
                        !sim.level().any_hostile_alive() && sim.levels_remaining() == 0,
                        "Invariant failed: completed early"
                    );
                    completed += 1;
                    break;
                }
                Some(StopReason::AgentDown) => {
                    assert!(sim.snapshot().agent.is_down(), "Invariant failed: phantom knockout");
                    break;
                }
                Some(_) => break,
                None => {}
            }
        }
        info!(run, scenario_seed, hash = sim.snapshot_hash(), "run finished");
    }

    println!(
        "Fuzzing completed successfully ({completed} of {} runs cleared every level).",
        args.runs
    );
    Ok(())
}
