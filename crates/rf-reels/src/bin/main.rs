//! reelsim — headless spin-cycle simulator
//!
//! Runs a configurable number of spin cycles against a fixed-timestep frame
//! loop and reports per-spin outcomes and session statistics. Useful for
//! tuning choreography timing without a renderer attached.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use rf_reels::{
    AudioBus, MachineConfig, REEL_SPIN_CUE, Services, SlotMachine, SpinTiming, SymbolSet, WIN_CUE,
};

/// Hard cap per cycle so a misconfigured timeline cannot hang the loop
const MAX_CYCLE_MS: f64 = 120_000.0;

#[derive(Parser, Debug)]
#[command(name = "reelsim", about = "Headless slot spin simulator")]
struct Args {
    /// Number of spin cycles to run
    #[arg(long, default_value_t = 10)]
    spins: u32,

    /// Seed for reproducible outcomes
    #[arg(long)]
    seed: Option<u64>,

    /// Use turbo choreography timing
    #[arg(long)]
    turbo: bool,

    /// Fixed frame step in milliseconds
    #[arg(long, default_value_t = 16.0)]
    tick_ms: f64,

    /// Machine configuration as JSON (overrides the defaults)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<MachineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => MachineConfig::normal(),
    };
    if args.turbo {
        config.timing = SpinTiming::turbo();
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let audio = Arc::new(AudioBus::new());
    audio.add(REEL_SPIN_CUE);
    audio.add(WIN_CUE);

    let services = Services {
        audio: audio.clone(),
        ..Services::headless()
    };

    let mut machine = SlotMachine::new(config, SymbolSet::standard(), services)?;
    if let Some(seed) = args.seed {
        machine.seed(seed);
        info!("seeded session with {seed}");
    }

    for cycle in 1..=args.spins {
        let wins_before = machine.stats().wins;
        machine.spin();

        let mut elapsed = 0.0;
        while machine.is_spinning() {
            machine.update(args.tick_ms);
            elapsed += args.tick_ms;
            if elapsed > MAX_CYCLE_MS {
                warn!("cycle {cycle} exceeded {MAX_CYCLE_MS}ms, aborting session");
                machine.destroy();
                return Ok(());
            }
        }

        // Let deceleration, settle eases and the win display window drain
        // before the next cycle.
        while machine.pending_timers() > 0
            || machine.reels().iter().any(|r| r.speed() > 0.0 || r.is_settling())
        {
            machine.update(args.tick_ms);
            elapsed += args.tick_ms;
            if elapsed > MAX_CYCLE_MS {
                warn!("cycle {cycle} never settled, aborting session");
                machine.destroy();
                return Ok(());
            }
        }

        let won = machine.stats().wins > wins_before;
        info!(
            "spin {cycle}/{}: {} after {:.0}ms",
            args.spins,
            if won { "WIN" } else { "no win" },
            elapsed
        );
    }

    let stats = machine.stats();
    info!(
        "session complete: {} spins, {} wins, hit rate {:.1}%",
        stats.total_spins,
        stats.wins,
        stats.hit_rate()
    );
    machine.destroy();
    Ok(())
}
