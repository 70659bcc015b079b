#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that places a tower layout and runs Bulwark waves.

mod layout_transfer;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use bulwark_core::{Event, GamePhase, GameSpeed};
use bulwark_simulation::{SessionConfig, Simulation};
use clap::Parser;
use layout_transfer::TowerLayout;
use log::{info, LevelFilter};

/// Command-line arguments of the headless runner.
#[derive(Debug, Parser)]
#[clap(name = "bulwark", about = "Runs Bulwark tower-defence waves without a display")]
struct Opt {
    /// TOML file holding the session configuration.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Seed overriding the configured one.
    #[clap(long)]
    seed: Option<u64>,

    /// Number of waves to clear before stopping.
    #[clap(long, default_value_t = 1)]
    waves: u32,

    /// Game speed multiplier: 1, 2 or 4.
    #[clap(long, default_value_t = 1)]
    speed: u32,

    /// Starts each wave automatically after the previous one clears.
    #[clap(long)]
    auto_wave: bool,

    /// Enables the passive upgrade sweep on every placed tower.
    #[clap(long)]
    auto_upgrade: bool,

    /// Tower layout transfer string placed before the first wave.
    #[clap(long)]
    layout: Option<String>,

    /// Prints the final tower layout as a transfer string.
    #[clap(long)]
    export_layout: bool,

    /// Real time fed to the simulation per frame, in milliseconds.
    #[clap(long, default_value_t = 16)]
    frame_ms: u64,

    /// Upper bound on simulated frames before giving up.
    #[clap(long, default_value_t = 1_000_000)]
    max_frames: u64,

    /// Raises log verbosity; repeat for more detail.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Totals gathered from the event stream of a run.
#[derive(Debug, Default)]
struct Tally {
    cleared: u32,
    kills: u32,
    bounty: u32,
    leaks: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::WaveCleared { .. } => self.cleared += 1,
                Event::EnemyKilled { bounty, .. } => {
                    self.kills += 1;
                    self.bounty += bounty;
                }
                Event::EnemyLeaked { .. } => self.leaks += 1,
                _ => {}
            }
        }
    }
}

/// Entry point for the Bulwark command-line interface.
fn main() -> Result<()> {
    let opt = Opt::parse();
    env_logger::Builder::new()
        .filter_level(log_level(opt.verbose))
        .parse_default_env()
        .init();

    let config = load_config(&opt)?;
    let speed = GameSpeed::from_multiplier(opt.speed)
        .with_context(|| format!("unsupported game speed {}; expected 1, 2 or 4", opt.speed))?;
    if opt.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }

    let mut simulation = Simulation::new(config);
    simulation.set_game_speed(speed);
    if opt.auto_wave {
        let _ = simulation.toggle_auto_wave();
    }

    if let Some(value) = &opt.layout {
        place_layout(&mut simulation, value, opt.auto_upgrade)?;
    }

    let tally = run(&mut simulation, &opt)?;
    print_summary(&simulation, &tally);

    if opt.export_layout {
        let snapshot = simulation.snapshot();
        let layout = TowerLayout::capture(snapshot.geometry, &snapshot.towers);
        println!("{}", layout.encode().context("failed to encode tower layout")?);
    }

    Ok(())
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn load_config(opt: &Opt) -> Result<SessionConfig> {
    let mut config = match &opt.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            SessionConfig::from_toml_str(&source)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(seed) = opt.seed {
        config.seed = seed;
    }

    Ok(config)
}

fn place_layout(simulation: &mut Simulation, value: &str, auto_upgrade: bool) -> Result<()> {
    let layout = TowerLayout::decode(value).context("failed to decode tower layout")?;
    let geometry = simulation.snapshot().geometry;
    if !layout.fits(geometry) {
        bail!(
            "layout targets a {}x{} field but the session uses {}x{}",
            layout.columns,
            layout.rows,
            geometry.columns(),
            geometry.rows()
        );
    }

    for tower in &layout.towers {
        simulation
            .place_tower(tower.kind, tower.cell)
            .with_context(|| format!("failed to place {:?} at {:?}", tower.kind, tower.cell))?;
        for _ in 1..tower.level {
            let _ = simulation
                .upgrade_tower(tower.cell)
                .with_context(|| format!("failed to upgrade tower at {:?}", tower.cell))?;
        }
        if auto_upgrade {
            let _ = simulation
                .toggle_auto_upgrade(tower.cell)
                .with_context(|| format!("failed to enable auto-upgrade at {:?}", tower.cell))?;
        }
    }

    info!("placed {} towers from layout", layout.towers.len());
    Ok(())
}

fn run(simulation: &mut Simulation, opt: &Opt) -> Result<Tally> {
    let frame = Duration::from_millis(opt.frame_ms);
    let mut tally = Tally::default();
    tally.record(&simulation.drain_events());

    for _ in 0..opt.max_frames {
        let status = simulation.status();
        if status.is_game_over() || tally.cleared >= opt.waves {
            return Ok(tally);
        }

        let awaiting_first_wave = status.wave == 0;
        if status.phase == GamePhase::Idle && (awaiting_first_wave || !status.auto_wave) {
            let wave = simulation
                .start_next_wave()
                .context("failed to start the next wave")?;
            info!("started wave {wave}");
        }

        simulation.advance(frame);
        tally.record(&simulation.drain_events());
    }

    bail!(
        "stopped after {} frames with {} of {} waves cleared",
        opt.max_frames,
        tally.cleared,
        opt.waves
    )
}

fn print_summary(simulation: &Simulation, tally: &Tally) {
    let snapshot = simulation.snapshot();
    let status = snapshot.status;
    let outcome = if status.is_game_over() {
        "game over"
    } else {
        "survived"
    };

    println!("outcome: {outcome}");
    println!("waves cleared: {}", tally.cleared);
    println!("lives: {}", status.lives);
    println!("money: {}", status.money);
    println!("kills: {} (bounty {})", tally.kills, tally.bounty);
    println!("leaks: {}", tally.leaks);
    println!(
        "simulated time: {:.2}s",
        snapshot.simulated_time.as_secs_f64()
    );
    for tower in snapshot.towers.iter() {
        println!(
            "tower {:?} at ({}, {}) level {} kills {}",
            tower.kind,
            tower.cell.column(),
            tower.cell.row(),
            tower.level,
            tower.kills
        );
    }
}
