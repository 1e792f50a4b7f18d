//! # Porter Core
//!
//! Decision core binary for the porter line-following transport robot.
//!
//! Drives the six-waypoint Smart Transport mission against a scripted
//! bench rig: loads the run configuration, builds the rig from a JSON
//! scenario file (or the built-in demo track), and steps the mission
//! one fixed control tick at a time until the terminal waypoint is
//! reached, the tick budget runs out, or the process is interrupted.
//!
//! The rig clock is virtual; each tick advances it by one control
//! period. With `--realtime` the loop additionally paces itself against
//! the wall clock, so a run takes as long as it would on the vehicle.

use clap::Parser;
use porter_common::config::{ConfigError, ConfigLoader, RunConfig};
use porter_common::consts::TICK_MS;
use porter_core::mission::MissionStep;
use porter_core::report::{fault_names, RunReport, TimingReport};
use porter_core::robot::Robot;
use porter_core::tick::{Pacer, TickStats};
use porter_hal::scenario::Scenario;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/porter.toml";

/// Porter decision core — Smart Transport on a bench rig
#[derive(Parser, Debug)]
#[command(name = "porter_core")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Line-following transport mission on a scripted bench rig")]
struct Args {
    /// Path to the run configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Path to a JSON scenario script for the bench rig.
    /// Without it, the built-in demo track is used.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Tick budget: give up after this many control ticks.
    #[arg(long, default_value_t = 30_000)]
    ticks: u64,

    /// Pace ticks against the wall clock instead of free-running.
    #[arg(long)]
    realtime: bool,

    /// Write an end-of-run JSON report to this path.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Porter Core v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Porter Core shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_run_config(args)?;
    info!(
        "Config OK: tick={}ms, service={}",
        TICK_MS, config.shared.service_name
    );

    let rig = match args.scenario {
        Some(ref path) => {
            info!("Loading scenario from {}", path.display());
            Scenario::load(path)?.build()
        }
        None => {
            info!("No scenario given, running the built-in demo track");
            Scenario::demo().build()
        }
    };

    let mut robot = Robot::new(rig, config.robot.clone())?;
    robot.init();

    // Setup signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut pacer = if args.realtime {
        Some(Pacer::new(Duration::from_millis(u64::from(TICK_MS)))?)
    } else {
        None
    };

    let budget_ns = i64::from(TICK_MS) * 1_000_000;
    let mut stats = TickStats::new();
    let mut ticks = 0u64;

    while running.load(Ordering::SeqCst) && ticks < args.ticks {
        let started = Instant::now();
        let step = robot.smart_transport_step();
        stats.record(started.elapsed().as_nanos() as i64, budget_ns);
        ticks += 1;

        if step == MissionStep::Complete {
            break;
        }

        robot.hw_mut().advance(u64::from(TICK_MS));
        if let Some(ref mut pacer) = pacer {
            pacer.pace();
        }
    }

    let done = robot.smart_transport_done();
    if done {
        info!(
            "Mission complete after {} ticks: trail {:?}",
            ticks,
            robot.transport_trail()
        );
    } else if !running.load(Ordering::SeqCst) {
        warn!(
            "Interrupted at {:?} after {} ticks",
            robot.transport_waypoint(),
            ticks
        );
    } else {
        warn!(
            "Tick budget exhausted at {:?} after {} ticks",
            robot.transport_waypoint(),
            ticks
        );
    }

    let faults = robot.faults();
    if faults.is_degraded() {
        warn!("Run degraded: {:?}", fault_names(faults));
    }

    info!(
        "Timing: avg {}ns, max {}ns, overruns {}",
        stats.avg_ns(),
        stats.max_ns,
        stats.overruns
    );

    if let Some(ref path) = args.report {
        let report = RunReport {
            service: config.shared.service_name.clone(),
            ticks,
            done,
            waypoint: robot.transport_waypoint(),
            trail: robot.transport_trail().to_vec(),
            path: robot.transport_path(),
            target: robot.transport_target(),
            carrying: robot.is_carrying(),
            faults: fault_names(faults),
            servo_moves: robot.hw_mut().servo_log().to_vec(),
            timing: TimingReport::from(&stats),
        };
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Load and validate the run configuration.
///
/// A missing file at the default path falls back to built-in defaults;
/// an explicitly given path must exist.
fn load_run_config(args: &Args) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let config = match RunConfig::load(&args.config) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound) if args.config == Path::new(DEFAULT_CONFIG) => {
            warn!("No config at '{DEFAULT_CONFIG}', using built-in defaults");
            RunConfig::default()
        }
        Err(e) => {
            error!("Failed to load config from {}: {e}", args.config.display());
            return Err(Box::new(e));
        }
    };
    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
