//! # SIMBUS Client CLI
//!
//! Drives a bounded submit/poll loop against a running simulation server:
//! connects to the shared segment, runs a number of simulation steps, asks
//! for the debug line array once, and reports what came back.
//!
//! The protocol core defines no timeout; this binary demonstrates the
//! caller-side retry cadence and give-up policy (`poll_interval_us`,
//! `poll_budget`).

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use simbus_client::{ClientConfig, Session, StatusSummary};
use simbus_common::config::ConfigLoader;
use simbus_common::protocol::{Command, RequestDebugLinesArgs};

/// SIMBUS Client: shared-memory simulation protocol driver
#[derive(Parser, Debug)]
#[command(name = "simbus_client")]
#[command(author = "SIMBUS")]
#[command(version)]
#[command(about = "Submit/poll driver for the shared-memory simulation protocol")]
struct Args {
    /// Path to client configuration TOML.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Shared segment key (overrides config).
    #[arg(long)]
    key: Option<u32>,

    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    /// Also fetch the debug line array after stepping.
    #[arg(long)]
    debug_lines: bool,

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

    info!("SIMBUS client v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("SIMBUS client done");
}

fn setup_tracing(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading config from {path:?}");
            ClientConfig::load(path)?
        }
        None => ClientConfig::default(),
    };
    if let Some(key) = args.key {
        config.segment_key = key;
    }
    config.validate()?;

    let interval = Duration::from_micros(config.poll_interval_us);
    let mut session = Session::new(config.segment_key);
    session.connect()?;

    for step in 1..=args.steps {
        session.submit(&Command::StepSimulation)?;
        let summary = wait_for_status(&mut session, interval, config.poll_budget)?;
        match summary {
            StatusSummary::StepCompleted => info!("step {step}/{} completed", args.steps),
            other => warn!("step {step} answered with {other:?}"),
        }
    }

    if args.debug_lines {
        session.submit(&Command::RequestDebugLines(RequestDebugLinesArgs {
            debug_mode: 1,
            starting_index: 0,
        }))?;
        let summary = wait_for_status(&mut session, interval, config.poll_budget)?;
        match summary {
            StatusSummary::DebugLinesReady { line_count } => {
                info!("received {line_count} debug lines");
            }
            other => warn!("debug line request answered with {other:?}"),
        }
    }

    session.disconnect();
    Ok(())
}

/// Poll until a summary arrives or the budget runs out.
///
/// Auto-continued debug line pages consume polls like any other empty
/// round; the budget bounds wall-clock, not protocol round-trips.
fn wait_for_status(
    session: &mut Session,
    interval: Duration,
    budget: u32,
) -> Result<StatusSummary, Box<dyn std::error::Error>> {
    for _ in 0..budget {
        if let Some(summary) = session.poll_status()? {
            return Ok(summary);
        }
        thread::sleep(interval);
    }
    Err("server did not answer within the poll budget".into())
}
