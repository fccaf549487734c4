//! two_ship — two cooperative aircraft sequencing through one intersection
//! while a non-cooperative intruder crosses their path.
//!
//! Loads a JSON scenario (the bundled one by default), runs it to
//! completion, writes per-tick CSV output and one JSON flight log per agent.
//!
//! ```text
//! RUST_LOG=debug cargo run -p two_ship -- --out output/two_ship
//! ```

mod scenario;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::{error, info};

use av_output::{CsvWriter, OutputWriter, SimOutputObserver};
use av_sim::Environment;

use scenario::Scenario;

const BUNDLED_SCENARIO: &str = include_str!("../scenarios/two_ship.json");

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Scenario file.  The bundled two-ship scenario when omitted.
    #[arg(short = 's', long, value_name = "SCENARIO_FILE")]
    scenario: Option<PathBuf>,

    /// Directory for CSV output and flight logs.
    #[arg(short = 'o', long, default_value = "output/two_ship")]
    out: PathBuf,

    /// Override the scenario's seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks by the host clock instead of running in fast time.
    #[arg(long)]
    wall_clock: bool,

    /// Write `output.db` instead of CSV files.
    #[cfg(feature = "sqlite")]
    #[arg(long)]
    sqlite: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::from_json(BUNDLED_SCENARIO)?,
    };
    if let Some(seed) = args.seed {
        scenario.sim.seed = seed;
    }
    if args.wall_clock {
        scenario.sim.fast_time = false;
    }
    let mut env = scenario.build()?;

    #[cfg(feature = "sqlite")]
    if args.sqlite {
        let writer = av_output::SqliteWriter::new(&args.out)?;
        return run(&mut env, writer, &args);
    }
    let writer = CsvWriter::new(&args.out)?;
    run(&mut env, writer, &args)
}

fn run<W: OutputWriter>(env: &mut Environment, writer: W, args: &CliArgs) -> Result<()> {
    let mut obs = SimOutputObserver::new(writer);

    let t0 = Instant::now();
    env.run(&mut obs)?;
    info!("simulated {} in {:.3} s", env.clock, t0.elapsed().as_secs_f64());

    if let Some(e) = obs.take_error() {
        error!("output error: {e}");
    }
    let logs = env.write_logs(&args.out.join("log"))?;

    println!();
    println!("{:<8} {:<12} {:>8} {:>8} {:<10}", "Agent", "Mission", "Samples", "Tracks", "Role");
    println!("{}", "-".repeat(50));
    for agent in env.agents() {
        let core = agent.core();
        let role = core.arrival.as_ref().map_or_else(|| "-".to_owned(), |a| format!("{:?}", a.role));
        println!(
            "{:<8} {:<12} {:>8} {:>8} {:<10}",
            core.callsign,
            core.mission().as_str(),
            core.ownship_log.len(),
            core.traffic_log.len(),
            role,
        );
    }
    println!();
    for path in logs {
        println!("  {}", path.display());
    }
    Ok(())
}
