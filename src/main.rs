//! Schemsim - steady-state schematic simulator
//!
//! Reads a schematic description, solves it and prints node potentials and
//! per-component voltages, currents and power.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug schemsim amplifier.sch --samples 64
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use schemsim_core::{
    circuit::{validate_schematic, Schematic},
    dsl,
    error::Result,
    info::InfoRegistry,
    report::{write_report, ReportOptions},
    Simulator, SimulatorConfig, DEFAULT_MAX_ITERATIONS,
};

/// Steady-state schematic simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the schematic description file
    #[arg(value_name = "FILE")]
    schematic_file: PathBuf,

    /// Cap on op-amp operating-point iterations
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ITERATIONS,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    max_iterations: usize,

    /// Also print node potentials sampled at this many points
    #[arg(long)]
    samples: Option<usize>,

    /// Periods of the slowest AC source covered by the samples
    #[arg(long, default_value_t = 1.0)]
    periods: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse the schematic file
    let ast = dsl::parse_file(&args.schematic_file)?;

    // Build the schematic
    let schematic = Schematic::from_ast(ast)?;

    // Validate
    validate_schematic(&schematic)?;

    // Simulate
    let config = SimulatorConfig::new().with_max_iterations(args.max_iterations);
    let mut simulation = Simulator::new(config).simulate(schematic)?;

    // Report
    let options = ReportOptions {
        samples: args.samples,
        periods: args.periods,
    };
    let mut stdout = io::stdout().lock();
    write_report(&mut simulation, &InfoRegistry::standard(), &options, &mut stdout)?;

    Ok(())
}
