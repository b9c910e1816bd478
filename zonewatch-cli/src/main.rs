//! ZoneWatch CLI - Command-line interface
//!
//! Monitors a GPS tracker (or a simulated one) against safe zones and
//! routes and prints alerts as they happen.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use zonewatch::config::ConfigKey;

use commands::common::SimulationArg;
use commands::config::ConfigCommands;
use commands::session::{self, SessionStart};
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "zonewatch")]
#[command(version = zonewatch::VERSION)]
#[command(about = "Geofence and route-deviation monitoring for GPS trackers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that evaluate positions.
#[derive(Debug, clap::Args)]
struct GeometryArgs {
    /// Zones and routes JSON file (overrides geometry.file)
    #[arg(long)]
    geometry: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the live tracker and alert on violations
    Monitor {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Tracker host or URL (overrides device.address)
        #[arg(long)]
        device: Option<String>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Drive the monitor with synthetic positions
    Simulate {
        /// Simulation to run
        #[arg(value_enum)]
        kind: SimulationArg,

        #[command(flatten)]
        geometry: GeometryArgs,

        /// Intrusion heading in degrees (0 = North)
        #[arg(long)]
        direction: Option<f64>,

        /// Intrusion speed in km/h
        #[arg(long)]
        speed: Option<f64>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Evaluate a single coordinate against zones and routes
    Check {
        #[command(flatten)]
        geometry: GeometryArgs,

        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// View and modify configuration settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Monitor {
            geometry,
            device,
            duration,
        } => run_monitor(geometry, device, duration),
        Commands::Simulate {
            kind,
            geometry,
            direction,
            speed,
            duration,
        } => run_simulate(kind.to_kind(direction, speed), geometry, duration),
        Commands::Check { geometry, lat, lng } => run_check(geometry, lat, lng),
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

fn run_monitor(
    geometry: GeometryArgs,
    device: Option<String>,
    duration: Option<u64>,
) -> Result<(), CliError> {
    let mut runner = CliRunner::new()?;
    runner.log_startup("monitor");

    if let Some(address) = device {
        ConfigKey::DeviceAddress
            .set(runner.config_mut(), &address)
            .map_err(|e| CliError::Config(e.to_string()))?;
    }

    let snapshot = runner.load_geometry(geometry.geometry.as_deref())?;
    println!("ZoneWatch v{}", zonewatch::VERSION);
    println!("Tracker: {}", runner.config().device.address);

    let status = session::run(
        &runner,
        SessionStart::Live,
        snapshot,
        duration.map(Duration::from_secs),
    )?;
    session::print_summary(&status);
    Ok(())
}

fn run_simulate(
    kind: zonewatch::simulation::SimulationKind,
    geometry: GeometryArgs,
    duration: Option<u64>,
) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("simulate");

    let snapshot = runner.load_geometry(geometry.geometry.as_deref())?;
    if kind.follows_route() && snapshot.first_monitored_route().is_none() {
        println!("No confirmed route loaded; the simulated device will hold position");
    }
    println!("ZoneWatch v{}", zonewatch::VERSION);

    let status = session::run(
        &runner,
        SessionStart::Simulation(kind),
        snapshot,
        duration.map(Duration::from_secs),
    )?;
    session::print_summary(&status);
    Ok(())
}

fn run_check(geometry: GeometryArgs, lat: f64, lng: f64) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("check");

    let snapshot = runner.load_geometry(geometry.geometry.as_deref())?;
    commands::check::run(&snapshot, lat, lng, runner.config().alerts.buffer_radius_m)?;
    Ok(())
}
