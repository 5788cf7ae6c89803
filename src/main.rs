//! WLAN contention simulator CLI
//!
//! Runs one discrete-event simulation of stations contending for a shared
//! access point and prints a summary. The full report can be written as JSON.

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::PathBuf;

use crate::config::SimulationConfig;
use crate::simulation::run_simulation;

mod config;
mod simulation;

#[derive(Parser)]
#[command(name = "wlan-sim")]
#[command(about = "Discrete-event simulator of WLAN stations contending for one access point")]
#[command(version)]
struct Cli {
    /// TOML configuration file; omitted keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of stations to generate (overrides the file)
    #[arg(long)]
    stations: Option<u32>,

    /// Simulation horizon in seconds (overrides the file)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Seed of the random source (overrides the file)
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full report to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log access point decisions
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn simulation_config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(stations) = self.stations {
            config.station_count = stations;
        }
        if let Some(duration) = self.duration {
            config.simulation_duration = duration;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        config.validate().map_err(anyhow::Error::msg).context("Invalid command line override")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let crate_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("wlan_contention_simulator"), crate_level)
        .parse_default_env()
        .init();

    info!("Starting up");

    let config = cli.simulation_config()?;
    let report = run_simulation(config).context("Simulation failed")?;

    match report.mean_queueing_delay {
        Some(delay) => info!("Mean queueing delay {:.4} s over {} transmissions", delay, report.completed),
        None => info!("No transmission completed before the horizon"),
    }
    info!(
        "Max queue depth {}, access point utilisation {:.1}%, {} events processed",
        report.max_queue_depth,
        report.utilisation * 100.0,
        report.events_processed
    );
    if let Some(ratio) = report.acceptance_ratio() {
        info!("Link acceptance ratio {:.1}%", ratio * 100.0);
    }

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_defaults() {
        let cli = Cli::parse_from(["wlan-sim", "--stations", "4", "--duration", "2.5", "--seed", "9"]);
        let config = cli.simulation_config().unwrap();
        assert_eq!(config.station_count, 4);
        assert_eq!(config.simulation_duration, 2.5);
        assert_eq!(config.seed, 9);
        assert_eq!(config.data_rate, 100.0);
    }

    #[test]
    fn negative_duration_override_is_rejected() {
        let cli = Cli::parse_from(["wlan-sim", "--duration=-1"]);
        assert!(cli.simulation_config().is_err());
    }

    #[test]
    fn negative_station_count_fails_to_parse() {
        assert!(Cli::try_parse_from(["wlan-sim", "--stations=-3"]).is_err());
    }
}
