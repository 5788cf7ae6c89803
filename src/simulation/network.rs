//! Network driver: the world every process runs against, and a full run.
//!
//! High-level flow of [`run_simulation`]:
//! 1) Validate the configuration and seed the random source.
//! 2) Spawn the packet generator at t = 0.
//! 3) Drive the scheduler until the configured horizon.
//! 4) Summarize the access point and the attempt trace into a report.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SimulationConfig;

use super::access_point::AccessPoint;
use super::generator::PacketGenerator;
use super::report::SimulationReport;
use super::scheduler::Scheduler;
use super::signal_calculations::{ChannelParameters, calculate_effective_distance};
use super::types::{AttemptRecord, SimulationError};

/// Shared state of one simulation run.
///
/// Processes receive it by `&mut` on every resumption; nothing else holds it.
#[derive(Debug)]
pub(crate) struct Network {
    pub(crate) config: SimulationConfig,
    /// Single random source; every draw of the run goes through it.
    pub(crate) rng: ChaCha8Rng,
    pub(crate) access_point: AccessPoint,
    pub(crate) channel: ChannelParameters,
    /// Link evaluations in the order they happened.
    pub(crate) attempts: Vec<AttemptRecord>,
    pub(crate) stations_generated: u32,
}

impl Network {
    /// Build the world for `config`. Invalid configurations are rejected here,
    /// before any event is scheduled.
    pub(crate) fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate().map_err(SimulationError::InvalidConfiguration)?;

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            access_point: AccessPoint::new(config.access_point_position, config.data_rate),
            channel: config.channel_parameters(),
            attempts: Vec::new(),
            stations_generated: 0,
            config,
        })
    }

    pub(crate) fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub(crate) fn access_point(&self) -> &AccessPoint {
        &self.access_point
    }

    pub(crate) fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub(crate) fn stations_generated(&self) -> u32 {
        self.stations_generated
    }
}

/// Run one complete simulation and summarize it.
///
/// Stations still in backoff and packets still queued or on air at the
/// horizon are left unfinished; they show up as pending in the report.
pub(crate) fn run_simulation(config: SimulationConfig) -> Result<SimulationReport, SimulationError> {
    let mut world = Network::new(config)?;
    let mut scheduler = Scheduler::new();

    let effective_distance = calculate_effective_distance(&world.channel);
    log::info!(
        "Starting simulation: {} stations every {} s, horizon {} s, seed {}",
        world.config.station_count,
        world.config.packet_interval,
        world.config.simulation_duration,
        world.config.seed
    );
    log::info!(
        "Access point at ({:.1}, {:.1}), {} units/s, link range without shadowing {:.2} m",
        world.access_point.position().x,
        world.access_point.position().y,
        world.access_point.data_rate(),
        effective_distance
    );

    scheduler.spawn(PacketGenerator::new(world.config.station_count));
    let horizon = world.config.simulation_duration;
    scheduler.run_until(&mut world, horizon)?;

    log::debug!(
        "{} resumptions left unexecuted at the horizon, access point admitted {} requests",
        scheduler.pending_events(),
        world.access_point.accepted_requests()
    );
    let report = SimulationReport::from_run(&world, &scheduler);
    log::info!(
        "Simulation finished at t={}: {} generated, {} accepted, {} dropped, {} completed, {} pending",
        report.final_time,
        report.stations_generated,
        report.accepted,
        report.dropped,
        report.completed,
        report.pending_at_horizon
    );
    Ok(report)
}
