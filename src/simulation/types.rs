//! Type definitions for the simulation.
//!
//! Contains the data structures shared across the simulation:
//! - The error taxonomy of a run
//! - Transmission requests queued at the access point
//! - Observability records for attempts and completed transmissions

use serde::Serialize;

use super::geometry::Point;

/// Identity of a station, assigned sequentially by the packet generator.
pub(crate) type StationId = u32;

/// Errors that abort a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SimulationError {
    /// A configuration value is out of its valid domain.
    InvalidConfiguration(String),
    /// A process asked to be resumed after a negative or non-finite delay.
    InvalidDelay(f64),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            SimulationError::InvalidDelay(delay) => write!(f, "Invalid scheduling delay: {} (must be finite and non-negative)", delay),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Result of a station's link evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Outcome {
    /// Received power cleared the threshold; the packet was handed to the access point.
    Accepted,
    /// Received power was at or below the threshold; the packet was discarded.
    Dropped,
}

/// A packet waiting for (or occupying) the access point.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransmissionRequest {
    pub(crate) station_id: StationId,
    /// Packet size in bytes (exponentially distributed, so fractional).
    pub(crate) packet_size: f64,
    /// Virtual time the station called the admission protocol.
    pub(crate) requested_at: f64,
}

/// Diagnostic record emitted when a station evaluates its link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AttemptRecord {
    pub(crate) station_id: StationId,
    /// Virtual time of the evaluation (end of backoff).
    pub(crate) time: f64,
    pub(crate) position: Point,
    /// Backoff in slots.
    pub(crate) backoff: u32,
    /// Received power in dBm, shadowing included.
    pub(crate) power_dbm: f64,
    /// Distance to the access point in meters (before clamping).
    pub(crate) distance: f64,
    pub(crate) outcome: Outcome,
}

/// Record of a transmission served by the access point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TransmissionRecord {
    pub(crate) station_id: StationId,
    pub(crate) packet_size: f64,
    pub(crate) requested_at: f64,
    pub(crate) started_at: f64,
    pub(crate) finished_at: f64,
}

impl TransmissionRecord {
    /// Time spent in the pending queue before the transmission started.
    pub(crate) fn queueing_delay(&self) -> f64 {
        self.started_at - self.requested_at
    }
}
