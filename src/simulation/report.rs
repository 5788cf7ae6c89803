//! End-of-run summary, serializable to JSON.

use serde::Serialize;

use super::network::Network;
use super::scheduler::Scheduler;
use super::types::{AttemptRecord, Outcome, TransmissionRecord};

/// Aggregate metrics and traces of one simulation run.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SimulationReport {
    /// Wall-clock creation time (RFC 3339).
    pub(crate) generated_at: String,
    pub(crate) seed: u64,
    /// Virtual time the run stopped at.
    pub(crate) final_time: f64,
    pub(crate) events_processed: u64,
    pub(crate) stations_generated: u32,
    pub(crate) accepted: usize,
    pub(crate) dropped: usize,
    /// Transmissions finished before the horizon.
    pub(crate) completed: usize,
    /// Accepted requests still queued or on air at the horizon.
    pub(crate) pending_at_horizon: usize,
    /// Mean time from request to start of transmission over completed packets.
    pub(crate) mean_queueing_delay: Option<f64>,
    pub(crate) max_queue_depth: usize,
    /// Fraction of the run the access point spent transmitting.
    pub(crate) utilisation: f64,
    pub(crate) attempts: Vec<AttemptRecord>,
    pub(crate) transmissions: Vec<TransmissionRecord>,
}

impl SimulationReport {
    pub(crate) fn from_run(world: &Network, scheduler: &Scheduler<Network>) -> Self {
        let ap = world.access_point();
        let accepted = world.attempts().iter().filter(|a| a.outcome == Outcome::Accepted).count();
        let transmissions = ap.completed().to_vec();

        let mean_queueing_delay = if transmissions.is_empty() {
            None
        } else {
            Some(transmissions.iter().map(TransmissionRecord::queueing_delay).sum::<f64>() / transmissions.len() as f64)
        };

        let final_time = scheduler.now();
        let utilisation = if final_time > 0.0 { ap.busy_time_at(final_time) / final_time } else { 0.0 };

        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            seed: world.config().seed,
            final_time,
            events_processed: scheduler.events_processed(),
            stations_generated: world.stations_generated(),
            accepted,
            dropped: world.attempts().len() - accepted,
            completed: transmissions.len(),
            pending_at_horizon: ap.outstanding_requests(),
            mean_queueing_delay,
            max_queue_depth: ap.max_queue_depth(),
            utilisation,
            attempts: world.attempts().to_vec(),
            transmissions,
        }
    }

    /// Fraction of attempts whose link cleared the threshold.
    pub(crate) fn acceptance_ratio(&self) -> Option<f64> {
        if self.attempts.is_empty() {
            return None;
        }
        Some(self.accepted as f64 / self.attempts.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::simulation::network::run_simulation;

    #[test]
    fn report_serializes_to_json() {
        let report = run_simulation(SimulationConfig {
            station_count: 3,
            seed: 1,
            ..SimulationConfig::default()
        })
        .unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["seed"], 1);
        assert_eq!(json["stations_generated"], 3);
        assert_eq!(json["attempts"].as_array().unwrap().len(), 3);
        let outcome = json["attempts"][0]["outcome"].as_str().unwrap();
        assert!(outcome == "accepted" || outcome == "dropped");
        assert!(chrono::DateTime::parse_from_rfc3339(json["generated_at"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn utilisation_is_a_fraction() {
        let report = run_simulation(SimulationConfig {
            station_count: 20,
            seed: 4,
            ..SimulationConfig::default()
        })
        .unwrap();
        assert!((0.0..=1.0).contains(&report.utilisation), "utilisation {}", report.utilisation);
        // Twenty packets of ~10 s each saturate a 10 s run.
        assert!(report.utilisation > 0.5);
        assert!(report.max_queue_depth > 0);
    }

    #[test]
    fn mean_queueing_delay_matches_transmissions() {
        let report = run_simulation(SimulationConfig {
            station_count: 5,
            simulation_duration: 10_000.0,
            seed: 9,
            ..SimulationConfig::default()
        })
        .unwrap();
        let expected = report.transmissions.iter().map(|t| t.started_at - t.requested_at).sum::<f64>() / report.transmissions.len() as f64;
        assert!((report.mean_queueing_delay.unwrap() - expected).abs() < 1e-9);
        assert_eq!(report.pending_at_horizon, 0);
        assert_eq!(report.acceptance_ratio(), Some(1.0));
    }
}
