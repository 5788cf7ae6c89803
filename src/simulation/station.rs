//! Station process: one backoff-then-attempt sequence.
//!
//! Lifecycle:
//!
//! ```text
//! Created ──draw backoff──▶ Backoff ──wait backoff × slot──▶ LinkEvaluated
//!                                                              │
//!                                  power > threshold ──────────┼──▶ Accepted ─▶ Terminated
//!                                  otherwise ──────────────────┴──▶ Dropped  ─▶ Terminated
//! ```
//!
//! An accepted station hands its packet to the access point's admission
//! protocol and ends. A dropped station ends without any further effect.

use rand::Rng;

use super::geometry::{Point, distance};
use super::network::Network;
use super::process::{Process, Step};
use super::scheduler::Scheduler;
use super::signal_calculations::{calculate_received_power, is_link_successful};
use super::types::{AttemptRecord, Outcome, SimulationError, StationId, TransmissionRequest};

/// Where a station is in its single contention round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StationState {
    Created,
    Backoff { slots: u32 },
    Accepted,
    Dropped,
}

/// A station attempting exactly one packet transmission.
#[derive(Debug, Clone)]
pub(crate) struct Station {
    id: StationId,
    position: Point,
    packet_size: f64,
    state: StationState,
}

impl Station {
    pub(crate) fn new(id: StationId, position: Point, packet_size: f64) -> Self {
        Self {
            id,
            position,
            packet_size,
            state: StationState::Created,
        }
    }

    #[cfg(test)]
    pub(crate) fn id(&self) -> StationId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> StationState {
        self.state
    }

    /// Draw a backoff uniformly from `[0, contention_window_max]`.
    pub(crate) fn draw_backoff<R: Rng + ?Sized>(contention_window_max: u32, rng: &mut R) -> u32 {
        rng.gen_range(0..=contention_window_max)
    }

    fn evaluate_link(&mut self, slots: u32, world: &mut Network, scheduler: &mut Scheduler<Network>) -> Result<Outcome, SimulationError> {
        let distance = distance(&self.position, world.access_point.position());
        let power = calculate_received_power(distance, &world.channel, &mut world.rng)?;
        let outcome = if is_link_successful(power, &world.channel) {
            Outcome::Accepted
        } else {
            Outcome::Dropped
        };

        log::info!(
            "t={:.6} station {} backoff {} power {:.2} dBm distance {:.2} m -> {:?}",
            scheduler.now(),
            self.id,
            slots,
            power,
            distance,
            outcome
        );

        world.attempts.push(AttemptRecord {
            station_id: self.id,
            time: scheduler.now(),
            position: self.position,
            backoff: slots,
            power_dbm: power,
            distance,
            outcome,
        });

        Ok(outcome)
    }
}

impl Process<Network> for Station {
    fn name(&self) -> &'static str {
        "station"
    }

    fn resume(&mut self, world: &mut Network, scheduler: &mut Scheduler<Network>) -> Result<Step, SimulationError> {
        match self.state {
            StationState::Created => {
                let slots = Self::draw_backoff(world.config.contention_window_max, &mut world.rng);
                self.state = StationState::Backoff { slots };
                Ok(Step::Sleep(f64::from(slots) * world.config.slot_time))
            }
            StationState::Backoff { slots } => {
                match self.evaluate_link(slots, world, scheduler)? {
                    Outcome::Accepted => {
                        self.state = StationState::Accepted;
                        let request = TransmissionRequest {
                            station_id: self.id,
                            packet_size: self.packet_size,
                            requested_at: scheduler.now(),
                        };
                        world.access_point.request_transmission(request, scheduler);
                    }
                    Outcome::Dropped => self.state = StationState::Dropped,
                }
                Ok(Step::Done)
            }
            StationState::Accepted | StationState::Dropped => {
                log::warn!("Station {} resumed after terminating", self.id);
                Ok(Step::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet_network() -> Network {
        Network::new(SimulationConfig {
            shadowing_sigma: 0.0,
            ..SimulationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn backoff_draws_stay_in_window_and_cover_it() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut counts = [0u32; 64];
        let n = 64_000;
        for _ in 0..n {
            let b = Station::draw_backoff(63, &mut rng);
            assert!(b <= 63);
            counts[b as usize] += 1;
        }
        // Expected 1000 per slot; a uniform draw stays well within ±20%.
        for (slot, &c) in counts.iter().enumerate() {
            assert!((800..=1200).contains(&c), "slot {slot} drawn {c} times");
        }
    }

    #[test]
    fn evaluation_moves_station_to_terminal_state() {
        let mut world = quiet_network();
        let mut scheduler = Scheduler::new();
        let mut near = Station::new(3, Point::new(50.0, 60.0), 100.0);
        let mut far = Station::new(4, Point::new(50.0, 5_000.0), 100.0);
        assert_eq!(near.state(), StationState::Created);

        for station in [&mut near, &mut far] {
            assert!(matches!(station.resume(&mut world, &mut scheduler).unwrap(), Step::Sleep(_)));
            assert!(matches!(station.state(), StationState::Backoff { .. }));
            assert_eq!(station.resume(&mut world, &mut scheduler).unwrap(), Step::Done);
        }

        assert_eq!(near.id(), 3);
        assert_eq!(near.state(), StationState::Accepted);
        assert_eq!(far.state(), StationState::Dropped);
        assert_eq!(world.access_point.accepted_requests(), 1);
    }

    #[test]
    fn zero_window_always_draws_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!((0..100).all(|_| Station::draw_backoff(0, &mut rng) == 0));
    }

    #[test]
    fn station_waits_for_its_backoff_before_evaluating() {
        let mut world = quiet_network();
        let mut scheduler = Scheduler::new();
        scheduler.spawn(Station::new(0, Point::new(40.0, 50.0), 100.0));

        // First step draws the backoff and suspends.
        scheduler.step(&mut world).unwrap();
        assert!(world.attempts.is_empty());

        scheduler.run_until(&mut world, 1.0).unwrap();
        let attempt = &world.attempts[0];
        let expected = f64::from(attempt.backoff) * world.config.slot_time;
        assert!((attempt.time - expected).abs() < 1e-15);
        assert!(attempt.backoff <= world.config.contention_window_max);
    }

    #[test]
    fn station_on_access_point_is_accepted() {
        let mut world = quiet_network();
        let mut scheduler = Scheduler::new();
        scheduler.spawn(Station::new(0, Point::new(50.0, 50.0), 100.0));
        scheduler.run_until(&mut world, 10.0).unwrap();

        let attempt = &world.attempts[0];
        assert_eq!(attempt.distance, 0.0);
        assert!(attempt.power_dbm.is_finite());
        assert_eq!(attempt.outcome, Outcome::Accepted);
        assert_eq!(world.access_point.completed().len(), 1);
    }

    #[test]
    fn station_on_access_point_is_accepted_with_shadowing() {
        let mut world = Network::new(SimulationConfig {
            seed: 11,
            ..SimulationConfig::default()
        })
        .unwrap();
        let mut scheduler = Scheduler::new();
        scheduler.spawn(Station::new(0, Point::new(50.0, 50.0), 100.0));
        scheduler.run_until(&mut world, 10.0).unwrap();
        assert_eq!(world.attempts[0].outcome, Outcome::Accepted);
    }

    #[test]
    fn distant_station_is_dropped_without_touching_access_point() {
        let mut world = quiet_network();
        let mut scheduler = Scheduler::new();
        scheduler.spawn(Station::new(0, Point::new(10_050.0, 50.0), 100.0));
        scheduler.run_until(&mut world, 10.0).unwrap();

        let attempt = &world.attempts[0];
        assert_eq!(attempt.station_id, 0);
        assert!((attempt.distance - 10_000.0).abs() < 1e-9);
        assert_eq!(attempt.outcome, Outcome::Dropped);
        assert_eq!(world.access_point.accepted_requests(), 0);
        assert_eq!(world.access_point.queue_len(), 0);
        assert!(!world.access_point.is_busy());
        assert!(world.access_point.completed().is_empty());
    }

    #[test]
    fn two_accepted_stations_share_the_medium_without_gap() {
        let mut world = quiet_network();
        let mut scheduler = Scheduler::new();
        scheduler.spawn(Station::new(0, Point::new(45.0, 50.0), 400.0));
        scheduler.spawn(Station::new(1, Point::new(55.0, 50.0), 200.0));
        scheduler.run_until(&mut world, 100.0).unwrap();

        let done = world.access_point.completed();
        assert_eq!(done.len(), 2);
        assert_eq!(done[1].started_at, done[0].finished_at);
        assert!(done[1].queueing_delay() > 0.0);
    }
}
