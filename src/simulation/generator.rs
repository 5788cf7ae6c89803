//! Packet generator: spawns one station per packet interval.

use rand::Rng;
use rand_distr::{Distribution, Exp, Uniform};

use super::geometry::Point;
use super::network::Network;
use super::process::{Process, Step};
use super::scheduler::Scheduler;
use super::station::Station;
use super::types::{SimulationError, StationId};

/// Creates `station_count` stations, one every `packet_interval`.
///
/// Each station gets a position drawn uniformly from the configured ranges and
/// an exponentially distributed packet size. The generator does not wait for
/// the stations it spawns.
#[derive(Debug, Clone)]
pub(crate) struct PacketGenerator {
    station_count: u32,
    next_station: StationId,
}

impl PacketGenerator {
    pub(crate) fn new(station_count: u32) -> Self {
        Self {
            station_count,
            next_station: 0,
        }
    }

    pub(crate) fn generated(&self) -> u32 {
        self.next_station
    }
}

/// Uniform position within `x_range` × `y_range` (bounds inclusive).
pub(crate) fn draw_position<R: Rng + ?Sized>(x_range: (f64, f64), y_range: (f64, f64), rng: &mut R) -> Point {
    let x = Uniform::new_inclusive(x_range.0, x_range.1).sample(rng);
    let y = Uniform::new_inclusive(y_range.0, y_range.1).sample(rng);
    Point::new(x, y)
}

/// Exponentially distributed packet size with the given mean.
pub(crate) fn draw_packet_size<R: Rng + ?Sized>(mean_packet_size: f64, rng: &mut R) -> Result<f64, SimulationError> {
    let exp = Exp::new(1.0 / mean_packet_size).map_err(|e| SimulationError::InvalidConfiguration(format!("invalid mean packet size {mean_packet_size}: {e}")))?;
    Ok(exp.sample(rng))
}

impl Process<Network> for PacketGenerator {
    fn name(&self) -> &'static str {
        "packet-generator"
    }

    fn resume(&mut self, world: &mut Network, scheduler: &mut Scheduler<Network>) -> Result<Step, SimulationError> {
        if self.next_station >= self.station_count {
            log::debug!("t={:.6} generator done after {} stations", scheduler.now(), self.generated());
            return Ok(Step::Done);
        }

        let config = &world.config;
        let position = draw_position(config.x_range, config.y_range, &mut world.rng);
        let packet_size = draw_packet_size(config.mean_packet_size, &mut world.rng)?;
        let id = self.next_station;
        self.next_station += 1;

        log::debug!(
            "t={:.6} station {} created at ({:.2}, {:.2}) with {:.1} bytes",
            scheduler.now(),
            id,
            position.x,
            position.y,
            packet_size
        );
        scheduler.spawn(Station::new(id, position, packet_size));
        world.stations_generated += 1;

        if self.next_station >= self.station_count {
            return Ok(Step::Done);
        }
        Ok(Step::Sleep(world.config.packet_interval))
    }
}
