//! Access point: the single shared resource of the cell.
//!
//! The access point serializes accepted packets. A request either starts a
//! transmission right away or waits in a FIFO queue. Every transmission runs
//! as its own [`Transmission`] process that sleeps for the on-air time and then
//! hands the medium to the head of the queue.
//!
//! ## Ownership of state
//!
//! The busy flag and the queue are private. They are changed only by
//! [`AccessPoint::request_transmission`] and by the completion step of the
//! access point's own transmission process. Stations never touch them.

use std::collections::VecDeque;

use super::geometry::Point;
use super::network::Network;
use super::process::{Process, Step};
use super::scheduler::Scheduler;
use super::types::{SimulationError, StationId, TransmissionRecord, TransmissionRequest};

/// Request currently occupying the medium.
#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    request: TransmissionRequest,
    started_at: f64,
}

/// Stateful access point with a serialized transmission service.
#[derive(Debug)]
pub(crate) struct AccessPoint {
    position: Point,
    /// Service rate in size units per time unit.
    data_rate: f64,
    in_flight: Option<InFlight>,
    pending: VecDeque<TransmissionRequest>,
    completed: Vec<TransmissionRecord>,
    accepted_requests: u64,
    max_queue_depth: usize,
    busy_time: f64,
}

impl AccessPoint {
    pub(crate) fn new(position: Point, data_rate: f64) -> Self {
        Self {
            position,
            data_rate,
            in_flight: None,
            pending: VecDeque::new(),
            completed: Vec::new(),
            accepted_requests: 0,
            max_queue_depth: 0,
            busy_time: 0.0,
        }
    }

    pub(crate) fn position(&self) -> &Point {
        &self.position
    }

    pub(crate) fn data_rate(&self) -> f64 {
        self.data_rate
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Station currently on air, if any.
    pub(crate) fn transmitting_station(&self) -> Option<StationId> {
        self.in_flight.as_ref().map(|t| t.request.station_id)
    }

    pub(crate) fn queue_len(&self) -> usize {
        self.pending.len()
    }

    /// Stations waiting for the medium, head first.
    #[cfg(test)]
    pub(crate) fn queued_stations(&self) -> impl Iterator<Item = StationId> + '_ {
        self.pending.iter().map(|r| r.station_id)
    }

    /// Transmissions served so far, in completion order.
    pub(crate) fn completed(&self) -> &[TransmissionRecord] {
        &self.completed
    }

    /// Requests admitted through [`AccessPoint::request_transmission`].
    pub(crate) fn accepted_requests(&self) -> u64 {
        self.accepted_requests
    }

    /// Requests admitted but not yet fully transmitted (queued + on air).
    pub(crate) fn outstanding_requests(&self) -> usize {
        self.pending.len() + usize::from(self.is_busy())
    }

    pub(crate) fn max_queue_depth(&self) -> usize {
        self.max_queue_depth
    }

    /// Total virtual time spent transmitting completed packets.
    #[cfg(test)]
    pub(crate) fn busy_time(&self) -> f64 {
        self.busy_time
    }

    /// Busy time up to `now`, counting the elapsed part of the transmission on air.
    pub(crate) fn busy_time_at(&self, now: f64) -> f64 {
        let in_progress = self.in_flight.as_ref().map_or(0.0, |t| (now - t.started_at).max(0.0));
        self.busy_time + in_progress
    }

    /// On-air time of a packet at this access point's data rate.
    pub(crate) fn transmission_duration(&self, packet_size: f64) -> f64 {
        packet_size / self.data_rate
    }

    /// Admission protocol: transmit now if the medium is free, otherwise queue.
    pub(crate) fn request_transmission(&mut self, request: TransmissionRequest, scheduler: &mut Scheduler<Network>) {
        self.accepted_requests += 1;
        if self.is_busy() {
            log::debug!(
                "t={:.6} AP busy with station {:?}, station {} queued at position {}",
                scheduler.now(),
                self.transmitting_station(),
                request.station_id,
                self.queue_len()
            );
            self.pending.push_back(request);
            self.max_queue_depth = self.max_queue_depth.max(self.pending.len());
        } else {
            self.begin_transmission(request, scheduler);
        }
    }

    fn begin_transmission(&mut self, request: TransmissionRequest, scheduler: &mut Scheduler<Network>) {
        let duration = self.transmission_duration(request.packet_size);
        log::debug!(
            "t={:.6} AP starts station {} ({:.1} bytes, {:.4} s on air)",
            scheduler.now(),
            request.station_id,
            request.packet_size,
            duration
        );
        self.in_flight = Some(InFlight {
            request,
            started_at: scheduler.now(),
        });
        scheduler.spawn(Transmission { duration, on_air: false });
    }

    /// Completion step of the in-flight transmission.
    ///
    /// Records the finished packet and, when the queue is non-empty, starts the
    /// head request at the same instant. The medium never becomes free in
    /// between, so a request arriving at this exact time still queues.
    fn finish_transmission(&mut self, scheduler: &mut Scheduler<Network>) {
        let Some(InFlight { request, started_at }) = self.in_flight.take() else {
            log::error!("t={:.6} AP transmission completed with nothing in flight", scheduler.now());
            return;
        };

        let finished_at = scheduler.now();
        self.busy_time += finished_at - started_at;
        log::debug!("t={:.6} AP finished station {}", finished_at, request.station_id);
        self.completed.push(TransmissionRecord {
            station_id: request.station_id,
            packet_size: request.packet_size,
            requested_at: request.requested_at,
            started_at,
            finished_at,
        });

        if let Some(next) = self.pending.pop_front() {
            self.begin_transmission(next, scheduler);
        }
    }
}

/// Continuation of one packet on air at the access point.
struct Transmission {
    duration: f64,
    on_air: bool,
}

impl Process<Network> for Transmission {
    fn name(&self) -> &'static str {
        "transmission"
    }

    fn resume(&mut self, world: &mut Network, scheduler: &mut Scheduler<Network>) -> Result<Step, SimulationError> {
        if !self.on_air {
            self.on_air = true;
            return Ok(Step::Sleep(self.duration));
        }
        world.access_point.finish_transmission(scheduler);
        Ok(Step::Done)
    }
}
