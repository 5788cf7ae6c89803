//! Discrete-event scheduler with a virtual clock.
//!
//! The scheduler owns:
//! - the virtual clock (seconds, never decreasing)
//! - a priority queue of pending resumptions ordered by time, then by the
//!   order they were scheduled in
//! - the suspended processes themselves, keyed by [`ProcessId`]
//!
//! Events hold only a process id. When an event fires, the process is taken
//! out of the table, resumed with exclusive access to the world and the
//! scheduler, and put back if it asked to sleep again.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::process::{Process, Step};
use super::types::SimulationError;

/// Handle of a process registered with the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ProcessId(u64);

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resumption scheduled for a specific virtual time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScheduledEvent {
    time: f64,
    sequence: u64, // tie-break for equal times
    process: ProcessId,
}

impl ScheduledEvent {
    pub(crate) fn new(time: f64, sequence: u64, process: ProcessId) -> Self {
        Self { time, sequence, process }
    }

    pub(crate) fn time(&self) -> f64 {
        self.time
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn process(&self) -> ProcessId {
        self.process
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap: reverse both keys so the earliest time and,
        // among equal times, the lowest sequence number come out first.
        match other.time.total_cmp(&self.time) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

/// Priority queue of scheduled events in chronological order.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<ScheduledEvent>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        Self { heap: BinaryHeap::new() }
    }

    pub(crate) fn schedule(&mut self, event: ScheduledEvent) {
        self.heap.push(event);
    }

    pub(crate) fn pop_earliest(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop()
    }

    pub(crate) fn peek_earliest(&self) -> Option<&ScheduledEvent> {
        self.heap.peek()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

/// The central coordinator that owns virtual time and all suspended processes.
pub(crate) struct Scheduler<W> {
    now: f64,
    queue: EventQueue,
    next_sequence: u64,
    next_process_id: u64,
    processes: HashMap<ProcessId, Box<dyn Process<W>>>,
    events_processed: u64,
}

impl<W> Scheduler<W> {
    pub(crate) fn new() -> Self {
        Self {
            now: 0.0,
            queue: EventQueue::new(),
            next_sequence: 0,
            next_process_id: 0,
            processes: HashMap::new(),
            events_processed: 0,
        }
    }

    /// Current virtual time in seconds.
    pub(crate) fn now(&self) -> f64 {
        self.now
    }

    /// Number of resumptions waiting in the queue.
    pub(crate) fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Number of resumptions executed so far.
    pub(crate) fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Time of the next resumption, if any.
    pub(crate) fn next_event_time(&self) -> Option<f64> {
        self.queue.peek_earliest().map(ScheduledEvent::time)
    }

    /// Register a process and schedule its first resumption at the current time.
    pub(crate) fn spawn<P>(&mut self, process: P) -> ProcessId
    where
        P: Process<W> + 'static,
    {
        let id = ProcessId(self.next_process_id);
        self.next_process_id += 1;
        log::trace!("t={:.6} spawn {} {}", self.now, process.name(), id);
        self.processes.insert(id, Box::new(process));
        self.push_event(self.now, id);
        id
    }

    /// Schedule `process` to resume after `delay` seconds.
    ///
    /// Only `step` reschedules a process, right after it returned
    /// [`Step::Sleep`], so each live process has exactly one pending event.
    /// A negative, NaN or infinite delay is rejected; it is never clamped.
    fn schedule(&mut self, delay: f64, process: ProcessId) -> Result<(), SimulationError> {
        if !delay.is_finite() || delay < 0.0 {
            log::error!("Rejected delay {} for process {} at t={}", delay, process, self.now);
            return Err(SimulationError::InvalidDelay(delay));
        }
        self.push_event(self.now + delay, process);
        Ok(())
    }

    fn push_event(&mut self, time: f64, process: ProcessId) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.schedule(ScheduledEvent::new(time, sequence, process));
    }

    /// Execute the earliest pending resumption.
    ///
    /// Returns `Ok(true)` if more events remain afterwards.
    pub(crate) fn step(&mut self, world: &mut W) -> Result<bool, SimulationError> {
        let Some(event) = self.queue.pop_earliest() else {
            return Ok(false);
        };

        debug_assert!(event.time() >= self.now, "event at {} precedes clock {}", event.time(), self.now);
        self.now = event.time();
        self.events_processed += 1;
        log::trace!("t={:.6} resume {} (event {})", self.now, event.process(), event.sequence());

        let Some(mut process) = self.processes.remove(&event.process()) else {
            log::warn!("Event for unknown process {} at t={} ignored", event.process(), self.now);
            return Ok(!self.queue.is_empty());
        };

        match process.resume(world, self)? {
            Step::Sleep(delay) => {
                self.schedule(delay, event.process())?;
                self.processes.insert(event.process(), process);
            }
            Step::Done => {
                log::trace!("t={:.6} {} {} finished", self.now, process.name(), event.process());
            }
        }

        Ok(!self.queue.is_empty())
    }

    /// Run events until the queue is empty or the next event lies beyond `end_time`.
    ///
    /// Events scheduled while running are executed in the same call when they
    /// fall within the horizon. When the run stops the clock is moved forward
    /// to `end_time`.
    pub(crate) fn run_until(&mut self, world: &mut W, end_time: f64) -> Result<(), SimulationError> {
        if !end_time.is_finite() || end_time < self.now {
            return Err(SimulationError::InvalidConfiguration(format!("run horizon {} is before the current time {}", end_time, self.now)));
        }

        while let Some(next) = self.next_event_time() {
            if next > end_time {
                break;
            }
            self.step(world)?;
        }

        self.now = end_time;
        log::debug!(
            "Run stopped at t={} after {} events, {} still pending",
            self.now,
            self.events_processed,
            self.queue.len()
        );
        Ok(())
    }
}

impl<W> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}
