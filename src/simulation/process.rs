//! Suspendable processes driven by the scheduler.
//!
//! A process is an explicit state machine. Each call to [`Process::resume`]
//! runs the process up to its next suspension point and reports how long it
//! wants to sleep, or that it has finished. Whatever the process needs after
//! waking up lives in its own fields, so nothing is lost across a suspension.

use super::scheduler::Scheduler;
use super::types::SimulationError;

/// What a process wants after running one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Step {
    /// Suspend and resume after the given virtual delay (seconds).
    Sleep(f64),
    /// The process completed; it is dropped and never resumed again.
    Done,
}

/// A unit of work resumed by the [`Scheduler`].
///
/// `W` is the shared simulation world. Only one process runs at a time, so a
/// process gets exclusive access to the world and to the scheduler while it
/// runs; it can spawn further processes through the scheduler.
pub(crate) trait Process<W> {
    /// Short label used in trace logs.
    fn name(&self) -> &'static str;

    /// Run until the next suspension point.
    fn resume(&mut self, world: &mut W, scheduler: &mut Scheduler<W>) -> Result<Step, SimulationError>;
}
