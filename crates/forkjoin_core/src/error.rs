use std::fmt;

use crate::Spawner;

/// Failures surfaced by [`crate::init`] and [`crate::SchedulerBuilder::run`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// `nthreads` or `qlen` was out of range at construction time.
    #[error("invalid scheduler configuration: {reason}")]
    ConfigInvalid {
        /// Human-readable description of which parameter was invalid.
        reason: &'static str,
    },

    /// The OS refused to hand out a thread or allocation needed to start the scheduler.
    #[error("failed to acquire a resource needed to start the scheduler: {reason}")]
    ResourceExhausted {
        /// Description of the resource that could not be acquired.
        reason: String,
    },

    /// A worker's deque was full when a task was spawned onto it.
    ///
    /// Surfaced here only as a plain variant; [`Spawner::spawn`] itself
    /// returns the richer [`SpawnError`], which this variant is built from
    /// via [`From<SpawnError>`].
    #[error("worker {worker} deque is full (capacity {capacity})")]
    CapacityExceeded {
        /// Index of the worker whose deque rejected the task.
        worker: usize,
        /// Configured capacity (`qlen`) of that worker's deque.
        capacity: usize,
    },

    /// `spawn` was invoked from a thread holding no [`Spawner`] capability.
    ///
    /// Unreachable through this crate's public API: a `Spawner` only ever
    /// exists for the duration of the seed call or a running task, so there
    /// is no code path by which a foreign thread can reach `spawn` at all.
    /// The variant is retained for parity with the scheduler's error
    /// taxonomy; see `DESIGN.md` for the reasoning.
    #[error("spawn called from a thread that is neither a worker nor the initializer")]
    InvalidCaller,
}

/// A task rejected by [`Spawner::spawn`] because its target deque was full.
///
/// Carries the task back so the caller can run it inline instead of
/// discarding it, per the boundary behavior that a full deque must let the
/// caller retry synchronously.
pub struct SpawnError {
    pub(crate) task: Box<dyn FnOnce(&Spawner) + Send + 'static>,
    /// Index of the worker whose deque rejected the task.
    pub worker: usize,
    /// Configured capacity (`qlen`) of that worker's deque.
    pub capacity: usize,
}

impl SpawnError {
    /// Runs the rejected task on the calling thread instead of the scheduler.
    pub fn run_inline(self, spawner: &Spawner) {
        (self.task)(spawner)
    }
}

impl fmt::Debug for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnError")
            .field("worker", &self.worker)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "worker {} deque is full (capacity {})",
            self.worker, self.capacity
        )
    }
}

impl std::error::Error for SpawnError {}

impl From<SpawnError> for Error {
    fn from(e: SpawnError) -> Self {
        Error::CapacityExceeded {
            worker: e.worker,
            capacity: e.capacity,
        }
    }
}
