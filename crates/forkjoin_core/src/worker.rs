use std::sync::Mutex;

use crate::deque::Deque;
use crate::rng::XorShift64Star;

/// One worker: a stable index and its owned deque. The OS thread itself is
/// not stored here — it is owned by the `JoinHandle` kept in
/// `SchedulerBuilder::run`'s local state, since nothing inside the worker
/// loop needs to address its own thread handle.
pub(crate) struct Worker {
    pub(crate) index: usize,
    pub(crate) deque: Deque,
    rng: Mutex<XorShift64Star>,
}

impl Worker {
    pub(crate) fn new(index: usize, deque_capacity: usize) -> Self {
        Self {
            index,
            deque: Deque::new(deque_capacity),
            rng: Mutex::new(XorShift64Star::seeded(index)),
        }
    }

    /// A random value in `0..modulus`, used to pick the stealing scan's
    /// starting offset. Locked per-call; only ever touched by this worker's
    /// own thread, so contention never occurs in practice.
    pub(crate) fn random_offset(&self, modulus: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .next_usize(modulus)
    }
}
