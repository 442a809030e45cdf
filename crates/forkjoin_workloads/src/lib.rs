//! Benchmark workloads for [`forkjoin_core`]: a recursive-subdivision
//! Mandelbrot renderer, a parallel quicksort, a minimal BMP writer, and a
//! small benchmark report type. Each workload is an ordinary client of the
//! scheduler's public API — this crate has no special access to
//! `forkjoin_core`'s internals.

pub mod bmp;
pub mod mandelbrot;
pub mod quicksort;
pub mod report;

use forkjoin_core::Spawner;

/// Spawns `task`, falling back to running it inline on the calling worker
/// when the target deque is full. Every workload in this crate uses this
/// instead of `unwrap()`-ing `Spawner::spawn`, since a full deque is an
/// expected, recoverable condition, not a bug.
pub(crate) fn spawn_or_inline(spawner: &Spawner, task: impl FnOnce(&Spawner) + Send + 'static) {
    if let Err(rejected) = spawner.spawn(task) {
        rejected.run_inline(spawner);
    }
}
