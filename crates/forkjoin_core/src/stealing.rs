//! Victim selection for the stealing step of the worker loop.

use crate::task::Task;
use crate::worker::Worker;

/// Picks a random starting offset and probes every other worker's deque in
/// order from there, stopping at the first successful steal.
///
/// Randomizing the start (rather than always scanning `0..n`) avoids a
/// convoy where every idle worker piles onto the same victim under a skewed
/// spawn tree.
pub(crate) fn steal_one(workers: &[Worker], self_index: usize) -> Option<Task> {
    let n = workers.len();
    if n <= 1 {
        return None;
    }
    let k = workers[self_index].random_offset(n);
    for i in 0..n {
        let victim = (self_index + k + i) % n;
        if victim == self_index {
            continue;
        }
        if let Some(task) = workers[victim].deque.steal_top() {
            return Some(task);
        }
    }
    None
}
