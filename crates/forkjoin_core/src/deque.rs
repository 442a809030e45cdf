use std::sync::Mutex;

use crate::task::Task;

/// A bounded circular-buffer deque, one per worker.
///
/// `bottom` is the owner's end (push and pop, LIFO); `top` is the thief's
/// end (steal only, FIFO against the owner). One slot of the backing array
/// is always kept empty so that `bottom == top` unambiguously means empty —
/// a deque constructed with `capacity` slots holds at most `capacity - 1`
/// tasks.
///
/// Both ends are guarded by the same lock. The reference implementation
/// this is ported from does the same (the owner takes its own mutex to pop,
/// not just thieves); a split lock-free fast path for the owner is possible
/// (see the module docs on alternatives) but is not needed to meet the
/// deque's contract.
pub(crate) struct Deque {
    state: Mutex<State>,
}

struct State {
    slots: Box<[Option<Task>]>,
    bottom: usize,
    top: usize,
}

impl Deque {
    /// `capacity` is the raw slot count, i.e. `qlen + 1`.
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 2, "capacity must reserve one sacrificial slot");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            state: Mutex::new(State {
                slots: slots.into_boxed_slice(),
                bottom: 0,
                top: 0,
            }),
        }
    }

    /// Raw slot count (`qlen + 1`); the number of tasks that can be held is one less.
    pub(crate) fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Push at the owner's end. Fails (returning the task back) if the deque is full.
    pub(crate) fn push_bottom(&self, task: Task) -> Result<(), Task> {
        let mut state = self.lock();
        let cap = state.slots.len();
        let next = (state.bottom + 1) % cap;
        if next == state.top {
            return Err(task);
        }
        state.slots[state.bottom] = Some(task);
        state.bottom = next;
        Ok(())
    }

    /// Pop at the owner's end (LIFO, most recently pushed first).
    pub(crate) fn pop_bottom(&self) -> Option<Task> {
        let mut state = self.lock();
        if state.bottom == state.top {
            return None;
        }
        let cap = state.slots.len();
        state.bottom = (state.bottom + cap - 1) % cap;
        state.slots[state.bottom].take()
    }

    /// Steal at the thief's end (FIFO, oldest resident first).
    pub(crate) fn steal_top(&self) -> Option<Task> {
        let mut state = self.lock();
        if state.bottom == state.top {
            return None;
        }
        let cap = state.slots.len();
        let task = state.slots[state.top].take();
        state.top = (state.top + 1) % cap;
        task
    }

    /// Occupied slot count; for tests and diagnostics only.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        let state = self.lock();
        let cap = state.slots.len();
        (state.bottom + cap - state.top) % cap
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Spawner;

    fn task(n: u32, sink: std::sync::Arc<std::sync::Mutex<Vec<u32>>>) -> Task {
        Task::new(move |_: &Spawner| sink.lock().unwrap().push(n))
    }

    #[test]
    fn empty_deque_yields_nothing() {
        let d = Deque::new(4);
        assert!(d.pop_bottom().is_none());
        assert!(d.steal_top().is_none());
        assert_eq!(d.len(), 0);
    }

    #[test]
    fn push_then_pop_is_lifo() {
        let sink = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let d = Deque::new(4);
        d.push_bottom(task(1, sink.clone())).ok().unwrap();
        d.push_bottom(task(2, sink.clone())).ok().unwrap();
        d.push_bottom(task(3, sink.clone())).ok().unwrap();
        assert_eq!(d.len(), 3);

        let spawner = Spawner::for_test();
        for _ in 0..3 {
            d.pop_bottom().unwrap().run(&spawner);
        }
        assert_eq!(*sink.lock().unwrap(), vec![3, 2, 1]);
    }

    #[test]
    fn steal_is_fifo_and_capacity_is_one_less_than_slots() {
        let sink = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let d = Deque::new(3); // holds at most 2 tasks
        d.push_bottom(task(1, sink.clone())).ok().unwrap();
        d.push_bottom(task(2, sink.clone())).ok().unwrap();
        assert!(d.push_bottom(task(3, sink.clone())).is_err(), "deque should be full");

        let spawner = Spawner::for_test();
        let stolen = d.steal_top();
        assert!(stolen.is_some(), "oldest task should be stealable");
        stolen.unwrap().run(&spawner);
        assert_eq!(*sink.lock().unwrap(), vec![1], "steal_top takes the oldest resident");
        assert_eq!(d.len(), 1);

        // room for one more now
        d.push_bottom(task(4, sink.clone())).ok().unwrap();
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn full_then_empty_are_distinguishable() {
        let d = Deque::new(2); // capacity 1 task (qlen == 1 boundary case)
        let sink = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        d.push_bottom(task(1, sink.clone())).ok().unwrap();
        assert!(d.push_bottom(task(2, sink.clone())).is_err());
        assert!(d.pop_bottom().is_some());
        assert!(d.pop_bottom().is_none());
    }
}
