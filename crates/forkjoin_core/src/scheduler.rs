use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::thread::JoinHandle;

use crate::error::{Error, SpawnError};
use crate::stealing;
use crate::task::Task;
use crate::worker::Worker;

/// Guards the sleeping-worker count and the global quiescence flag.
///
/// This is the "shared lock" of the design: it is never held while a deque
/// lock is held, and a deque lock is never held while waiting on
/// [`Scheduler::condvar`].
struct Termination {
    sleeping: usize,
    /// Set once by whichever worker observes `sleeping == nthreads`, or by
    /// [`Scheduler::abort`] if initialization could not start every thread.
    /// Every worker re-checks this immediately after waking.
    terminated: bool,
}

/// Owns the worker pool for the lifetime of one [`SchedulerBuilder::run`] call.
pub(crate) struct Scheduler {
    workers: Box<[Worker]>,
    termination: Mutex<Termination>,
    condvar: Condvar,
}

impl Scheduler {
    fn new(nthreads: usize, deque_capacity: usize) -> Self {
        let workers = (0..nthreads)
            .map(|index| Worker::new(index, deque_capacity))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            workers,
            termination: Mutex::new(Termination {
                sleeping: 0,
                terminated: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn nthreads(&self) -> usize {
        self.workers.len()
    }

    fn lock_termination(&self) -> std::sync::MutexGuard<'_, Termination> {
        self.termination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wakes one sleeping worker, if any. Called after every successful spawn.
    fn wake_one(&self) {
        let _guard = self.lock_termination();
        self.condvar.notify_one();
    }

    /// Forces every worker to observe termination regardless of queue state.
    /// Used only when [`SchedulerBuilder::run`] cannot finish starting every
    /// worker thread and must unwind the threads it did manage to start.
    fn abort(&self) {
        let mut guard = self.lock_termination();
        guard.terminated = true;
        self.condvar.notify_all();
    }

    /// Implements the termination-check state (§4.5 of the design): increment
    /// the sleeping count, and either declare quiescence (last worker in) or
    /// wait to be woken by a spawn's signal or the quiescence broadcast.
    ///
    /// Returns `true` if the caller should go back to SEARCHING, `false` if
    /// the caller should transition to TERMINATED.
    fn enter_sleep_or_terminate(&self) -> bool {
        let mut guard = self.lock_termination();
        if guard.terminated {
            return false;
        }
        guard.sleeping += 1;
        if guard.sleeping == self.nthreads() {
            guard.terminated = true;
            self.condvar.notify_all();
            return false;
        }
        let mut guard = self
            .condvar
            .wait(guard)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.terminated {
            return false;
        }
        guard.sleeping -= 1;
        true
    }

    /// Runs one task, catching a panic so that a misbehaving task cannot take
    /// down the worker thread (and with it, the whole pool's join).
    fn dispatch(self: &Arc<Self>, index: usize, task: Task) {
        let spawner = Spawner {
            scheduler: Arc::clone(self),
            worker_index: index,
        };
        log::trace!("worker {index} running a task");
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| task.run(&spawner)));
        if let Err(payload) = outcome {
            log::error!(
                "task on worker {index} panicked: {}",
                panic_payload_message(&payload)
            );
        }
    }

    /// The work loop: own-pop, else steal, else sleep. Runs until this
    /// worker observes global quiescence (or a forced abort).
    fn worker_loop(self: &Arc<Self>, index: usize) {
        log::trace!("worker {index} starting");
        loop {
            if let Some(task) = self.workers[index].deque.pop_bottom() {
                self.dispatch(index, task);
                continue;
            }
            if let Some(task) = stealing::steal_one(&self.workers, index) {
                log::trace!("worker {index} stole a task");
                self.dispatch(index, task);
                continue;
            }
            if !self.enter_sleep_or_terminate() {
                break;
            }
        }
        log::trace!("worker {index} terminated");
    }
}

fn panic_payload_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// The capability threaded through every task closure: the only way to call
/// [`Spawner::spawn`]. A `Spawner` only ever exists for the duration of the
/// seed call or a running task, so there is no path by which a thread
/// outside the pool can reach `spawn`.
#[derive(Clone)]
pub struct Spawner {
    scheduler: Arc<Scheduler>,
    worker_index: usize,
}

impl Spawner {
    /// Enqueues `task` on the calling worker's own deque (bottom end).
    ///
    /// Fails with [`SpawnError`] if that deque is already at capacity; the
    /// returned error carries the rejected task back so the caller can run
    /// it inline instead of losing it.
    pub fn spawn(&self, task: impl FnOnce(&Spawner) + Send + 'static) -> Result<(), SpawnError> {
        let worker = &self.scheduler.workers[self.worker_index];
        match worker.deque.push_bottom(Task::new(task)) {
            Ok(()) => {
                self.scheduler.wake_one();
                Ok(())
            }
            Err(rejected) => {
                let capacity = worker.deque.capacity() - 1;
                log::warn!(
                    "worker {} deque full (capacity {capacity}), rejecting spawn",
                    self.worker_index
                );
                Err(SpawnError {
                    task: rejected.into_inner(),
                    worker: self.worker_index,
                    capacity,
                })
            }
        }
    }

    /// Index of the worker this handle was issued to.
    pub fn worker_index(&self) -> usize {
        self.worker_index
    }
}

#[cfg(test)]
impl Spawner {
    /// A standalone handle over a single-worker scheduler, for tests that
    /// need a `&Spawner` but don't care about the pool behind it.
    pub(crate) fn for_test() -> Self {
        Spawner {
            scheduler: Arc::new(Scheduler::new(1, 4)),
            worker_index: 0,
        }
    }
}

/// Configures and runs a [`Scheduler`].
///
/// Mirrors this codebase's existing thread-pool builders: a number of
/// threads, a queue length, a thread name template, a stack size, and
/// lifecycle hooks run on each worker thread as it starts and stops.
#[derive(Default)]
#[must_use]
pub struct SchedulerBuilder {
    thread_num: Option<usize>,
    queue_len: Option<usize>,
    thread_name: Option<String>,
    stack_size: Option<usize>,
    on_thread_spawn: Option<Arc<dyn Fn(usize) + Send + Sync + 'static>>,
    on_thread_destroy: Option<Arc<dyn Fn(usize) + Send + Sync + 'static>>,
}

const DEFAULT_QUEUE_LEN: usize = 1024;

impl SchedulerBuilder {
    /// Creates a builder with no options set; see individual setters for defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of worker threads. If unset, defaults to
    /// [`std::thread::available_parallelism`].
    pub fn thread_num(mut self, thread_num: usize) -> Self {
        self.thread_num = Some(thread_num);
        self
    }

    /// Per-worker deque capacity (`qlen`). Defaults to 1024.
    pub fn queue_len(mut self, queue_len: usize) -> Self {
        self.queue_len = Some(queue_len);
        self
    }

    /// Thread name prefix; threads are named `"{prefix}-{index}"`.
    pub fn thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = Some(thread_name.into());
        self
    }

    /// Overrides the OS stack size of every worker thread.
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = Some(stack_size);
        self
    }

    /// Callback run on each worker thread immediately after it starts.
    pub fn on_thread_spawn(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_thread_spawn = Some(Arc::new(f));
        self
    }

    /// Callback run on each worker thread immediately before it exits.
    pub fn on_thread_destroy(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_thread_destroy = Some(Arc::new(f));
        self
    }

    /// Builds the scheduler, seeds it with `seed`, starts every worker
    /// thread, and blocks until the whole computation is quiescent.
    ///
    /// Returns once every spawned task (transitively) has returned. On
    /// failure, any worker threads already started are forced to terminate
    /// and joined before the error is returned — nothing is leaked.
    pub fn run(self, seed: impl FnOnce(&Spawner) + Send + 'static) -> Result<(), Error> {
        let nthreads = match self.thread_num {
            Some(n) => n,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .map_err(|e| Error::ResourceExhausted {
                    reason: format!("could not query available_parallelism: {e}"),
                })?,
        };
        let qlen = self.queue_len.unwrap_or(DEFAULT_QUEUE_LEN);
        if qlen == 0 {
            return Err(Error::ConfigInvalid {
                reason: "qlen must be > 0",
            });
        }

        let scheduler = Arc::new(Scheduler::new(nthreads, qlen + 1));

        // Seed worker 0 before any thread starts: starting threads first
        // would let them observe an empty pool and race straight to
        // quiescence before the seed task ever lands.
        let seed_spawner = Spawner {
            scheduler: Arc::clone(&scheduler),
            worker_index: 0,
        };
        if let Err(rejected) = seed_spawner.spawn(seed) {
            return Err(Error::CapacityExceeded {
                worker: rejected.worker,
                capacity: rejected.capacity,
            });
        }

        let thread_name = self.thread_name.unwrap_or_else(|| "forkjoin".to_string());
        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(nthreads);
        for index in 0..nthreads {
            let scheduler = Arc::clone(&scheduler);
            let on_spawn = self.on_thread_spawn.clone();
            let on_destroy = self.on_thread_destroy.clone();
            let mut thread_builder = thread::Builder::new().name(format!("{thread_name}-{index}"));
            if let Some(stack_size) = self.stack_size {
                thread_builder = thread_builder.stack_size(stack_size);
            }
            let spawned = thread_builder.spawn(move || {
                if let Some(f) = &on_spawn {
                    f(index);
                }
                scheduler.worker_loop(index);
                if let Some(f) = &on_destroy {
                    f(index);
                }
            });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    log::error!("failed to spawn worker thread {index}: {e}");
                    scheduler.abort();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(Error::ResourceExhausted {
                        reason: format!("failed to spawn worker thread {index}: {e}"),
                    });
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                log::error!("a forkjoin worker thread panicked outside of task dispatch");
            }
        }

        Ok(())
    }
}

/// Runs a computation to completion on a fresh, bounded work-stealing pool.
///
/// `nthreads == 0` substitutes [`std::thread::available_parallelism`];
/// `nthreads < 0` and `qlen <= 0` fail with [`Error::ConfigInvalid`]. Blocks
/// until every spawned task, transitively, has returned.
pub fn init(
    nthreads: i32,
    qlen: i32,
    seed: impl FnOnce(&Spawner) + Send + 'static,
) -> Result<(), Error> {
    if nthreads < 0 {
        return Err(Error::ConfigInvalid {
            reason: "nthreads must be >= 0",
        });
    }
    if qlen <= 0 {
        return Err(Error::ConfigInvalid {
            reason: "qlen must be > 0",
        });
    }

    let mut builder = SchedulerBuilder::new().queue_len(qlen as usize);
    if nthreads > 0 {
        builder = builder.thread_num(nthreads as usize);
    }
    builder.run(seed)
}
