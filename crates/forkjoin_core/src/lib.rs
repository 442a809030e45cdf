//! A bounded, work-stealing fork-join task scheduler.
//!
//! A fixed pool of worker threads, each owning a bounded deque of tasks.
//! Task bodies run to completion and may [`Spawner::spawn`] more tasks onto
//! the calling worker's own deque; idle workers steal from one another until
//! the whole pool is simultaneously idle and empty, at which point
//! [`init`]/[`SchedulerBuilder::run`] returns.
//!
//! ```
//! use forkjoin_core::{init, Spawner};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! let seed_counter = counter.clone();
//! init(4, 64, move |spawner: &Spawner| {
//!     for _ in 0..16 {
//!         let counter = seed_counter.clone();
//!         let _ = spawner.spawn(move |_: &Spawner| {
//!             counter.fetch_add(1, Ordering::Relaxed);
//!         });
//!     }
//! })
//! .unwrap();
//!
//! assert_eq!(counter.load(Ordering::Relaxed), 16);
//! ```
//!
//! See `SPEC_FULL.md` at the workspace root for the full design: the deque
//! invariants, the stealing policy, and the termination protocol.

mod deque;
mod error;
mod rng;
mod scheduler;
mod stealing;
mod task;
mod worker;

pub use error::{Error, SpawnError};
pub use scheduler::{init, SchedulerBuilder, Spawner};
