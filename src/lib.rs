#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use forkjoin_core as core;
#[cfg(feature = "workloads")]
#[cfg_attr(docsrs, doc(cfg(feature = "workloads")))]
pub use forkjoin_workloads as workloads;

pub use forkjoin_core::{Error, SchedulerBuilder, Spawner, SpawnError, init};
