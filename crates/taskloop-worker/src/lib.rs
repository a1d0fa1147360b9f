//! Taskloop Worker – deferred task queue drained by a dedicated loop.
//!
//! Producers call [`Worker::schedule`] (or one of its callback variants) from any
//! task or thread. The host hands [`Worker::run`] to its executor, or uses
//! [`Worker::spawn`] to get a [`WorkerHandle`]. Each payload goes through the
//! worker's [`Processor`], then its fail callback (on error) and done callback.

mod context;
mod handle;
mod processor;
mod worker;

pub use context::{default_done, default_fail, DoneCallback, FailCallback, TaskContext};
pub use handle::WorkerHandle;
pub use processor::{FnProcessor, Processor};
pub use worker::{Worker, WorkerBuilder};

pub use taskloop_core::{PollDelay, ProcessError, WorkerConfig, WorkerError};
