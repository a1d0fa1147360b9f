//! Task context
//!
//! A scheduled payload paired with the callbacks that receive its outcome.

use crate::worker::Worker;

/// Invoked after every processing attempt with the payload.
pub type DoneCallback<T> = Box<dyn FnOnce(&Worker<T>, T) + Send + 'static>;

/// Invoked when processing a payload fails, before the done callback.
pub type FailCallback<T> = Box<dyn FnOnce(&Worker<T>, anyhow::Error) + Send + 'static>;

/// One queued unit of work. Immutable once scheduled.
pub struct TaskContext<T> {
    payload: T,
    done: DoneCallback<T>,
    fail: FailCallback<T>,
}

impl<T> TaskContext<T> {
    pub fn new(payload: T, done: DoneCallback<T>, fail: FailCallback<T>) -> Self {
        Self {
            payload,
            done,
            fail,
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_parts(self) -> (T, DoneCallback<T>, FailCallback<T>) {
        (self.payload, self.done, self.fail)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TaskContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// Done callback that does nothing.
pub fn default_done<T>() -> DoneCallback<T> {
    Box::new(|_worker, _payload| {})
}

/// Fail callback that logs the error at error level.
pub fn default_fail<T>() -> FailCallback<T> {
    Box::new(|worker, error| {
        tracing::error!(
            worker = %worker.name(),
            worker_id = %worker.id(),
            error = ?error,
            "Worker job failed"
        );
    })
}
