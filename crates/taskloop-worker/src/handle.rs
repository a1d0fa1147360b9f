use std::sync::Arc;

use tokio::task::JoinHandle;

use taskloop_core::WorkerError;

use crate::worker::Worker;

/// A worker whose loop was handed to the tokio runtime by [`Worker::spawn`].
pub struct WorkerHandle<T> {
    worker: Arc<Worker<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + Sync + 'static> WorkerHandle<T> {
    pub(crate) fn new(worker: Arc<Worker<T>>, task: JoinHandle<()>) -> Self {
        Self { worker, task }
    }

    pub fn worker(&self) -> &Arc<Worker<T>> {
        &self.worker
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit on its own (after `set_running(false)`).
    pub async fn join(self) -> Result<(), WorkerError> {
        self.task.await.map_err(|e| {
            tracing::error!(worker = %self.worker.name(), error = %e, "Worker task failed");
            WorkerError::Panicked(e.to_string())
        })
    }

    /// Stop the worker, wake it from any sleep and wait for the loop to exit.
    ///
    /// Does not cancel a `process` call that is already running; the loop exits
    /// once that call and its callbacks have completed.
    pub async fn shutdown(self) -> Result<(), WorkerError> {
        self.worker.shutdown();
        self.join().await
    }
}
