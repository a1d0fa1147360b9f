//! Worker engine: unbounded FIFO queue, drain loop and cooperative cancellation.
//!
//! A worker owns its queue. Any number of producers may schedule payloads while a
//! single loop ([`Worker::run`]) drains it:
//!
//! 1. Pop the oldest context and run the processor on its payload.
//! 2. On error call the fail callback, then always call the done callback.
//! 3. If fewer than [`QUEUE_DEBOUNCE_THRESHOLD`] items remain, pause for
//!    [`QUEUE_ITEMS_DELAY`] before the next item.
//! 4. Once the queue is empty, sleep for the configured poll delay.
//!
//! Stopping is cooperative: [`Worker::set_running`] is only observed once a drain
//! cycle (queue emptied, then the idle sleep) is over. It never cancels an
//! in-flight `process` call.
//! [`Worker::interrupt`] wakes the current (or next) sleep early.

use std::collections::VecDeque;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::Notify;
use uuid::Uuid;

use taskloop_core::{
    PollDelay, ProcessError, WorkerConfig, WorkerError, QUEUE_DEBOUNCE_THRESHOLD,
    QUEUE_ITEMS_DELAY,
};

use crate::context::{default_done, default_fail, TaskContext};
use crate::handle::WorkerHandle;
use crate::processor::{FnProcessor, Processor};

/// A sleep was cut short by [`Worker::interrupt`].
#[derive(Debug)]
struct Interrupted;

/// Clears the draining flag when the loop exits or its future is dropped.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Worker<T> {
    id: Uuid,
    name: String,
    poll_delay: Option<PollDelay>,
    processor: Arc<dyn Processor<T>>,
    queue: Mutex<VecDeque<TaskContext<T>>>,
    running: AtomicBool,
    draining: AtomicBool,
    interrupt: Notify,
}

impl<T> fmt::Debug for Worker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("poll_delay", &self.poll_delay)
            .field("running", &self.is_running())
            .field("queue_len", &self.queue_len())
            .finish_non_exhaustive()
    }
}

impl<T> Worker<T> {
    /// Instance id, used to tell apart workers sharing a name in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_delay(&self) -> Option<PollDelay> {
        self.poll_delay
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request the loop to stop (`false`) or keep going (`true`).
    ///
    /// Observed at the next loop check; an in-progress `process` call or sleep
    /// runs to completion first.
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Wake the loop out of its current sleep.
    ///
    /// If the loop is busy processing, its next sleep returns immediately instead.
    /// Has no effect on a loop started later.
    pub fn interrupt(&self) {
        self.interrupt.notify_one();
    }

    /// Stop the loop and wake it so the stop is observed promptly.
    pub fn shutdown(&self) {
        tracing::info!(worker = %self.name, worker_id = %self.id, "Worker shutdown requested");
        self.set_running(false);
        if self.draining.load(Ordering::SeqCst) {
            self.interrupt();
        }
    }

    /// Number of contexts waiting to be drained.
    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<TaskContext<T>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pop_next(&self) -> Option<TaskContext<T>> {
        self.queue().pop_front()
    }

    fn enqueue(&self, context: TaskContext<T>) {
        let depth = {
            let mut queue = self.queue();
            queue.push_back(context);
            queue.len()
        };
        tracing::trace!(worker = %self.name, queue_len = depth, "Payload scheduled");
    }
}

impl<T: Send + Sync + 'static> Worker<T> {
    pub fn builder(name: impl Into<String>) -> WorkerBuilder<T> {
        WorkerBuilder::new(name)
    }

    /// Create a worker without the builder's checks.
    ///
    /// A worker created with `poll_delay: None` is accepted here, but its
    /// [`run`](Worker::run) logs a warning and returns without processing.
    pub fn new<P>(name: impl Into<String>, processor: P, poll_delay: Option<PollDelay>) -> Self
    where
        P: Processor<T> + 'static,
    {
        Self::from_parts(name.into(), Arc::new(processor), poll_delay)
    }

    fn from_parts(
        name: String,
        processor: Arc<dyn Processor<T>>,
        poll_delay: Option<PollDelay>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            poll_delay,
            processor,
            queue: Mutex::new(VecDeque::new()),
            running: AtomicBool::new(true),
            draining: AtomicBool::new(false),
            interrupt: Notify::new(),
        }
    }

    /// Schedule a payload with the default callbacks.
    pub fn schedule(&self, payload: T) {
        self.enqueue(TaskContext::new(payload, default_done(), default_fail()));
    }

    pub fn schedule_with_done<D>(&self, payload: T, done: D)
    where
        D: FnOnce(&Worker<T>, T) + Send + 'static,
    {
        self.enqueue(TaskContext::new(payload, Box::new(done), default_fail()));
    }

    pub fn schedule_with_fail<F>(&self, payload: T, fail: F)
    where
        F: FnOnce(&Worker<T>, anyhow::Error) + Send + 'static,
    {
        self.enqueue(TaskContext::new(payload, default_done(), Box::new(fail)));
    }

    pub fn schedule_with<D, F>(&self, payload: T, done: D, fail: F)
    where
        D: FnOnce(&Worker<T>, T) + Send + 'static,
        F: FnOnce(&Worker<T>, anyhow::Error) + Send + 'static,
    {
        self.enqueue(TaskContext::new(payload, Box::new(done), Box::new(fail)));
    }

    /// Hand the loop to the tokio runtime.
    pub fn spawn(self: &Arc<Self>) -> WorkerHandle<T> {
        let worker = Arc::clone(self);
        let task = tokio::spawn(async move { worker.run().await });
        WorkerHandle::new(Arc::clone(self), task)
    }

    /// Drain the queue until the worker is stopped.
    ///
    /// Returns immediately (with a warning) when the worker has no poll delay or
    /// when another loop is already draining this worker.
    #[tracing::instrument(skip(self), fields(worker = %self.name, worker_id = %self.id))]
    pub async fn run(&self) {
        let Some(poll_delay) = self.poll_delay else {
            tracing::warn!(
                "Worker {} does not have a poll delay configured - cannot set worker delay! Aborting.",
                self.name
            );
            return;
        };

        if self.draining.swap(true, Ordering::SeqCst) {
            tracing::warn!("Worker loop is already running, refusing to start another one");
            return;
        }
        let _guard = DrainGuard(&self.draining);

        // Drop an interrupt left over from before this loop started.
        let _ = self.interrupt.notified().now_or_never();

        tracing::info!(poll_delay_ms = poll_delay.as_millis(), "Worker loop started");

        let delay = poll_delay.as_duration();
        while self.is_running() {
            if let Err(Interrupted) = self.run_delayed(delay).await {
                tracing::warn!("Worker sleep interrupted");
            }
        }

        tracing::info!(pending = self.queue_len(), "Worker loop stopped");
    }

    async fn run_delayed(&self, delay: Duration) -> Result<(), Interrupted> {
        while let Some(context) = self.pop_next() {
            self.process_one(context).await;

            if self.queue_len() < QUEUE_DEBOUNCE_THRESHOLD {
                self.sleep(QUEUE_ITEMS_DELAY).await?;
            }
        }

        self.sleep(delay).await
    }

    async fn process_one(&self, context: TaskContext<T>) {
        let (payload, done, fail) = context.into_parts();

        let outcome = AssertUnwindSafe(self.processor.process(&payload))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProcessError::from_panic(panic).into()));

        match outcome {
            Ok(()) => tracing::debug!(worker = %self.name, "Payload processed"),
            Err(error) => {
                tracing::debug!(worker = %self.name, error = %error, "Payload processing failed");
                fail(self, error);
            }
        }

        done(self, payload);
    }

    async fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.interrupt.notified() => Err(Interrupted),
        }
    }
}

/// Builds a [`Worker`], rejecting configurations without a poll delay or processor.
pub struct WorkerBuilder<T> {
    name: String,
    poll_delay: Option<PollDelay>,
    processor: Option<Arc<dyn Processor<T>>>,
}

impl<T: Send + Sync + 'static> WorkerBuilder<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            poll_delay: None,
            processor: None,
        }
    }

    pub fn poll_delay(mut self, poll_delay: PollDelay) -> Self {
        self.poll_delay = Some(poll_delay);
        self
    }

    pub fn poll_delay_ms(self, millis: u64) -> Self {
        self.poll_delay(PollDelay::from_millis(millis))
    }

    /// Take name and poll delay from `config`.
    pub fn config(mut self, config: WorkerConfig) -> Self {
        self.name = config.name;
        self.poll_delay = config.poll_delay;
        self
    }

    pub fn processor<P>(mut self, processor: P) -> Self
    where
        P: Processor<T> + 'static,
    {
        self.processor = Some(Arc::new(processor));
        self
    }

    pub fn process_fn<F>(self, f: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.processor(FnProcessor::new(f))
    }

    pub fn build(self) -> Result<Worker<T>, WorkerError> {
        let config = WorkerConfig {
            name: self.name,
            poll_delay: self.poll_delay,
        };
        config.validate()?;

        let Some(poll_delay) = config.poll_delay else {
            return Err(WorkerError::MissingPollDelay {
                worker: config.name,
            });
        };
        let Some(processor) = self.processor else {
            return Err(WorkerError::MissingProcessor {
                worker: config.name,
            });
        };

        Ok(Worker::from_parts(config.name, processor, Some(poll_delay)))
    }
}
