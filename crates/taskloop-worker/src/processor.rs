//! Payload processor trait
//!
//! Each worker role implements this trait once; the worker calls `process` for
//! every payload it dequeues.

use anyhow::Result;
use async_trait::async_trait;

/// Processing step for one payload.
///
/// Errors are routed to the payload's fail callback. A panic is caught by the
/// worker and reported the same way.
#[async_trait]
pub trait Processor<T>: Send + Sync {
    async fn process(&self, payload: &T) -> Result<()>;
}

/// Adapts a synchronous closure into a [`Processor`].
pub struct FnProcessor<F>(F);

impl<F> FnProcessor<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<T, F> Processor<T> for FnProcessor<F>
where
    T: Send + Sync,
    F: Fn(&T) -> Result<()> + Send + Sync,
{
    async fn process(&self, payload: &T) -> Result<()> {
        (self.0)(payload)
    }
}
