//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(WorkerContext) -> Fut`, producing a fresh
//! future per spawned thread. Nothing is shared between restarts unless the
//! closure captures an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use appvisor::{WorkerContext, WorkerError, WorkerFn, WorkerRef};
//!
//! let w: WorkerRef = WorkerFn::arc(|mut ctx: WorkerContext| async move {
//!     ctx.started();
//!     ctx.stopped().await;
//!     Ok::<_, WorkerError>(())
//! });
//! # let _ = w;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::workers::{Worker, WorkerContext};

/// Function-backed worker implementation.
pub struct WorkerFn<F> {
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`](crate::WorkerRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: Fn(WorkerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError> {
        (self.f)(ctx).await
    }
}
