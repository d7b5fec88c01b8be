//! # Worker abstraction.
//!
//! The code running inside a worker thread is opaque to the supervisor. It is
//! provided as a [`Worker`]; the supervisor only observes its lifecycle
//! (online, `started`, exit code) and the messages it sends.

use async_trait::async_trait;

use crate::error::WorkerError;
use crate::workers::WorkerContext;

/// # Shared handle to a worker implementation.
///
/// One instance serves every slot; use [`WorkerContext::role`] to branch.
pub type WorkerRef = std::sync::Arc<dyn Worker>;

/// # Body of a worker thread.
///
/// `run` executes on a dedicated OS thread inside its own current-thread
/// tokio runtime. Returning `Ok(())` is exit code `0`; an error maps to
/// [`WorkerError::exit_code`] and a non-zero code makes the supervisor respawn
/// the slot. A panic is reported as exit code `1`.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use appvisor::{Worker, WorkerContext, WorkerError};
///
/// struct Idle;
///
/// #[async_trait]
/// impl Worker for Idle {
///     async fn run(&self, mut ctx: WorkerContext) -> Result<(), WorkerError> {
///         ctx.started();
///         ctx.stopped().await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Runs until the worker decides to exit (normally after a `stop` event).
    async fn run(&self, ctx: WorkerContext) -> Result<(), WorkerError>;
}
