//! # Worker abstractions.
//!
//! - [`Worker`] trait for the code that runs inside a worker thread
//! - [`WorkerFn`] closure-backed implementation
//! - [`WorkerRef`] shared reference (`Arc<dyn Worker>`)
//! - [`WorkerContext`] the worker's channel pair to the supervisor

mod context;
mod worker;
mod worker_fn;

pub(crate) use context::Outbox;
pub use context::WorkerContext;
pub use worker::{Worker, WorkerRef};
pub use worker_fn::WorkerFn;
