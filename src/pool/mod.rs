//! # Worker pool allocation
//!
//! [`WorkerPool`] tracks the task-execution workers (by slot id inside the
//! supervisor) and hands them out in two ways:
//!
//! - **Exclusive capture**: `capture()` reserves one worker until `release()`;
//!   when none is free the request queues (FIFO) for at most `wait`.
//! - **Shared dispatch**: `next()` picks a free worker round-robin without
//!   reserving it.
//!
//! ## Invariants
//! - A member is either free or captured; shared dispatch never changes that.
//! - A released member goes to the oldest waiting capture, never to a newer one.
//! - A capture that timed out is removed from the queue and never receives a member.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use appvisor::WorkerPool;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = WorkerPool::new(Some(Duration::from_millis(50)));
//! pool.add(3usize);
//!
//! let worker = pool.capture().await.unwrap();
//! assert_eq!(pool.next(), None);          // captured, not shared
//! assert!(pool.capture().await.is_err()); // times out after 50ms
//! pool.release(&worker).unwrap();
//! assert_eq!(pool.next(), Some(3));
//! # }
//! ```

mod core;

pub use self::core::WorkerPool;
