//! # Built-in subscribers
//!
//! - [`LogWriter`]: writes every event as a structured `tracing` record.

mod log;

pub use log::LogWriter;
