//! # Event subscribers for the appvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► event listener ──► SubscriberSet
//!                                                               │
//!                                                  ┌────────────┼──────────┐
//!                                                  ▼            ▼          ▼
//!                                              LogWriter     Metrics    Custom
//! ```

mod embedded;
mod subscribe;
mod subscriber_set;

pub use embedded::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::panic_message;
