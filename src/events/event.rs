//! # Runtime events emitted by the supervisor, the router and subscriber workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Worker lifecycle**: spawn, online, started, exit, restart
//! - **Startup**: all workers started, startup deadline missed
//! - **Routing**: exclusive capture timed out, message could not be delivered
//! - **Shutdown / subscribers**: stop requested, all stopped, subscriber trouble
//!
//! The [`Event`] struct carries the metadata: slot id, role, generation, exit
//! code, the `active` counter after the transition, and a free-form reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use appvisor::{Event, EventKind, Role};
//!
//! let ev = Event::new(EventKind::WorkerExited)
//!     .with_slot(3)
//!     .with_role(Role::PoolWorker)
//!     .with_code(7);
//!
//! assert_eq!(ev.kind, EventKind::WorkerExited);
//! assert_eq!(ev.slot, Some(3));
//! assert_eq!(ev.code, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Role;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and "full"/"closed"
    SubscriberOverflow,

    // === Worker lifecycle events ===
    /// A worker thread was created for a slot.
    ///
    /// Sets: `slot`, `role`, `generation`
    WorkerSpawned,

    /// A worker thread began executing.
    ///
    /// Sets: `slot`, `role`, `generation`
    WorkerOnline,

    /// A worker reported `started`.
    ///
    /// Sets: `slot`, `role`, `generation`, `active`
    WorkerStarted,

    /// A worker thread finished.
    ///
    /// Sets: `slot`, `role`, `generation`, `code`, `active`
    WorkerExited,

    /// A crashed slot is being respawned.
    ///
    /// Sets: `slot`, `role`, `generation` (of the replacement), `code` (of the crash)
    WorkerRestarting,

    // === Startup events ===
    /// Every slot has reported `started`.
    ///
    /// Sets: `active`
    AllStarted,

    /// The startup deadline expired before every slot reported `started`.
    ///
    /// Sets: `active`, `reason` (slots still pending)
    StartupTimeout,

    // === Routing events ===
    /// An exclusive capture gave up waiting for a free pool worker.
    ///
    /// Sets: `slot` (requesting worker), `reason`
    CaptureTimedOut,

    /// A routed message could not be handed to its target worker.
    ///
    /// Sets: `slot` (target), `reason`
    DeliveryFailed,

    // === Shutdown events ===
    /// Shutdown requested (signal, interrupt byte, or handle).
    ///
    /// Sets: `reason` (trigger)
    ShutdownRequested,

    /// The last live worker exited.
    AllStopped,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot id, if applicable.
    pub slot: Option<usize>,
    /// Role of the slot, if applicable.
    pub role: Option<Role>,
    /// Spawn generation of the slot's worker.
    pub generation: Option<u64>,
    /// Worker exit code.
    pub code: Option<i32>,
    /// Value of the `active` counter after the transition.
    pub active: Option<usize>,
    /// Human-readable reason (pending slots, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            role: None,
            generation: None,
            code: None,
            active: None,
            reason: None,
        }
    }

    /// Attaches a slot id.
    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches a role.
    #[inline]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches a spawn generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches an exit code.
    #[inline]
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches the `active` counter.
    #[inline]
    pub fn with_active(mut self, active: usize) -> Self {
        self.active = Some(active);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_increases() {
        let a = Event::new(EventKind::AllStopped);
        let b = Event::new(EventKind::AllStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn overflow_reason_names_subscriber() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert_eq!(ev.kind, EventKind::SubscriberOverflow);
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
