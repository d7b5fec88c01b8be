//! # Inter-thread message routing.
//!
//! The [`Router`] looks at one message from worker `from` and decides what the
//! supervisor does with it:
//!
//! ```text
//! Event "started"            → Route::Started
//! Event (other)              → Route::Handled           (ignored)
//! Task                       → Route::Forward(scheduler)
//! Invoke Done   exclusive    → pool.release(from)
//! Invoke Done   shared       → Route::Handled
//! Invoke Request shared      → pool.next() → Route::Forward(worker) | error reply
//! Invoke Request exclusive   → deferred capture task
//!                                 ├─ Ok(worker) → Signal::Dispatch { to: worker, .. }
//!                                 └─ Err        → error reply + CaptureTimedOut
//! ```
//!
//! Replies always go to the requester's own port, which moves with the message.

use tokio::sync::mpsc;
use tracing::warn;

use crate::core::Signal;
use crate::error::PoolError;
use crate::events::{Bus, Event, EventKind};
use crate::messages::{InvokeName, Message, STARTED};
use crate::pool::WorkerPool;

/// Decision the supervisor applies for one routed message.
#[derive(Debug)]
pub(crate) enum Route {
    /// The sender reported `started`.
    Started,
    /// Deliver `message` to slot `to`.
    Forward { to: usize, message: Message },
    /// Nothing left for the supervisor to do.
    Handled,
}

/// Stateless dispatcher over the pool and the scheduler slot.
pub(crate) struct Router {
    scheduler_id: usize,
    pool: WorkerPool<usize>,
    signals: mpsc::UnboundedSender<Signal>,
    bus: Bus,
}

impl Router {
    pub(crate) fn new(
        scheduler_id: usize,
        pool: WorkerPool<usize>,
        signals: mpsc::UnboundedSender<Signal>,
        bus: Bus,
    ) -> Self {
        Self {
            scheduler_id,
            pool,
            signals,
            bus,
        }
    }

    /// Routes one message received from slot `from`.
    ///
    /// Must be called on the supervisor runtime: exclusive requests spawn a task.
    pub(crate) fn route(&self, from: usize, message: Message) -> Route {
        match message {
            Message::Event { name } if name == STARTED => Route::Started,
            Message::Event { .. } => Route::Handled,

            msg @ Message::Task { .. } => Route::Forward {
                to: self.scheduler_id,
                message: msg,
            },

            Message::Invoke {
                name: InvokeName::Done,
                exclusive,
                ..
            } => {
                if exclusive {
                    if let Err(err) = self.pool.release(&from) {
                        warn!(slot = from, error = %err, "done from a worker that was not captured");
                    }
                }
                Route::Handled
            }

            msg @ Message::Invoke {
                name: InvokeName::Request,
                exclusive: false,
                ..
            } => match self.pool.next() {
                Some(to) => Route::Forward { to, message: msg },
                None => {
                    if let Some(port) = msg.port() {
                        port.fail(PoolError::NoThreadAvailable);
                    }
                    Route::Handled
                }
            },

            msg @ Message::Invoke {
                name: InvokeName::Request,
                exclusive: true,
                ..
            } => {
                self.defer_capture(from, msg);
                Route::Handled
            }
        }
    }

    /// Waits for an exclusive worker off the supervisor loop.
    fn defer_capture(&self, from: usize, message: Message) {
        let pool = self.pool.clone();
        let signals = self.signals.clone();
        let bus = self.bus.clone();

        tokio::spawn(async move {
            match pool.capture().await {
                Ok(to) => {
                    if signals.send(Signal::Dispatch { to, message }).is_err() {
                        // Supervisor is gone; keep the pool consistent for other clones.
                        let _ = pool.release(&to);
                    }
                }
                Err(err) => {
                    if let Some(port) = message.port() {
                        port.fail(err);
                    }
                    bus.publish(
                        Event::new(EventKind::CaptureTimedOut)
                            .with_slot(from)
                            .with_reason(err.to_string()),
                    );
                }
            }
        });
    }
}
