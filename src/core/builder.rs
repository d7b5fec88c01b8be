use std::sync::Arc;

use tracing::debug;

use super::supervisor::Supervisor;
use crate::{
    config::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    workers::WorkerRef,
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    worker: WorkerRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
    interrupt_byte: bool,
}

impl SupervisorBuilder {
    /// Creates a builder for the given configuration and worker body.
    pub fn new(cfg: Config, worker: WorkerRef) -> Self {
        Self {
            cfg,
            worker,
            subscribers: Vec::new(),
            interrupt_byte: false,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (worker lifecycle, capture timeouts,
    /// shutdown) through dedicated tasks with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Also stop on the interrupt byte `0x03` when stdin is a terminal.
    ///
    /// The terminal is switched to raw input for the run and restored when
    /// [`Supervisor::run`] returns.
    pub fn with_interrupt_byte(mut self, enabled: bool) -> Self {
        self.interrupt_byte = enabled;
        self
    }

    /// Builds the supervisor.
    ///
    /// Must be called inside a tokio runtime: subscriber workers and the event
    /// listener are spawned here, so no event published later is missed.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        if subs.is_empty() {
            debug!("no event subscribers attached");
        } else {
            debug!(subscribers = subs.len(), "event subscribers attached");
        }
        Supervisor::new_internal(self.cfg, self.worker, bus, subs, self.interrupt_byte)
    }
}
