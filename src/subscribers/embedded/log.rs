//! # LogWriter: events to `tracing`
//!
//! A subscriber that turns every [`Event`] into one structured `tracing` record.
//! Install a `tracing` subscriber first (see [`init_tracing`](crate::observability::init_tracing)).
//!
//! ## Example output (compact format)
//! ```text
//! DEBUG worker spawned slot=Some(3) role=Some("pool-worker") generation=Some(1)
//! WARN  worker exited slot=Some(3) role=Some("pool-worker") code=Some(7) active=Some(3)
//! WARN  worker restarting slot=Some(3) role=Some("pool-worker") generation=Some(2) code=Some(7)
//! INFO  shutdown requested reason=Some("SIGTERM")
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot;
        let role = e.role.map(|r| r.as_str());
        let reason = e.reason.as_deref();

        match e.kind {
            EventKind::WorkerSpawned => {
                debug!(?slot, ?role, generation = ?e.generation, "worker spawned");
            }
            EventKind::WorkerOnline => {
                debug!(?slot, ?role, "worker online");
            }
            EventKind::WorkerStarted => {
                info!(?slot, ?role, active = ?e.active, "worker started");
            }
            EventKind::WorkerExited => match e.code {
                Some(0) => info!(?slot, ?role, active = ?e.active, "worker exited"),
                code => warn!(?slot, ?role, ?code, active = ?e.active, "worker exited"),
            },
            EventKind::WorkerRestarting => {
                warn!(?slot, ?role, generation = ?e.generation, code = ?e.code, "worker restarting");
            }
            EventKind::AllStarted => {
                info!(active = ?e.active, "all workers started");
            }
            EventKind::StartupTimeout => {
                warn!(active = ?e.active, pending = ?reason, "startup deadline expired");
            }
            EventKind::CaptureTimedOut => {
                warn!(requester = ?slot, ?reason, "exclusive capture timed out");
            }
            EventKind::DeliveryFailed => {
                warn!(to = ?slot, ?reason, "message delivery failed");
            }
            EventKind::ShutdownRequested => {
                info!(?reason, "shutdown requested");
            }
            EventKind::AllStopped => {
                info!("all workers stopped");
            }
            EventKind::SubscriberOverflow => {
                warn!(?reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                warn!(?reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
