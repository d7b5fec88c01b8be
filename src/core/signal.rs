//! Supervisor inbox protocol.
//!
//! Everything that changes supervisor state arrives as a [`Signal`] on one
//! unbounded channel and is handled on the supervisor loop, one at a time.
//! Signals from a single worker thread keep their send order.

use crate::messages::Message;

/// What a worker thread reports about itself.
#[derive(Debug)]
pub(crate) enum WorkerEvent {
    /// The thread began executing.
    Online,
    /// The worker sent a message to the supervisor.
    Message(Message),
    /// The thread finished with an exit code.
    Exit(i32),
}

/// Inbox item of the supervisor loop.
#[derive(Debug)]
pub(crate) enum Signal {
    /// Report from the worker at slot `id`, spawn generation `generation`.
    Worker {
        id: usize,
        generation: u64,
        event: WorkerEvent,
    },
    /// A deferred exclusive capture resolved; deliver `message` to slot `to`.
    Dispatch { to: usize, message: Message },
    /// The startup deadline timer fired.
    StartupDeadline,
    /// Shutdown was requested through a [`SupervisorHandle`](crate::SupervisorHandle).
    Shutdown { reason: &'static str },
    /// The interrupt byte was read from the terminal.
    Interrupt { trigger: &'static str },
}
