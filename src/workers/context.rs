//! # Worker-side view of the supervisor.
//!
//! A [`WorkerContext`] is handed to [`Worker::run`](crate::Worker::run) on the
//! worker's own thread. It is the only way a worker talks to the supervisor:
//!
//! ```text
//! worker thread                               supervisor loop
//!   ctx.recv()  ◄─────── inbox (Message) ─────── post / broadcast stop
//!   ctx.send()  ───────► Signal::Worker ───────► router
//! ```

use serde_json::Value;
use tokio::sync::mpsc;

use crate::core::{Role, Signal, SlotInfo, WorkerEvent};
use crate::messages::{Message, Port, PortReceiver};

/// Sending half from a worker thread into the supervisor inbox.
#[derive(Clone)]
pub(crate) struct Outbox {
    id: usize,
    generation: u64,
    tx: mpsc::UnboundedSender<Signal>,
}

impl Outbox {
    pub(crate) fn new(id: usize, generation: u64, tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { id, generation, tx }
    }

    /// Returns `false` once the supervisor loop is gone.
    pub(crate) fn report(&self, event: WorkerEvent) -> bool {
        self.tx
            .send(Signal::Worker {
                id: self.id,
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}

/// Execution context of one worker thread.
pub struct WorkerContext {
    slot: SlotInfo,
    generation: u64,
    inbox: mpsc::UnboundedReceiver<Message>,
    outbox: Outbox,
}

impl WorkerContext {
    pub(crate) fn new(
        slot: SlotInfo,
        generation: u64,
        inbox: mpsc::UnboundedReceiver<Message>,
        outbox: Outbox,
    ) -> Self {
        Self {
            slot,
            generation,
            inbox,
            outbox,
        }
    }

    /// Slot id (stable across restarts).
    pub fn id(&self) -> usize {
        self.slot.id
    }

    /// Role of the slot.
    pub fn role(&self) -> Role {
        self.slot.role
    }

    /// Port a server slot should listen on.
    pub fn port(&self) -> Option<u16> {
        self.slot.port
    }

    /// Spawn generation; `1` for the first worker of a slot, incremented on every restart.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the next message from the supervisor.
    ///
    /// Returns `None` once the supervisor dropped this worker's inbox.
    pub async fn recv(&mut self) -> Option<Message> {
        self.inbox.recv().await
    }

    /// Sends a message to the supervisor; `false` if the supervisor is gone.
    pub fn send(&self, message: Message) -> bool {
        self.outbox.report(WorkerEvent::Message(message))
    }

    /// Reports that this worker is ready to serve.
    pub fn started(&self) -> bool {
        self.send(Message::started())
    }

    /// Sends a task to the scheduler and returns the receiver for its replies.
    pub fn task(&self, payload: Value) -> Option<PortReceiver> {
        let (port, rx) = Port::channel();
        self.send(Message::task_with_port(payload, port)).then_some(rx)
    }

    /// Asks for a pool worker to run `payload` and returns the reply receiver.
    pub fn invoke(&self, payload: Value, exclusive: bool) -> Option<PortReceiver> {
        let (port, rx) = Port::channel();
        self.send(Message::request(payload, port, exclusive))
            .then_some(rx)
    }

    /// Waits until the supervisor broadcasts `stop` (or drops the inbox).
    ///
    /// Messages received meanwhile are discarded.
    pub async fn stopped(&mut self) {
        while let Some(message) = self.recv().await {
            if message.is_stop() {
                return;
            }
        }
    }
}
