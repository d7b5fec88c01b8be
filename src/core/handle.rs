//! # One spawned worker thread.
//!
//! A [`WorkerHandle`] is the supervisor's side of a worker thread: the slot it
//! occupies, its spawn generation, its lifecycle state and the channel into the
//! thread. The thread itself:
//!
//! ```text
//! report Online
//!   └─► build current-thread runtime
//!         └─► worker.run(ctx)   (panics caught)
//!               ├─ Ok(())      → 0
//!               ├─ Err(e)      → e.exit_code()
//!               └─ panic       → 1
//! report Exit(code)
//! ```

use std::panic::AssertUnwindSafe;
use std::{io, thread};

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::error;

use crate::core::{Signal, SlotInfo, WorkerEvent};
use crate::messages::Message;
use crate::subscribers::panic_message;
use crate::workers::{Outbox, WorkerContext, WorkerRef};

/// Lifecycle state of a worker handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Thread created, nothing reported yet.
    Spawning,
    /// The thread reported online.
    Online,
    /// The worker sent `started`.
    Started,
    /// The thread reported its exit code.
    Exited,
}

/// Supervisor-side handle of one worker thread.
pub(crate) struct WorkerHandle {
    slot: SlotInfo,
    generation: u64,
    state: WorkerState,
    tx: mpsc::UnboundedSender<Message>,
}

impl WorkerHandle {
    /// Spawns the OS thread for `slot`.
    ///
    /// Every thread reports `Online` first and `Exit(code)` last, both tagged
    /// with `(slot.id, generation)`.
    pub(crate) fn spawn(
        slot: SlotInfo,
        generation: u64,
        worker: WorkerRef,
        signals: mpsc::UnboundedSender<Signal>,
    ) -> io::Result<Self> {
        let (tx, inbox) = mpsc::unbounded_channel();
        let outbox = Outbox::new(slot.id, generation, signals);

        thread::Builder::new()
            .name(format!("{}-{}", slot.role, slot.id))
            .spawn(move || {
                outbox.report(WorkerEvent::Online);
                let ctx = WorkerContext::new(slot, generation, inbox, outbox.clone());
                let code = run_worker(slot, worker, ctx);
                outbox.report(WorkerEvent::Exit(code));
            })?;

        Ok(Self {
            slot,
            generation,
            state: WorkerState::Spawning,
            tx,
        })
    }

    pub(crate) fn slot(&self) -> SlotInfo {
        self.slot
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn state(&self) -> WorkerState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WorkerState) {
        self.state = state;
    }

    /// Delivers a message to the thread; gives it back if the thread is gone.
    pub(crate) fn post(&self, message: Message) -> Result<(), Message> {
        self.tx.send(message).map_err(|mpsc::error::SendError(m)| m)
    }
}

/// Runs the worker body on the current thread and maps the outcome to an exit code.
fn run_worker(slot: SlotInfo, worker: WorkerRef, ctx: WorkerContext) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            error!(slot = slot.id, role = %slot.role, error = %err, "worker runtime failed to start");
            return 1;
        }
    };

    rt.block_on(async move {
        match AssertUnwindSafe(worker.run(ctx)).catch_unwind().await {
            Ok(Ok(())) => 0,
            Ok(Err(err)) => err.exit_code(),
            Err(panic) => {
                let info = panic_message(&*panic);
                error!(slot = slot.id, role = %slot.role, panic = %info, "worker panicked");
                1
            }
        }
    })
}
