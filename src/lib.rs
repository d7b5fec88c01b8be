//! # appvisor
//!
//! **Appvisor** is the supervision core of a multi-worker application server.
//!
//! One coordinating event loop spawns a fixed population of worker threads,
//! keeps them alive, and routes messages among them under an explicit
//! allocation discipline for the task-execution pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌───────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────────┐ ┌────────────┐
//!   │ balancer  │ │ server 1 │ │ server 2 │ │ scheduler │ │ pool-worker│ │ pool-worker│
//!   │ (slot 0)  │ │ (:8001)  │ │ (:8002)  │ │           │ │            │ │            │
//!   └─────┬─────┘ └────┬─────┘ └────┬─────┘ └─────┬─────┘ └─────┬──────┘ └─────┬──────┘
//!         │ Online / Message / Exit(code)          │             │              │
//!         ▼            ▼            ▼              ▼             ▼              ▼
//! ┌─────────────────────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single event loop)                                                 │
//! │  - slots, generations, counters (active / starting), phase                      │
//! │  - Router: event → counters, task → scheduler, invoke → WorkerPool              │
//! │  - Startup: one-shot deadline once every slot is online                         │
//! │  - Shutdown: SIGINT / SIGTERM / 0x03 → "stop" to every live worker              │
//! └───────────────────────────────────────┬─────────────────────────────────────────┘
//!                                         │ publish(Event)
//!                                         ▼
//!                             Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Lifecycle of a slot
//! ```text
//! spawn(id) ──► Spawning ──Online──► Online ──"started"──► Started ──Exit(code)──► Exited
//!                                                                    │
//!                       code != 0 while running: spawn(id) again ◄───┘ (generation + 1)
//! ```
//!
//! ## Features
//! | Area            | Description                                               | Key types                                   |
//! |-----------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Supervision** | Population, restarts, startup deadline, graceful stop.    | [`Supervisor`], [`SupervisorBuilder`]       |
//! | **Workers**     | Code running inside a worker thread.                      | [`Worker`], [`WorkerFn`], [`WorkerContext`] |
//! | **Messaging**   | Envelopes and reply ports.                                | [`Message`], [`Port`], [`Reply`]            |
//! | **Pool**        | Exclusive capture with timeout, shared round-robin.       | [`WorkerPool`]                              |
//! | **Events**      | Lifecycle events and subscribers.                         | [`Event`], [`Subscribe`], [`LogWriter`]     |
//! | **Errors**      | Typed errors for runtime, pool, workers and config.       | [`RuntimeError`], [`PoolError`]             |
//! | **Configuration** | TOML `[server]` table.                                  | [`Config`], [`ServerConfig`]                |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use appvisor::{
//!     Config, LogWriter, Message, Subscribe, SupervisorBuilder, WorkerContext, WorkerError, WorkerFn,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::from_toml_str(
//!         r#"
//!         [server]
//!         ports = [8001]
//!         [server.workers]
//!         pool = 2
//!         "#,
//!     )?;
//!
//!     let worker = WorkerFn::arc(|mut ctx: WorkerContext| async move {
//!         ctx.started();
//!         while let Some(msg) = ctx.recv().await {
//!             if msg.is_stop() {
//!                 break;
//!             }
//!             if let Message::Invoke { port, exclusive, payload, .. } = msg {
//!                 port.reply(payload);
//!                 ctx.send(Message::done(port, exclusive));
//!             }
//!         }
//!         Ok::<_, WorkerError>(())
//!     });
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = SupervisorBuilder::new(cfg, worker)
//!         .with_subscribers(subs)
//!         .build();
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
pub mod events;
pub mod messages;
pub mod observability;
mod pool;
pub mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use self::core::{
    Population, Role, SlotInfo, Supervisor, SupervisorBuilder, SupervisorHandle, WorkerState,
};
pub use config::{Config, ServerConfig, TimeoutsConfig, WorkersConfig};
pub use error::{ConfigError, PoolError, RuntimeError, WorkerError, redact_cwd};
pub use events::{Event, EventKind};
pub use messages::{InvokeName, Message, Port, PortReceiver, Reply};
pub use pool::WorkerPool;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use workers::{Worker, WorkerContext, WorkerFn, WorkerRef};
