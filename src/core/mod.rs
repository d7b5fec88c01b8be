//! Runtime core: population, lifecycle and routing.
//!
//! The only public entry points are [`SupervisorBuilder`] and [`Supervisor`].
//!
//! Internal modules:
//! - [`population`]: slot layout and roles;
//! - [`handle`]: one worker thread and its lifecycle state;
//! - [`router`]: turns worker messages into routing decisions;
//! - [`startup`]: one-shot startup deadline;
//! - [`shutdown`]: OS signals and the interactive interrupt byte;
//! - [`supervisor`]: the event loop owning all of the above.

mod builder;
mod handle;
mod population;
mod router;
mod shutdown;
mod signal;
mod startup;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use handle::WorkerState;
pub use population::{Population, Role, SlotInfo};
pub(crate) use signal::{Signal, WorkerEvent};
pub use supervisor::{Supervisor, SupervisorHandle};
