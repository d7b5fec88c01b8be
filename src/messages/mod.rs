//! # Inter-thread communication (ITC) envelopes.
//!
//! - [`Message`] closed set of envelopes (`Event`, `Task`, `Invoke`)
//! - [`Port`] / [`PortReceiver`] owned reply channel that moves with a message
//! - [`Reply`] what travels back over a port

mod message;
mod port;

pub use message::{InvokeName, Message, STARTED, STOP};
pub use port::{Port, PortReceiver, Reply};
