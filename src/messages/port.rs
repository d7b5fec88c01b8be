//! # Reply ports.
//!
//! A [`Port`] is the sending half of a reply channel that travels *inside* a
//! [`Message`](crate::Message). It is deliberately not `Clone`: moving the
//! message moves the port, so whoever forwarded a message can no longer use
//! its port afterwards. The matching [`PortReceiver`] stays with the worker
//! that created the channel.
//!
//! ```text
//! server ── Invoke{Request, port} ──► supervisor ── Invoke{Request, port} ──► pool worker
//!   ▲                                                                           │
//!   └──────────────────────── port.reply(result) ◄──────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use appvisor::{Port, Reply};
//! use serde_json::json;
//!
//! let (port, mut rx) = Port::channel();
//! port.reply(json!({"sum": 3}));
//! assert_eq!(rx.try_recv(), Some(Reply::Data(json!({"sum": 3}))));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

/// Payload carried back over a [`Port`].
///
/// Serialises to the bare payload, or to `{"error": "..."}` for failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// The request could not be served.
    Error {
        /// Human-readable error, e.g. `"No thread available"`.
        error: String,
    },
    /// Opaque result payload.
    Data(Value),
}

impl Reply {
    /// Returns true for [`Reply::Error`].
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }
}

/// Owned sending half of a reply channel.
pub struct Port {
    tx: mpsc::UnboundedSender<Reply>,
}

/// Receiving half of a reply channel.
pub struct PortReceiver {
    rx: mpsc::UnboundedReceiver<Reply>,
}

impl Port {
    /// Creates a connected port/receiver pair.
    pub fn channel() -> (Port, PortReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Port { tx }, PortReceiver { rx })
    }

    /// Sends a reply; returns `false` if the receiver is gone.
    pub fn send(&self, reply: Reply) -> bool {
        self.tx.send(reply).is_ok()
    }

    /// Sends a data reply.
    pub fn reply(&self, payload: Value) -> bool {
        self.send(Reply::Data(payload))
    }

    /// Sends an error reply built from any displayable error.
    pub fn fail(&self, error: impl fmt::Display) -> bool {
        self.send(Reply::Error {
            error: error.to_string(),
        })
    }

    /// Returns true if the receiving side was dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl PortReceiver {
    /// Waits for the next reply; `None` once the port was dropped.
    pub async fn recv(&mut self) -> Option<Reply> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for plain threads.
    ///
    /// Panics if called from inside an async context.
    pub fn blocking_recv(&mut self) -> Option<Reply> {
        self.rx.blocking_recv()
    }

    /// Returns a reply if one is already queued.
    pub fn try_recv(&mut self) -> Option<Reply> {
        self.rx.try_recv().ok()
    }
}
