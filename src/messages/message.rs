//! # Inter-thread messages.
//!
//! [`Message`] is the closed set of envelopes exchanged between the supervisor
//! and worker threads:
//!
//! | variant  | direction                          | meaning                                   |
//! |----------|------------------------------------|-------------------------------------------|
//! | `Event`  | worker ⇄ supervisor                | lifecycle signal (`started`, `stop`)      |
//! | `Task`   | worker → supervisor → scheduler    | opaque work unit, optional reply port     |
//! | `Invoke` | worker → supervisor → pool worker  | allocation `Request` / completion `Done`  |
//!
//! Ports move with the message; see [`Port`].

use serde_json::Value;

use super::port::Port;

/// Event name a worker sends once it is ready to serve.
pub const STARTED: &str = "started";

/// Event name the supervisor broadcasts on shutdown.
pub const STOP: &str = "stop";

/// Sub-kind of an [`Message::Invoke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeName {
    /// Ask the supervisor for a pool worker to run `payload`.
    Request,
    /// Sent by the pool worker that finished a request.
    Done,
}

/// Envelope exchanged between the supervisor and worker threads.
#[derive(Debug)]
pub enum Message {
    /// Lifecycle signal.
    Event {
        /// Event name, e.g. [`STARTED`] or [`STOP`].
        name: String,
    },

    /// Opaque work unit routed to the scheduler.
    Task {
        /// Opaque payload.
        payload: Value,
        /// Optional reply port, handed over to the scheduler.
        port: Option<Port>,
    },

    /// Pool allocation protocol.
    Invoke {
        /// `Request` or `Done`.
        name: InvokeName,
        /// Opaque request payload (`Null` for `Done`).
        payload: Value,
        /// Reply port of the original requester.
        port: Port,
        /// Whether the pool worker is captured exclusively for this request.
        exclusive: bool,
    },
}

impl Message {
    /// Builds an event message.
    pub fn event(name: impl Into<String>) -> Self {
        Message::Event { name: name.into() }
    }

    /// The `started` event.
    pub fn started() -> Self {
        Self::event(STARTED)
    }

    /// The `stop` event.
    pub fn stop() -> Self {
        Self::event(STOP)
    }

    /// Builds a task message without a reply port.
    pub fn task(payload: Value) -> Self {
        Message::Task {
            payload,
            port: None,
        }
    }

    /// Builds a task message whose reply port is handed to the scheduler.
    pub fn task_with_port(payload: Value, port: Port) -> Self {
        Message::Task {
            payload,
            port: Some(port),
        }
    }

    /// Builds an invocation request.
    pub fn request(payload: Value, port: Port, exclusive: bool) -> Self {
        Message::Invoke {
            name: InvokeName::Request,
            payload,
            port,
            exclusive,
        }
    }

    /// Builds a completion notice; `exclusive` must match the request.
    pub fn done(port: Port, exclusive: bool) -> Self {
        Message::Invoke {
            name: InvokeName::Done,
            payload: Value::Null,
            port,
            exclusive,
        }
    }

    /// Discriminant as used on the wire: `event`, `task` or `invoke`.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Event { .. } => "event",
            Message::Task { .. } => "task",
            Message::Invoke { .. } => "invoke",
        }
    }

    /// Returns the event name for `Event` messages.
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Message::Event { name } => Some(name),
            _ => None,
        }
    }

    /// Returns true for the `stop` event.
    pub fn is_stop(&self) -> bool {
        self.event_name() == Some(STOP)
    }

    /// Returns the reply port, if the message carries one.
    pub fn port(&self) -> Option<&Port> {
        match self {
            Message::Event { .. } => None,
            Message::Task { port, .. } => port.as_ref(),
            Message::Invoke { port, .. } => Some(port),
        }
    }
}
