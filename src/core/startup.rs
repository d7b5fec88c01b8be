//! # Startup synchronizer.
//!
//! One-shot deadline between "every slot reported online" and "every slot
//! reported started":
//!
//! ```text
//! Idle ──arm()──► Armed(token) ──disarm()──► Done
//!                      │
//!                      └── timer fires → Signal::StartupDeadline → expire() → Done
//! ```
//!
//! The timer runs as a task on the supervisor runtime and is cancelled through
//! its [`CancellationToken`]. A deadline signal that was already queued when
//! the synchronizer disarmed is ignored by [`Startup::expire`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::Signal;

enum State {
    Idle,
    Armed(CancellationToken),
    Done,
}

/// Startup deadline state machine.
pub(crate) struct Startup {
    timeout: Duration,
    state: State,
}

impl Startup {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            state: State::Idle,
        }
    }

    /// Starts the deadline timer; only the first call has an effect.
    ///
    /// Returns `true` if the timer was started.
    pub(crate) fn arm(&mut self, signals: &mpsc::UnboundedSender<Signal>) -> bool {
        if !matches!(self.state, State::Idle) {
            return false;
        }
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let signals = signals.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    let _ = signals.send(Signal::StartupDeadline);
                }
            }
        });
        self.state = State::Armed(token);
        true
    }

    /// Cancels a pending deadline; no further timeout will be reported.
    pub(crate) fn disarm(&mut self) {
        if let State::Armed(token) = std::mem::replace(&mut self.state, State::Done) {
            token.cancel();
        }
    }

    /// Consumes a fired deadline; `true` only if the timer was still armed.
    pub(crate) fn expire(&mut self) -> bool {
        match self.state {
            State::Armed(_) => {
                self.state = State::Done;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        matches!(self.state, State::Armed(_))
    }
}
