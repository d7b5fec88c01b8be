//! # Shutdown triggers.
//!
//! - [`ShutdownSignals`] yields termination signals for the whole run.
//! - [`watch_interrupt_byte`] puts an interactive stdin into raw mode and asks
//!   the supervisor to stop on every interrupt byte `0x03` read from it.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! The first interrupt starts a graceful shutdown; a second one while stopping
//! aborts the run.

use std::io::{self, IsTerminal, Read};
use std::thread;

use tokio::sync::mpsc;

use crate::core::Signal;

/// Interrupt byte (`ETX`, Ctrl-C in raw mode).
pub(crate) const INTERRUPT: u8 = 0x03;

/// Interrupt trigger reported for the interrupt byte.
pub(crate) const INTERRUPT_REASON: &str = "interrupt byte";

/// Termination signal listeners, registered once per run.
#[cfg(unix)]
pub(crate) struct ShutdownSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Registers the listeners; fails if the OS refuses.
    pub(crate) fn new() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Waits for the next termination signal and returns its name.
    pub(crate) async fn recv(&mut self) -> io::Result<&'static str> {
        let name = tokio::select! {
            _ = self.sigint.recv()  => "SIGINT",
            _ = self.sigterm.recv() => "SIGTERM",
        };
        Ok(name)
    }
}

/// Termination signal listeners, registered once per run.
#[cfg(not(unix))]
pub(crate) struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    pub(crate) fn new() -> io::Result<Self> {
        Ok(Self)
    }

    /// Waits for the next Ctrl-C.
    pub(crate) async fn recv(&mut self) -> io::Result<&'static str> {
        tokio::signal::ctrl_c().await?;
        Ok("CTRL_C")
    }
}

/// Whether stdin is attached to a terminal.
pub(crate) fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Keeps the terminal on stdin in raw input mode; restores it on drop.
///
/// Only canonical input, echo and signal generation are switched off, so
/// Ctrl-C arrives as the byte `0x03` while output stays line-oriented.
pub(crate) struct RawMode {
    #[cfg(unix)]
    saved: nix::sys::termios::Termios,
}

#[cfg(unix)]
impl RawMode {
    pub(crate) fn enable() -> io::Result<Self> {
        use nix::sys::termios::{
            LocalFlags, SetArg, SpecialCharacterIndices, tcgetattr, tcsetattr,
        };

        let saved = tcgetattr(io::stdin())?;
        let mut raw = saved.clone();
        raw.local_flags
            .remove(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG);
        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        tcsetattr(io::stdin(), SetArg::TCSANOW, &raw)?;
        Ok(Self { saved })
    }
}

#[cfg(unix)]
impl Drop for RawMode {
    fn drop(&mut self) {
        use nix::sys::termios::{SetArg, tcsetattr};

        if let Err(err) = tcsetattr(io::stdin(), SetArg::TCSANOW, &self.saved) {
            tracing::warn!(error = %err, "failed to restore terminal mode");
        }
    }
}

#[cfg(not(unix))]
impl RawMode {
    /// Console Ctrl-C is already delivered through [`ShutdownSignals`].
    pub(crate) fn enable() -> io::Result<Self> {
        Ok(Self {})
    }
}

/// Whether a chunk read from the terminal contains the interrupt byte.
pub(crate) fn contains_interrupt(chunk: &[u8]) -> bool {
    chunk.contains(&INTERRUPT)
}

/// Reads `reader` until the interrupt byte shows up.
///
/// Returns `true` on the interrupt byte, `false` on end of input or a read error.
pub(crate) fn read_until_interrupt<R: Read>(mut reader: R) -> bool {
    let mut buf = [0u8; 64];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return false,
            Ok(n) if contains_interrupt(&buf[..n]) => return true,
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(_) => return false,
        }
    }
}

/// Reads `reader` on a detached thread; sends `Signal::Interrupt` per interrupt byte.
///
/// The thread ends with the input or once the supervisor inbox is gone. It is
/// never joined: a blocking stdin read must not hold up process exit.
pub(crate) fn spawn_interrupt_watcher<R>(
    mut reader: R,
    signals: mpsc::UnboundedSender<Signal>,
) -> io::Result<()>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("stdin-interrupt".into())
        .spawn(move || {
            while read_until_interrupt(&mut reader) {
                let interrupt = Signal::Interrupt {
                    trigger: INTERRUPT_REASON,
                };
                if signals.send(interrupt).is_err() {
                    break;
                }
            }
        })
        .map(drop)
}

/// Switches the terminal to raw mode and starts watching stdin for `0x03`.
///
/// The returned guard restores the terminal; keep it for the whole run.
pub(crate) fn watch_interrupt_byte(
    signals: mpsc::UnboundedSender<Signal>,
) -> io::Result<RawMode> {
    let raw = RawMode::enable()?;
    spawn_interrupt_watcher(io::stdin(), signals)?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_byte_is_detected() {
        let input: &[u8] = b"hello\x03world";
        assert!(read_until_interrupt(input));
    }

    #[test]
    fn end_of_input_without_interrupt() {
        let input: &[u8] = b"plain text\n";
        assert!(!read_until_interrupt(input));
    }

    #[test]
    fn watcher_reports_every_interrupt_byte() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input: &'static [u8] = b"ls\x03";
        spawn_interrupt_watcher(input, tx).unwrap();

        let first = rx.blocking_recv().unwrap();
        assert!(matches!(
            first,
            Signal::Interrupt {
                trigger: INTERRUPT_REASON
            }
        ));
        // End of input ends the thread and drops the sender.
        assert!(rx.blocking_recv().is_none());
    }

    /// Hands out one byte per read, like a raw-mode terminal.
    struct Keystrokes(std::vec::IntoIter<u8>);

    impl Read for Keystrokes {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.next() {
                Some(byte) => {
                    buf[0] = byte;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[test]
    fn repeated_interrupts_are_all_reported() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let keys = Keystrokes(vec![INTERRUPT, b'q', INTERRUPT].into_iter());
        spawn_interrupt_watcher(keys, tx).unwrap();

        assert!(rx.blocking_recv().is_some());
        assert!(rx.blocking_recv().is_some());
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn scans_chunks() {
        assert!(contains_interrupt(&[0x01, 0x03]));
        assert!(!contains_interrupt(b"ctrl-c"));
    }
}
