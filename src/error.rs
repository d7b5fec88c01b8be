//! Error types used by the appvisor runtime, the worker pool and worker bodies.
//!
//! This module defines four error enums:
//!
//! - [`RuntimeError`] — errors raised by the supervisor itself.
//! - [`PoolError`] — allocation failures reported by [`WorkerPool`](crate::WorkerPool).
//! - [`WorkerError`] — errors returned by a worker body (mapped to an exit code).
//! - [`ConfigError`] — configuration loading and validation failures.
//!
//! Every enum provides `as_label` for logs/metrics. [`redact_cwd`] strips the
//! working directory from messages printed to the user.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by the supervisor runtime.
///
/// All of them are fatal: [`Supervisor::run`](crate::Supervisor::run) returns
/// and the binary exits with code `1`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// An OS thread for a worker slot could not be created.
    #[error("failed to spawn worker thread for slot {slot}: {source}")]
    Spawn {
        /// Slot that failed to spawn.
        slot: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Registering OS signal listeners failed.
    #[error("failed to listen for shutdown signals: {0}")]
    Signal(#[source] std::io::Error),

    /// An exit was reported for a slot that has no live worker.
    ///
    /// Every worker thread reports exactly one exit, so a second one means the
    /// lifecycle bookkeeping can no longer be trusted.
    #[error("Application server stopped")]
    AlreadyStopped {
        /// Slot the unexpected exit was attributed to.
        slot: usize,
    },

    /// A second interrupt arrived while workers were still stopping.
    #[error("interrupted again during shutdown ({trigger})")]
    Interrupted {
        /// Signal name or `"interrupt byte"`.
        trigger: &'static str,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use appvisor::RuntimeError;
    ///
    /// let err = RuntimeError::AlreadyStopped { slot: 0 };
    /// assert_eq!(err.as_label(), "runtime_already_stopped");
    /// assert_eq!(err.to_string(), "Application server stopped");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Spawn { .. } => "runtime_spawn_failed",
            RuntimeError::Signal(_) => "runtime_signal_failed",
            RuntimeError::AlreadyStopped { .. } => "runtime_already_stopped",
            RuntimeError::Interrupted { .. } => "runtime_interrupted",
        }
    }
}

/// # Errors produced by the worker pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// No pool worker became free before the capture deadline.
    #[error("No thread available")]
    NoThreadAvailable,

    /// `release` was called for an item that is not captured.
    #[error("release of an item that is not captured")]
    NotCaptured,

    /// `release` was called for an item the pool does not know.
    #[error("release of an item unknown to the pool")]
    UnknownItem,
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::NoThreadAvailable => "pool_no_thread_available",
            PoolError::NotCaptured => "pool_not_captured",
            PoolError::UnknownItem => "pool_unknown_item",
        }
    }
}

/// # Errors returned by a worker body.
///
/// `Ok(())` from [`Worker::run`](crate::Worker::run) is exit code `0`; an error is
/// mapped to a non-zero code by [`WorkerError::exit_code`], which makes the
/// supervisor respawn the slot.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker requested a specific exit code.
    #[error("exited with code {code}")]
    Exit {
        /// Process-style exit code (`0` means clean exit).
        code: i32,
    },

    /// Worker failed; reported as exit code `1`.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl WorkerError {
    /// Exit code reported to the supervisor for this error.
    ///
    /// # Example
    /// ```
    /// use appvisor::WorkerError;
    ///
    /// assert_eq!(WorkerError::Exit { code: 7 }.exit_code(), 7);
    /// assert_eq!(WorkerError::Fail { error: "boom".into() }.exit_code(), 1);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkerError::Exit { code } => *code,
            WorkerError::Fail { .. } => 1,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Exit { .. } => "worker_exit",
            WorkerError::Fail { .. } => "worker_failed",
        }
    }
}

/// # Errors produced while loading or validating configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("cannot read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML or does not match the schema.
    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse(_) => "config_parse",
            ConfigError::Invalid(_) => "config_invalid",
        }
    }
}

/// Removes the current working directory prefix from a message.
///
/// Falls back to the message unchanged when the working directory is unknown.
pub fn redact_cwd(message: &str) -> String {
    match std::env::current_dir() {
        Ok(cwd) => redact_path(message, &cwd.to_string_lossy()),
        Err(_) => message.to_string(),
    }
}

fn redact_path(message: &str, dir: &str) -> String {
    if dir.is_empty() || dir == "/" {
        return message.to_string();
    }
    let with_sep = format!("{dir}{}", std::path::MAIN_SEPARATOR);
    message.replace(&with_sep, "").replace(dir, "")
}
