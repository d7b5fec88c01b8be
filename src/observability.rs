//! Tracing setup for the binary and for embedders that want the default output.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable selecting the output format (`json` or anything else for text).
pub const LOG_FORMAT_ENV: &str = "APPVISOR_LOG_FORMAT";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Output format of [`init_tracing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parses the value of [`LOG_FORMAT_ENV`]; unknown or missing values mean text.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Initialize the tracing subscriber once for the process.
///
/// Records go to stderr. The filter defaults to `info` if `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init(),
            LogFormat::Text => tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_thread_names(true)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
