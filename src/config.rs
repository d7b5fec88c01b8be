//! # Application server configuration.
//!
//! [`Config`] is the validated configuration object the supervisor reads. Only
//! the `[server]` table drives the worker population:
//!
//! ```toml
//! [server]
//! balancer = false
//! ports = [8001, 8002]
//!
//! [server.workers]
//! pool = 2
//! wait = 2000       # ms; omit to wait forever for an exclusive capture
//!
//! [server.timeouts]
//! start = 30000     # ms
//! ```
//!
//! ## Sentinel values
//! - `workers.wait` absent → no capture timeout (see [`WorkersConfig::wait`])
//! - `bus_capacity` is clamped to at least 1 (see [`Config::bus_capacity_clamped`])

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server population and timing.
    pub server: ServerConfig,

    /// Capacity of the event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// the oldest ones.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

/// `[server]` table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Whether slot 0 runs a balancer in front of the servers.
    #[serde(default)]
    pub balancer: bool,

    /// One server worker is spawned per port.
    #[serde(default)]
    pub ports: Vec<u16>,

    /// Pool sizing and capture timeout.
    #[serde(default)]
    pub workers: WorkersConfig,

    /// Startup timing.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// `[server.workers]` table.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    /// Number of task-execution pool workers.
    #[serde(default)]
    pub pool: usize,

    /// Exclusive capture timeout in milliseconds (`None` = wait forever).
    #[serde(default)]
    pub wait: Option<u64>,
}

/// `[server.timeouts]` table.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsConfig {
    /// How long all workers may take to report `started` once every worker is online (ms).
    #[serde(default = "default_start_ms")]
    pub start: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            start: default_start_ms(),
        }
    }
}

fn default_bus_capacity() -> usize {
    1024
}

fn default_start_ms() -> u64 {
    30_000
}

impl WorkersConfig {
    /// Returns the capture timeout as an `Option`.
    ///
    /// - `None` → captures wait until a worker is released
    /// - `Some(d)` → captures fail with `NoThreadAvailable` after `d`
    #[inline]
    pub fn wait(&self) -> Option<Duration> {
        self.wait.map(Duration::from_millis)
    }
}

impl TimeoutsConfig {
    /// Startup deadline as a [`Duration`].
    #[inline]
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start)
    }
}

impl Config {
    /// Builds a configuration around a server table with default runtime settings.
    pub fn new(server: ServerConfig) -> Self {
        Self {
            server,
            bus_capacity: default_bus_capacity(),
        }
    }

    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for port in &self.server.ports {
            if *port == 0 {
                return Err(ConfigError::Invalid("server.ports must not contain 0".into()));
            }
            if !seen.insert(*port) {
                return Err(ConfigError::Invalid(format!(
                    "server.ports contains {port} more than once"
                )));
            }
        }
        if self.server.timeouts.start == 0 {
            return Err(ConfigError::Invalid(
                "server.timeouts.start must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let cfg = Config::from_toml_str(
            r#"
            [server]
            balancer = true
            ports = [8001, 8002]
            [server.workers]
            pool = 3
            wait = 250
            [server.timeouts]
            start = 1000
            "#,
        )
        .unwrap();

        assert!(cfg.server.balancer);
        assert_eq!(cfg.server.ports, vec![8001, 8002]);
        assert_eq!(cfg.server.workers.pool, 3);
        assert_eq!(cfg.server.workers.wait(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.server.timeouts.start_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn wait_is_optional() {
        let cfg = Config::from_toml_str("[server]\nports = [80]\n").unwrap();
        assert_eq!(cfg.server.workers.wait(), None);
        assert_eq!(cfg.server.timeouts.start, 30_000);
    }

    #[test]
    fn rejects_duplicate_ports() {
        let err = Config::from_toml_str("[server]\nports = [80, 80]\n").unwrap_err();
        assert_eq!(err.as_label(), "config_invalid");
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = Config::from_toml_str("[server]\nportz = [80]\n").unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert_eq!(err.as_label(), "config_read");
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "[server]\nports = [8080]\n[server.workers]\npool = 1\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.server.workers.pool, 1);
    }
}
