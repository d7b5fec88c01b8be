//! `appvisor` binary: loads a `[server]` configuration and supervises the
//! demo worker set until SIGINT / SIGTERM (or Ctrl-C on an interactive
//! terminal). A second interrupt during shutdown aborts with exit code 1.
//!
//! # Environment Variables
//!
//! - `APPVISOR_CONFIG`: configuration file (same as `--config`)
//! - `APPVISOR_LOG_FORMAT`: `json` for JSON log lines
//! - `RUST_LOG`: tracing filter (default `info`)

mod demo;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use appvisor::{Config, LogWriter, Subscribe, SupervisorBuilder, observability, redact_cwd};

/// Multi-worker application server supervisor
#[derive(Parser, Debug)]
#[command(name = "appvisor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "APPVISOR_CONFIG", default_value = "server.toml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    observability::init_tracing();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", redact_cwd(&format!("{err:#}")));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = Config::load(&args.config)
        .with_context(|| format!("cannot load {}", args.config.display()))?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = SupervisorBuilder::new(cfg, demo::worker())
        .with_subscribers(subs)
        .with_interrupt_byte(true)
        .build();

    info!(
        workers = sup.count(),
        scheduler = sup.scheduler_id(),
        pool = sup.population().pool_size(),
        "starting application server"
    );
    sup.run().await?;
    Ok(())
}
