// logging.rs

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use tracing_subscriber::EnvFilter;

use crate::config::CalculatorConfig;

/// Installs the global subscriber appending plain lines to the configured
/// log file. Filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging(config: &CalculatorConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("cannot create log directory {}", config.log_dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("cannot install logger: {}", e))?;
    tracing::info!(log_file = %config.log_file.display(), "logging initialized");
    Ok(())
}
