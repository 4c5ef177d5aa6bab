//! Chat command handler.

use std::fs;

use anyhow::{Context, Result};
use confab_core::config::{self, Config};
use tracing_subscriber::EnvFilter;

pub async fn run(config: Config, probe: bool) -> Result<()> {
    // Tracing goes to a file; stderr would corrupt the alternate screen.
    // The guard must outlive the TUI so buffered lines get flushed.
    let _guard = init_tracing(&config)?;
    tracing::info!(server = %config.server_url, probe, "starting chat session");

    confab_tui::run_chat(config, probe)
        .await
        .context("interactive chat failed")
}

fn init_tracing(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = config::paths::logs_dir();
    fs::create_dir_all(&logs_dir)
        .with_context(|| format!("create log directory {}", logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&logs_dir, "confab.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env("CONFAB_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
