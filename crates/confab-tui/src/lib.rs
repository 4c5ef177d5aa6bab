//! Full-screen TUI client for the recursive-agent chat server.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use confab_core::config::Config;
pub use features::transcript::markdown;
pub use features::{input, logs, sessions, transcript};
pub use runtime::TuiRuntime;

/// Runs the interactive chat TUI until the user quits.
///
/// Spawns HTTP round-trips on the ambient tokio runtime; must be called
/// from within one.
pub async fn run_chat(config: Config, probe: bool) -> Result<()> {
    // Chat mode requires a terminal to render the TUI
    if !stderr().is_terminal() {
        anyhow::bail!("confab requires a terminal.");
    }

    // Print pre-TUI info to stderr (will be replaced by alternate screen)
    let mut err = stderr();
    writeln!(err, "confab")?;
    writeln!(err, "Server: {}", config.server_url)?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(config, probe)?;
    runtime.run()?;

    // Print goodbye after TUI exits (terminal restored)
    writeln!(stderr(), "Goodbye!")?;

    Ok(())
}
