//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use confab_core::config;

mod commands;

#[derive(Parser)]
#[command(name = "confab")]
#[command(version)]
#[command(about = "Terminal client for the recursive-agent chat server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Server base URL (overrides config)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Auto-submit a canned test message one second after startup
    #[arg(long)]
    probe: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;

    if let Some(server) = cli.server {
        config.server_url = server;
    }

    // default to chat mode
    let Some(command) = cli.command else {
        return commands::chat::run(config, cli.probe).await;
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
