//! Action Router
//!
//! Routes free-text requests to the nearest registered action by embedding
//! similarity.
//!
//! # Usage
//!
//! ```bash
//! action-router serve [--port PORT] [--host HOST]
//! action-router resolve "how much RAM is used" [--top-k N]
//! action-router execute "open the calculator"
//! action-router catalog
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/action-router/config.toml)
//! 3. `--config` file
//! 4. Environment variables (ROUTER_*)
//! 5. CLI flags

use anyhow::Result;
use clap::Parser;

use router_daemon::{catalog, execute, resolve, serve, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();

    match cli.command {
        Commands::Serve { port, host } => {
            serve(config, log_level, port, host.as_deref()).await?;
        }
        Commands::Resolve { query, top_k } => {
            resolve(config, log_level, &query, top_k).await?;
        }
        Commands::Execute { prompt } => {
            execute(config, log_level, &prompt).await?;
        }
        Commands::Catalog => {
            catalog(config, log_level)?;
        }
    }

    Ok(())
}
