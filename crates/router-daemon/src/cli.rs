//! CLI argument parsing for the action router.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Action Router
///
/// Routes free-text requests to the nearest registered action.
#[derive(Parser, Debug)]
#[command(name = "action-router")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/action-router/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override bind host
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the nearest actions for a query without running any
    Resolve {
        query: String,

        /// Number of matches (default from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Route a prompt and run the matched action
    Execute { prompt: String },

    /// List registered actions
    Catalog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve() {
        let cli = Cli::parse_from(["action-router", "serve", "--port", "9000"]);
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, Some(9000));
                assert_eq!(host, None);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_resolve_with_top_k() {
        let cli = Cli::parse_from(["action-router", "resolve", "launch the calculator", "-k", "3"]);
        match cli.command {
            Commands::Resolve { query, top_k } => {
                assert_eq!(query, "launch the calculator");
                assert_eq!(top_k, Some(3));
            }
            _ => panic!("Expected Resolve command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "action-router",
            "execute",
            "how much RAM is used",
            "--config",
            "/tmp/router.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/router.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(cli.command, Commands::Execute { .. }));
    }

    #[test]
    fn test_cli_catalog() {
        let cli = Cli::parse_from(["action-router", "catalog"]);
        assert!(matches!(cli.command, Commands::Catalog));
    }
}
