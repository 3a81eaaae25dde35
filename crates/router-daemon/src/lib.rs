//! Action router daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (serve, resolve, execute, catalog)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    build_code_generator, build_dispatcher, build_embedder, catalog, execute, init_logging,
    load_settings, resolve, serve,
};
