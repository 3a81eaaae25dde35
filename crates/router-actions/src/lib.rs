//! # router-actions
//!
//! The things a routed request can actually do.
//!
//! Every action implements [`Action`] and is registered under its
//! identifier in an [`ActionRegistry`]. The registry's catalog (identifier +
//! description, in registration order) is what the retriever embeds; the
//! registry itself is what the dispatcher calls once a match is chosen.
//!
//! ## Built-in actions
//! - `open_calculator`: launch the platform calculator
//! - `open_chrome`: open the configured page in the default browser
//! - `check_ram_usage`: report system memory usage as a percentage
//! - `run_shell_command`: run the configured shell command, return stdout

pub mod action;
pub mod builtin;
pub mod registry;

pub use action::{Action, ActionError, ActionOutput};
pub use builtin::{builtin_registry, CheckRamUsage, OpenBrowser, OpenCalculator, RunShellCommand};
pub use registry::ActionRegistry;
