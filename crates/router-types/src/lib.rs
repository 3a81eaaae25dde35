//! # router-types
//!
//! Shared domain types for the action router.
//!
//! This crate defines the data structures used throughout the system:
//! - Action descriptors: identifier + description pairs that get embedded
//! - Action catalog: the ordered, validated set of descriptors
//! - Settings: layered configuration for the daemon and its collaborators
//!
//! ## Usage
//!
//! ```rust
//! use router_types::{ActionCatalog, ActionDescriptor};
//!
//! let catalog = ActionCatalog::new(vec![
//!     ActionDescriptor::new("check_ram_usage", "Check the system RAM usage.").unwrap(),
//! ])
//! .unwrap();
//! assert_eq!(catalog.len(), 1);
//! ```

pub mod action;
pub mod config;
pub mod error;

pub use action::{ActionCatalog, ActionDescriptor};
pub use config::{
    ActionSettings, CodegenSettings, EmbedderBackend, EmbedderSettings, Settings,
    CODEGEN_API_KEY_FALLBACK_ENV,
};
pub use error::RouterError;
