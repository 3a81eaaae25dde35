//! # router-retrieval
//!
//! Resolves a free-text request to the nearest catalog actions.
//!
//! A [`Retriever`] embeds every action description once, builds a
//! [`FlatIndex`](router_vector::FlatIndex) over them and then answers
//! `resolve` calls by embedding the query and searching that index.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use router_embeddings::HashingEmbedder;
//! use router_retrieval::Retriever;
//! use router_types::ActionCatalog;
//!
//! let catalog = ActionCatalog::from_pairs([
//!     ("open_calculator", "Open the calculator application on the system."),
//!     ("check_ram", "Check the system RAM usage and return it as a percentage."),
//! ])
//! .unwrap();
//!
//! let retriever = Retriever::new(Arc::new(HashingEmbedder::new(1024).unwrap()));
//! retriever.initialize(catalog.descriptors()).unwrap();
//!
//! let best = retriever.resolve_top("launch the calculator").unwrap();
//! assert_eq!(best.identifier(), "open_calculator");
//! ```

pub mod error;
pub mod retriever;

pub use error::RetrievalError;
pub use retriever::Retriever;

// Result types callers see from `resolve`
pub use router_vector::{IndexStats, SearchResult};
