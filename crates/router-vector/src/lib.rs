//! # router-vector
//!
//! Vector index for the action router.
//!
//! Stores one embedding per catalog action and answers k-nearest-neighbor
//! queries by squared Euclidean distance. Catalogs hold tens to low hundreds
//! of actions, so the index is an exact linear scan: a wrong match runs the
//! wrong command, and approximate search buys nothing at this size.
//!
//! ## Features
//! - Descriptor and vector kept together in one [`IndexEntry`]
//! - Dimensionality checked at build and query time
//! - Stable ordering: ties go to the entry inserted first
//! - `k` larger than the index is clamped, `k == 0` is rejected

pub mod error;
pub mod flat;
pub mod index;

pub use error::VectorError;
pub use flat::{squared_l2, FlatIndex};
pub use index::{IndexEntry, IndexStats, SearchResult, VectorIndex};
