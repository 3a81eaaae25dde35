//! # router-embeddings
//!
//! Text embedding for the action router.
//!
//! Every action description and every incoming query is turned into a
//! fixed-length vector by an [`EmbeddingModel`]. The model and its
//! dimensionality are injected by the caller; nothing downstream assumes
//! either.
//!
//! ## Backends
//! - [`CandleEmbedder`]: local inference of all-MiniLM-L6-v2 (384 dims) via
//!   Candle, model files cached after the first download
//! - [`HashingEmbedder`]: deterministic feature-hashing bag of words, no
//!   model files, useful offline and in tests

pub mod cache;
pub mod candle;
pub mod error;
pub mod hashing;
pub mod model;

pub use crate::candle::CandleEmbedder;
pub use cache::{default_cache_dir, get_or_download_model, ModelCache, ModelPaths, MODEL_FILES};
pub use error::EmbeddingError;
pub use hashing::HashingEmbedder;
pub use model::{ensure_text, Embedding, EmbeddingModel, ModelInfo};
