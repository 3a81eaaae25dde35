//! On-disk location of the sentence-transformer files.
//!
//! Files are fetched once from HuggingFace Hub and reused on later starts.
//! A partially populated directory only downloads what is missing.

use std::path::PathBuf;

use router_types::EmbedderSettings;
use tracing::{debug, info};

use crate::error::EmbeddingError;

/// Files a BERT sentence-transformer needs to load.
pub const MODEL_FILES: &[&str] = &["config.json", "tokenizer.json", "model.safetensors"];

/// `<user cache dir>/action-router/models`, or `.cache/...` when the platform has none.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("action-router")
        .join("models")
}

/// Model repository plus the directory its files are stored under.
#[derive(Debug, Clone)]
pub struct ModelCache {
    pub cache_dir: PathBuf,
    pub repo_id: String,
}

impl ModelCache {
    pub fn new(cache_dir: impl Into<PathBuf>, repo_id: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            repo_id: repo_id.into(),
        }
    }

    /// Cache for the configured repository, honouring a `cache_dir` override.
    pub fn from_settings(settings: &EmbedderSettings) -> Self {
        let cache_dir = settings
            .cache_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);
        Self::new(cache_dir, settings.model_repo.clone())
    }

    /// Per-repository directory; `org/name` becomes `org_name`.
    pub fn model_dir(&self) -> PathBuf {
        self.cache_dir.join(self.repo_id.replace('/', "_"))
    }

    pub fn paths(&self) -> ModelPaths {
        let dir = self.model_dir();
        ModelPaths {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights: dir.join("model.safetensors"),
        }
    }

    /// Model files not yet present on disk.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let dir = self.model_dir();
        MODEL_FILES
            .iter()
            .copied()
            .filter(|f| !dir.join(f).exists())
            .collect()
    }

    pub fn is_cached(&self) -> bool {
        self.missing_files().is_empty()
    }
}

/// Paths to the files a [`crate::CandleEmbedder`] loads.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

/// Resolve the model files, downloading any that are missing.
pub fn get_or_download_model(cache: &ModelCache) -> Result<ModelPaths, EmbeddingError> {
    let missing = cache.missing_files();
    if missing.is_empty() {
        debug!(path = ?cache.model_dir(), "Using cached model");
    } else {
        info!(repo = %cache.repo_id, files = ?missing, "Downloading model files");
        download_files(cache, &missing)?;
    }
    Ok(cache.paths())
}

fn download_files(cache: &ModelCache, files: &[&str]) -> Result<(), EmbeddingError> {
    use hf_hub::api::sync::Api;

    let api = Api::new().map_err(|e| EmbeddingError::Download(e.to_string()))?;
    let repo = api.model(cache.repo_id.clone());

    let model_dir = cache.model_dir();
    std::fs::create_dir_all(&model_dir)?;

    for filename in files {
        let source = repo
            .get(filename)
            .map_err(|e| EmbeddingError::Download(format!("{}: {}", filename, e)))?;
        let dest = model_dir.join(filename);
        std::fs::copy(&source, &dest)?;
        debug!(file = filename, dest = ?dest, "Model file stored");
    }

    Ok(())
}
