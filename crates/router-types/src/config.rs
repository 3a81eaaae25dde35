//! Configuration loading for the action router.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! Default config file lives at ~/.config/action-router/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RouterError;

/// Environment variable consulted for the code generation key when the
/// config layers do not provide one.
pub const CODEGEN_API_KEY_FALLBACK_ENV: &str = "TOGETHER_API_KEY";

/// Which embedding backend the daemon constructs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderBackend {
    /// Local BERT inference through Candle (default)
    #[default]
    Candle,
    /// Deterministic feature hashing, no model download
    Hashing,
}

/// Embedder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderSettings {
    #[serde(default)]
    pub backend: EmbedderBackend,

    /// HuggingFace repository of the sentence-transformer model
    #[serde(default = "default_model_repo")]
    pub model_repo: String,

    /// Override for the model cache directory
    #[serde(default)]
    pub cache_dir: Option<String>,

    /// Vector length produced by the hashing backend
    #[serde(default = "default_hashing_dimension")]
    pub hashing_dimension: usize,
}

fn default_model_repo() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_hashing_dimension() -> usize {
    1024
}

impl Default for EmbedderSettings {
    fn default() -> Self {
        Self {
            backend: EmbedderBackend::default(),
            model_repo: default_model_repo(),
            cache_dir: None,
            hashing_dimension: default_hashing_dimension(),
        }
    }
}

/// Code generation configuration (OpenAI-compatible chat endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenSettings {
    /// Ask the remote model for a snippet on every execution
    #[serde(default = "default_codegen_enabled")]
    pub enabled: bool,

    #[serde(default = "default_codegen_base_url")]
    pub base_url: String,

    #[serde(default = "default_codegen_model")]
    pub model: String,

    /// API key (usually from env, not stored in the config file)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_codegen_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_codegen_temperature")]
    pub temperature: f32,

    #[serde(default = "default_codegen_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_codegen_max_retries")]
    pub max_retries: u32,
}

fn default_codegen_enabled() -> bool {
    true
}

fn default_codegen_base_url() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_codegen_model() -> String {
    "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string()
}

fn default_codegen_max_tokens() -> u32 {
    250
}

fn default_codegen_temperature() -> f32 {
    0.7
}

fn default_codegen_timeout_secs() -> u64 {
    30
}

fn default_codegen_max_retries() -> u32 {
    3
}

impl Default for CodegenSettings {
    fn default() -> Self {
        Self {
            enabled: default_codegen_enabled(),
            base_url: default_codegen_base_url(),
            model: default_codegen_model(),
            api_key: None,
            max_tokens: default_codegen_max_tokens(),
            temperature: default_codegen_temperature(),
            timeout_secs: default_codegen_timeout_secs(),
            max_retries: default_codegen_max_retries(),
        }
    }
}

impl CodegenSettings {
    /// Resolve the API key: explicit config first, then `TOGETHER_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(CODEGEN_API_KEY_FALLBACK_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
    }
}

/// Settings for the built-in actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSettings {
    /// Command run by `run_shell_command`; the action is disabled when unset
    #[serde(default)]
    pub shell_command: Option<String>,

    /// Page opened by `open_chrome`
    #[serde(default = "default_browser_url")]
    pub browser_url: String,
}

fn default_browser_url() -> String {
    "https://www.google.com".to_string()
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            shell_command: None,
            browser_url: default_browser_url(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Number of matches returned by `resolve` when the caller gives none
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    #[serde(default)]
    pub embedder: EmbedderSettings,

    #[serde(default)]
    pub codegen: CodegenSettings,

    #[serde(default)]
    pub actions: ActionSettings,
}

fn default_http_port() -> u16 {
    8000
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_top_k() -> usize {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            http_host: default_http_host(),
            log_level: default_log_level(),
            default_top_k: default_top_k(),
            embedder: EmbedderSettings::default(),
            codegen: CodegenSettings::default(),
            actions: ActionSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/action-router/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ROUTER_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, RouterError> {
        let config_dir = ProjectDirs::from("", "", "action-router")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("default_top_k", default_top_k() as i64)
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("embedder.model_repo", default_model_repo())
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("codegen.base_url", default_codegen_base_url())
            .map_err(|e| RouterError::Config(e.to_string()))?
            .set_default("codegen.model", default_codegen_model())
            .map_err(|e| RouterError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // ROUTER_HTTP_PORT, ROUTER_EMBEDDER__BACKEND, ROUTER_CODEGEN__API_KEY, ...
        builder = builder.add_source(
            Environment::with_prefix("ROUTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| RouterError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| RouterError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.default_top_k == 0 {
            return Err(RouterError::Config(
                "default_top_k must be >= 1".to_string(),
            ));
        }
        if self.embedder.hashing_dimension == 0 {
            return Err(RouterError::Config(
                "embedder.hashing_dimension must be > 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.codegen.temperature) {
            return Err(RouterError::Config(format!(
                "codegen.temperature must be 0.0-2.0, got {}",
                self.codegen.temperature
            )));
        }
        if self.codegen.timeout_secs == 0 {
            return Err(RouterError::Config(
                "codegen.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
