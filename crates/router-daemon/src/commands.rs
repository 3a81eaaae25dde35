//! Command implementations for the action router.
//!
//! Handles:
//! - serve: load config, build the dispatcher, start the HTTP server
//! - resolve / execute: one-shot routing from the command line
//! - catalog: list registered actions

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use router_actions::builtin_registry;
use router_codegen::{ApiCodeGenerator, ApiCodeGeneratorConfig, CodeGenerator};
use router_embeddings::{CandleEmbedder, EmbeddingModel, HashingEmbedder, ModelCache};
use router_retrieval::Retriever;
use router_service::{run_server_with_shutdown, AppState, Dispatcher};
use router_types::{CodegenSettings, EmbedderBackend, EmbedderSettings, Settings};

/// Load configuration and apply the global CLI overrides.
pub fn load_settings(config_path: Option<&str>, log_level: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Construct the configured embedding backend.
///
/// Loading the Candle model may download weights, so it runs on a
/// blocking thread.
pub async fn build_embedder(settings: &EmbedderSettings) -> Result<Arc<dyn EmbeddingModel>> {
    match settings.backend {
        EmbedderBackend::Hashing => {
            let embedder = HashingEmbedder::new(settings.hashing_dimension)
                .context("Invalid hashing embedder dimension")?;
            Ok(Arc::new(embedder))
        }
        EmbedderBackend::Candle => {
            let cache = ModelCache::from_settings(settings);
            info!(repo = %cache.repo_id, dir = ?cache.model_dir(), "Loading embedding model");
            let embedder = tokio::task::spawn_blocking(move || CandleEmbedder::load(&cache))
                .await
                .context("Model loading task failed")?
                .context("Failed to load embedding model")?;
            Ok(Arc::new(embedder))
        }
    }
}

/// Build the snippet generator, if enabled and an API key is available.
pub fn build_code_generator(settings: &CodegenSettings) -> Option<Arc<dyn CodeGenerator>> {
    if !settings.enabled {
        info!("Code generation disabled");
        return None;
    }

    let generator = ApiCodeGeneratorConfig::from_settings(settings)
        .and_then(ApiCodeGenerator::new);
    match generator {
        Ok(generator) => {
            info!(model = %settings.model, "Code generation enabled");
            Some(Arc::new(generator))
        }
        Err(e) => {
            warn!(error = %e, "Code generation unavailable; responses will carry no snippet");
            None
        }
    }
}

/// Build the dispatcher over the built-in actions and initialize its index.
pub async fn build_dispatcher(settings: &Settings) -> Result<Dispatcher> {
    let registry = builtin_registry(&settings.actions).context("Failed to register actions")?;
    let embedder = build_embedder(&settings.embedder).await?;
    let retriever = Arc::new(Retriever::new(embedder));

    let mut dispatcher = Dispatcher::new(retriever, Arc::new(registry));
    if let Some(codegen) = build_code_generator(&settings.codegen) {
        dispatcher = dispatcher.with_code_generator(codegen);
    }

    dispatcher
        .initialize()
        .await
        .context("Failed to build action index")?;
    Ok(dispatcher)
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Start the HTTP server.
pub async fn serve(
    config_path: Option<&str>,
    log_level: Option<&str>,
    port_override: Option<u16>,
    host_override: Option<&str>,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(host) = host_override {
        settings.http_host = host.to_string();
    }
    init_logging(&settings)?;

    info!("Action router starting...");
    info!("Configuration:");
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Embedder: {:?}", settings.embedder.backend);
    info!("  Log level: {}", settings.log_level);

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    let dispatcher = build_dispatcher(&settings).await?;
    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        default_top_k: settings.default_top_k,
    };

    run_server_with_shutdown(addr, state, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Print the nearest actions for `query` as JSON.
pub async fn resolve(
    config_path: Option<&str>,
    log_level: Option<&str>,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings)?;

    let dispatcher = build_dispatcher(&settings).await?;
    let top_k = top_k.unwrap_or(settings.default_top_k);
    let matches = dispatcher
        .resolve(query, top_k)
        .await
        .context("Failed to resolve query")?;

    let matches: Vec<serde_json::Value> = matches
        .iter()
        .map(|m| {
            serde_json::json!({
                "identifier": m.descriptor.identifier(),
                "description": m.descriptor.description(),
                "distance": m.distance,
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "matches": matches }))?
    );
    Ok(())
}

/// Route `prompt`, run the matched action and print the report as JSON.
pub async fn execute(
    config_path: Option<&str>,
    log_level: Option<&str>,
    prompt: &str,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings)?;

    let dispatcher = build_dispatcher(&settings).await?;
    let report = dispatcher
        .execute(prompt)
        .await
        .context("Failed to execute prompt")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print the registered actions.
pub fn catalog(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings)?;

    let registry = builtin_registry(&settings.actions).context("Failed to register actions")?;
    for descriptor in registry.catalog().iter() {
        println!("{:<20} {}", descriptor.identifier(), descriptor.description());
    }
    Ok(())
}
