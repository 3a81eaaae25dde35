//! HTTP server setup.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::http::{build_router, AppState};

/// Serve `state` on `addr` until `shutdown_signal` resolves.
///
/// The dispatcher should already be initialized; requests that arrive
/// before it is get `503 Service Unavailable`.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    state: AppState,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!("Starting HTTP server on {} (with graceful shutdown)", addr);

    let listener = TcpListener::bind(addr).await?;
    let app = build_router(state);

    info!("HTTP server ready on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}
