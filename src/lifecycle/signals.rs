//! OS signal handling.

use std::sync::Arc;

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C / SIGINT and trigger graceful shutdown.
pub async fn shutdown_on_signal(shutdown: Arc<Shutdown>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
