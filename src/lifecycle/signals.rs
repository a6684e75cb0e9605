//! Signal handling.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task that triggers graceful shutdown on Ctrl+C.
pub fn spawn_signal_listener(shutdown: &Shutdown) {
    let shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("shutdown signal received");
                shutdown.trigger();
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install Ctrl+C handler");
            }
        }
    });
}
