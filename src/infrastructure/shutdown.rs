//! Process signal handling.

use tracing::{info, warn};

/// Wait until the process receives SIGINT (Ctrl+C) or, on Unix, SIGTERM.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received (SIGINT/Ctrl+C)");
                    }
                    _ = sigterm.recv() => {
                        info!("Shutdown signal received (SIGTERM)");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Shutdown signal received (SIGINT/Ctrl+C)");
}

/// Install the process-wide rustls crypto provider.
///
/// Both the WebSocket and HTTP clients use rustls; choosing the provider
/// once up front avoids a runtime panic when more than one backend is linked.
pub fn install_rustls_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
