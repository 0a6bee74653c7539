//! Shutdown signal handling.

use tokio::signal;
use tracing::{info, warn};

/// Resolves when the process is asked to stop: SIGINT or SIGTERM on Unix,
/// Ctrl+C elsewhere.
///
/// If the handlers cannot be installed the error is logged and the future
/// never resolves, so the server keeps running.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(int), Ok(term)) => (int, term),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "could not install signal handlers");
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT"),
            _ = sigterm.recv() => info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "could not listen for Ctrl+C");
            return std::future::pending().await;
        }
        info!("received Ctrl+C");
    }
}
