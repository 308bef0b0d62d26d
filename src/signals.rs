use tokio::sync::broadcast;
use tracing::{error, info};

/// Why the server is stopping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Stop accepting connections and drain in-flight requests
    Graceful,
}

/// Spawn the task that turns SIGTERM/SIGINT (Ctrl+C off unix) into a
/// [`ShutdownSignal::Graceful`] broadcast.
///
/// The sender is returned so callers can subscribe, or trigger a shutdown
/// themselves.
pub fn setup_signal_handlers() -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(4);
    let tx = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        if wait_for_shutdown().await {
            let _ = tx.send(ShutdownSignal::Graceful);
        }
    });

    (shutdown_tx, handle)
}

/// Resolve on the first shutdown signal; `false` if no handler could be installed
#[cfg(unix)]
async fn wait_for_shutdown() -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                return false;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => info!("SIGTERM received, shutting down"),
        _ = sigint.recv() => info!("SIGINT received, shutting down"),
    }
    true
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Ctrl+C received, shutting down");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            false
        }
    }
}
