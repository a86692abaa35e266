//! Shutdown signal handling

use std::io;

use thiserror::Error;
use tokio::{signal, sync::watch};
use tracing::info;

#[derive(Debug, Error)]
pub enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

/// Wait for Ctrl+C (or SIGTERM on Unix), then flip `notify` to `true`.
///
/// # Errors
///
/// Returns an error if a signal handler can't be installed.
pub async fn listen(notify: watch::Sender<bool>) -> Result<(), ShutdownSignalError> {
    let ctrl_c = async { signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC) };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(ShutdownSignalError::SigTerm)?
            .recv()
            .await;
        Ok::<(), ShutdownSignalError>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<(), ShutdownSignalError>>();

    tokio::select! {
        result = ctrl_c => {
            result?;
            info!("ctrl_c signal received");
        }
        result = terminate => {
            result?;
            info!("terminate signal received");
        }
    };

    notify.send_replace(true);

    Ok(())
}
