//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGINT everywhere, SIGTERM on unix

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Resolve on the first shutdown signal.
pub async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    result = tokio::signal::ctrl_c() => log_ctrl_c(result),
                    _ = term.recv() => tracing::info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not install SIGTERM handler");
                log_ctrl_c(tokio::signal::ctrl_c().await);
            }
        }
    }

    #[cfg(not(unix))]
    log_ctrl_c(tokio::signal::ctrl_c().await);
}

/// Trigger `shutdown` when a signal arrives.
pub fn spawn_signal_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    })
}

fn log_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("Received SIGINT"),
        Err(e) => tracing::warn!(error = %e, "Could not listen for SIGINT"),
    }
}
