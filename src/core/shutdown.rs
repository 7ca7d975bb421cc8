//! # Termination signals.
//!
//! [`wait_for_shutdown_signal`] completes on the first of:
//! - Unix: `SIGINT` (Ctrl-C) or `SIGTERM` (service managers, `kill`);
//! - elsewhere: Ctrl-C.
//!
//! The keeper treats any of them as an interrupt: stop at once, exit 0,
//! no graceful leave.

/// Waits for a termination signal.
///
/// Returns `Err` only when the listeners cannot be registered.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    };
    tracing::debug!(signal = name, "termination signal received");
    Ok(())
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::debug!(signal = "ctrl-c", "termination signal received");
    Ok(())
}
