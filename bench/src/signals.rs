use std::io;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `token` on the first SIGINT or SIGTERM.
///
/// Both handlers are installed before this returns, so a signal arriving
/// at any later point goes through the benchmark's own shutdown.
pub fn cancel_on_signal(token: CancellationToken) -> io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => info!("Received Ctrl+C, stopping the benchmark"),
            _ = sigterm.recv() => info!("Received SIGTERM, stopping the benchmark"),
        }
        token.cancel();
    });
    Ok(())
}
