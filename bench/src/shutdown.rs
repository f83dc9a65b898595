use crate::error::BenchError;
use crate::server::ServerProcess;
use nix::sys::signal::Signal;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const SERVER_STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Cancels the benchmark and reaps the server process if this harness started it.
pub async fn shutdown(
    token: &CancellationToken,
    server: Option<ServerProcess>,
) -> Result<(), BenchError> {
    token.cancel();
    let Some(mut server) = server else {
        return Ok(());
    };

    match server.pid() {
        Some(pid) => info!("Stopping server PID: {pid}"),
        None => info!("Stopping server"),
    }
    let status = server.stop(SERVER_STOP_GRACE_PERIOD).await?;
    check_exit_status(status)
}

/// Termination by SIGTERM, SIGINT or SIGKILL is the expected way for the server to stop.
pub fn check_exit_status(status: ExitStatus) -> Result<(), BenchError> {
    if status.success() {
        return Ok(());
    }

    let stopped_by_signal = status.signal().is_some_and(|signal| {
        [Signal::SIGTERM, Signal::SIGINT, Signal::SIGKILL]
            .iter()
            .any(|expected| *expected as i32 == signal)
    });
    if stopped_by_signal {
        debug!("Server stopped by signal: {status}");
        return Ok(());
    }
    Err(BenchError::UnexpectedServerExit(status))
}
