use std::process::ExitStatus;
use thiserror::Error;
use tokio::io;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("building server executable: {0}")]
    BuildFailure(String),
    #[error("starting server: {0}")]
    StartFailure(#[source] io::Error),
    #[error("pinging server: server didn't return 200 OK after {0} retries")]
    ServerNotReady(u32),
    #[error("pinging server: invalid ping request: {0}")]
    InvalidRequest(#[source] reqwest::Error),
    #[error("operation cancelled")]
    Cancelled,
    #[error("running benchmark: vegeta attack failed: {0}")]
    AttackFailure(String),
    #[error("running benchmark: vegeta report failed: {0}")]
    ReportFailure(String),
    #[error("server exited with error: {0}")]
    UnexpectedServerExit(ExitStatus),
    #[error("server exited before the benchmark finished: {0}")]
    ServerExitedEarly(ExitStatus),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
