use clap::Parser;
use hello_server::args::Args;
use hello_server::http::http_server;
use hello_server::server_error::ServerError;
use tokio::signal;
use tokio::signal::unix::{Signal, SignalKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sigterm = signal::unix::signal(SignalKind::terminate())?;
    if let Err(err) = http_server::start(&args.address(), shutdown_signal(sigterm)).await {
        error!("HTTP server has failed: {err}");
        return Err(err);
    }
    Ok(())
}

async fn shutdown_signal(mut sigterm: Signal) {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully");
        }
    }
}
