use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use hello_bench::args::{BenchArgs, BenchConfig};
use hello_bench::runner;
use hello_bench::signals::cancel_on_signal;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = BenchArgs::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match BenchConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => BenchArgs::command()
            .error(ErrorKind::ValueValidation, err)
            .exit(),
    };

    let token = CancellationToken::new();
    if let Err(err) = cancel_on_signal(token.clone()) {
        error!("ERR: cannot listen for shutdown signals: {err}");
        return ExitCode::FAILURE;
    }

    match runner::run(&config, &token).await {
        Ok(()) => {
            info!("Finished the benchmark.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("ERR: {err}");
            ExitCode::FAILURE
        }
    }
}
