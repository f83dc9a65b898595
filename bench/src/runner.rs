use crate::args::BenchConfig;
use crate::error::BenchError;
use crate::probe::ServerProbe;
use crate::server::{self, ServerProcess};
use crate::shutdown;
use crate::vegeta::Vegeta;
use std::fmt::{Display, Formatter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Building,
    Starting,
    Probing,
    Attacking,
    Reporting,
    ShuttingDown,
    Done,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Building => write!(f, "building"),
            Stage::Starting => write!(f, "starting"),
            Stage::Probing => write!(f, "probing"),
            Stage::Attacking => write!(f, "attacking"),
            Stage::Reporting => write!(f, "reporting"),
            Stage::ShuttingDown => write!(f, "shutting down"),
            Stage::Done => write!(f, "done"),
        }
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "Benchmark stage");
}

/// Builds and starts the server when configured, waits for it, runs the benchmark and shuts down.
///
/// The server is stopped and its executable removed on every path out of this function.
pub async fn run(config: &BenchConfig, token: &CancellationToken) -> Result<(), BenchError> {
    let token = token.child_token();

    let mut server_process = None;
    let _executable = match &config.server {
        Some(source) => {
            enter(Stage::Building);
            info!("Building server");
            let executable = server::build_server(source, &token).await?;
            enter(Stage::Starting);
            server_process = Some(server::start_server(&executable, config)?);
            Some(executable)
        }
        None => {
            info!(
                "No server specified, assuming the server is running on {}",
                config.url
            );
            None
        }
    };

    let result = benchmark(config, &token, server_process.as_mut()).await;

    enter(Stage::ShuttingDown);
    let stopped = shutdown::shutdown(&token, server_process).await;
    match (result, stopped) {
        (Err(err), Err(shutdown_err)) => {
            warn!("Server shutdown failed: {shutdown_err}");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), stopped) => {
            stopped?;
            enter(Stage::Done);
            Ok(())
        }
    }
}

async fn benchmark(
    config: &BenchConfig,
    token: &CancellationToken,
    server_process: Option<&mut ServerProcess>,
) -> Result<(), BenchError> {
    let stages = async {
        enter(Stage::Probing);
        ServerProbe::from_config(config)?
            .wait_for_server(token)
            .await?;
        info!("Server OK");

        let vegeta = Vegeta::from_config(config);
        enter(Stage::Attacking);
        let results = vegeta.attack(&config.method, &config.url, token).await?;
        debug!("Collected {} bytes of attack results", results.len());
        enter(Stage::Reporting);
        vegeta.report(results, token).await
    };

    let Some(server_process) = server_process else {
        return stages.await;
    };
    tokio::select! {
        result = stages => result,
        status = server_process.wait() => {
            let status = status?;
            if token.is_cancelled() {
                Err(BenchError::Cancelled)
            } else {
                Err(BenchError::ServerExitedEarly(status))
            }
        }
    }
}
