use crate::args::BenchConfig;
use crate::error::BenchError;
use reqwest::{Method, Url};
use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio_util::sync::CancellationToken;
use tracing::info;

const ATTACK_COMMAND: &str = "attack";
const REPORT_COMMAND: &str = "report";

/// Raw `vegeta attack` output, consumed by the report.
#[derive(Debug)]
pub struct AttackResults(Vec<u8>);

impl AttackResults {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Runs the Vegeta CLI: `attack` against a single target, then `report` on its results.
#[derive(Debug, Clone)]
pub struct Vegeta {
    program: PathBuf,
    attack_args: Vec<String>,
}

impl Vegeta {
    /// Every argument is passed to `attack` as `-{arg}`, e.g. `rate=0` becomes `-rate=0`.
    pub fn new(program: PathBuf, args: &[String]) -> Self {
        let attack_args = std::iter::once(ATTACK_COMMAND.to_owned())
            .chain(args.iter().map(|arg| format!("-{arg}")))
            .collect();
        Self {
            program,
            attack_args,
        }
    }

    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(config.vegeta.clone(), &config.vegeta_args)
    }

    pub fn attack_args(&self) -> &[String] {
        &self.attack_args
    }

    pub async fn attack(
        &self,
        method: &Method,
        url: &Url,
        token: &CancellationToken,
    ) -> Result<AttackResults, BenchError> {
        info!("Running benchmark with args: {:?}", self.attack_args);
        let mut child = Command::new(&self.program)
            .args(&self.attack_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| BenchError::AttackFailure(err.to_string()))?;

        let target = format!("{method} {url}");
        let stdin = child.stdin.take();
        let output = until_cancelled(token, async move {
            feed(stdin, target.as_bytes()).await?;
            child.wait_with_output().await
        })
        .await?
        .map_err(|err| BenchError::AttackFailure(err.to_string()))?;

        if !output.status.success() {
            return Err(BenchError::AttackFailure(output.status.to_string()));
        }
        Ok(AttackResults(output.stdout))
    }

    pub async fn report(
        &self,
        results: AttackResults,
        token: &CancellationToken,
    ) -> Result<(), BenchError> {
        info!("Generating report...");
        let mut child = Command::new(&self.program)
            .arg(REPORT_COMMAND)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| BenchError::ReportFailure(err.to_string()))?;

        let stdin = child.stdin.take();
        let status = until_cancelled(token, async move {
            feed(stdin, &results.0).await?;
            child.wait().await
        })
        .await?
        .map_err(|err| BenchError::ReportFailure(err.to_string()))?;

        if !status.success() {
            return Err(BenchError::ReportFailure(status.to_string()));
        }
        Ok(())
    }
}

/// Writes `input` and closes stdin. A process that exits without reading is judged by its status.
async fn feed(stdin: Option<ChildStdin>, input: &[u8]) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input).await {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => Err(err),
        _ => Ok(()),
    }
}

async fn until_cancelled<T>(
    token: &CancellationToken,
    future: impl Future<Output = T>,
) -> Result<T, BenchError> {
    tokio::select! {
        _ = token.cancelled() => Err(BenchError::Cancelled),
        output = future => Ok(output),
    }
}
