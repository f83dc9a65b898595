use crate::args::{BenchConfig, ServerSource};
use crate::error::BenchError;
use chrono::Utc;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const SERVER_EXECUTABLE_PREFIX: &str = "server_";
const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S_%9fZ";

/// Compiled server executable, deleted on drop.
#[derive(Debug)]
pub struct ServerExecutable {
    path: PathBuf,
}

impl ServerExecutable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ServerExecutable {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed server executable: {}", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                "Failed to remove server executable {}: {err}",
                self.path.display()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    target: Option<CargoTarget>,
    #[serde(default)]
    executable: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CargoTarget {
    name: String,
    kind: Vec<String>,
}

/// Builds the server package in release mode and copies the binary to a unique temporary path.
pub async fn build_server(
    source: &ServerSource,
    token: &CancellationToken,
) -> Result<ServerExecutable, BenchError> {
    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    let mut command = Command::new(cargo);
    command
        .args(["build", "--release", "--message-format=json-render-diagnostics"])
        .arg("--manifest-path")
        .arg(source.path.join("Cargo.toml"));
    if let Some(bin) = &source.bin {
        command.arg("--bin").arg(bin);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let child = command
        .spawn()
        .map_err(|err| BenchError::BuildFailure(format!("executing cargo build: {err}")))?;
    let output = tokio::select! {
        _ = token.cancelled() => return Err(BenchError::Cancelled),
        output = child.wait_with_output() => output
            .map_err(|err| BenchError::BuildFailure(format!("executing cargo build: {err}")))?,
    };
    if !output.status.success() {
        if token.is_cancelled() {
            return Err(BenchError::Cancelled);
        }
        return Err(BenchError::BuildFailure(format!(
            "cargo build failed: {}",
            output.status
        )));
    }

    let built = find_executable(&output.stdout, source.bin.as_deref())?;
    let executable = ServerExecutable::new(temp_executable_path());
    tokio::fs::copy(&built, executable.path())
        .await
        .map_err(|err| {
            BenchError::BuildFailure(format!(
                "copying {} to {}: {err}",
                built.display(),
                executable.path().display()
            ))
        })?;
    debug!("Server executable: {}", executable.path().display());
    Ok(executable)
}

fn temp_executable_path() -> PathBuf {
    let timestamp = Utc::now().format(TIMESTAMP_FORMAT);
    std::env::temp_dir().join(format!("{SERVER_EXECUTABLE_PREFIX}{timestamp}"))
}

/// Picks the binary artifact out of cargo's JSON messages, `bin` selects one by target name.
fn find_executable(messages: &[u8], bin: Option<&str>) -> Result<PathBuf, BenchError> {
    let executables = messages
        .split(|byte| *byte == b'\n')
        .filter_map(|line| serde_json::from_slice::<CargoMessage>(line).ok())
        .filter(|message| message.reason == "compiler-artifact")
        .filter_map(|message| {
            let target = message.target?;
            let executable = message.executable?;
            target
                .kind
                .iter()
                .any(|kind| kind == "bin")
                .then_some((target.name, executable))
        })
        .filter(|(name, _)| bin.is_none_or(|bin| name == bin))
        .collect::<Vec<_>>();

    match executables.as_slice() {
        [(_, executable)] => Ok(executable.clone()),
        [] => Err(BenchError::BuildFailure(
            "cargo build didn't produce a server executable".to_owned(),
        )),
        _ => {
            let names = executables
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Err(BenchError::BuildFailure(format!(
                "cargo build produced several executables ({names}), select one with --bin"
            )))
        }
    }
}

/// Runs the server executable with only the configured environment variables.
pub fn start_server(
    executable: &ServerExecutable,
    config: &BenchConfig,
) -> Result<ServerProcess, BenchError> {
    let mut command = Command::new(executable.path());
    command
        .arg("--host")
        .arg(&config.host)
        .env_clear()
        .envs(
            config
                .env_vars
                .iter()
                .map(|var| (var.key.as_str(), var.value.as_str())),
        );
    let env = config
        .env_vars
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    info!("Running server with env: {env:?}");
    let server = ServerProcess::spawn(command)?;
    if let Some(pid) = server.pid() {
        info!("Server PID: {pid}");
    }
    Ok(server)
}

/// Running server child process, killed on drop unless reaped.
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
}

impl ServerProcess {
    pub fn spawn(mut command: Command) -> Result<Self, BenchError> {
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(BenchError::StartFailure)?;
        Ok(Self { child })
    }

    /// PID of the child, `None` once it has been reaped.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    pub async fn wait(&mut self) -> Result<ExitStatus, BenchError> {
        Ok(self.child.wait().await?)
    }

    /// Sends SIGTERM and waits up to `grace_period` before killing the process.
    pub async fn stop(&mut self, grace_period: Duration) -> Result<ExitStatus, BenchError> {
        if let Some(status) = self.child.try_wait()? {
            return Ok(status);
        }

        let Some(pid) = self.pid() else {
            return Ok(self.child.wait().await?);
        };

        debug!("Sending SIGTERM to server PID: {pid}");
        match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(err) => warn!("Failed to send SIGTERM to server PID {pid}: {err}"),
        }

        match tokio::time::timeout(grace_period, self.child.wait()).await {
            Ok(status) => Ok(status?),
            Err(_) => {
                warn!("Server PID {pid} didn't stop within {grace_period:?}, killing it");
                self.child.kill().await?;
                Ok(self.child.wait().await?)
            }
        }
    }
}
