//! Container-orchestration launcher (`docker compose up -d`).

use crate::launcher::ServiceLauncher;
use seedbed_core::config::{absolute_workspace, ServiceConfig};
use seedbed_core::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Number of trailing stderr lines kept in a start error.
const STDERR_TAIL_LINES: usize = 20;

/// Launches services by running the orchestration CLI against a compose file.
#[derive(Debug, Clone)]
pub struct ComposeLauncher {
    program: String,
    leading_args: Vec<String>,
    compose_file: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl ComposeLauncher {
    /// Create a launcher for `compose_file`.
    ///
    /// `command` is the program followed by its leading arguments, e.g.
    /// `["docker", "compose"]` or `["docker-compose"]`.
    pub fn new(
        command: &[String],
        compose_file: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let (program, leading_args) = command.split_first().ok_or_else(|| {
            AppError::Config("Orchestration command cannot be empty".to_string())
        })?;

        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            compose_file: compose_file.into(),
            working_dir: working_dir.into(),
            timeout,
        })
    }

    /// Create a launcher from service configuration, resolving paths
    /// against `workspace`.
    ///
    /// The child runs inside the workspace, so the compose path it receives
    /// must not be relative to our own working directory.
    pub fn from_config(service: &ServiceConfig, workspace: &Path) -> AppResult<Self> {
        let workspace = absolute_workspace(workspace)?;
        Self::new(
            &service.command,
            workspace.join(&service.compose_file),
            &workspace,
            Duration::from_secs(service.timeout_secs),
        )
    }

    /// Full argument vector passed to the program.
    fn args(&self) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push("-f".to_string());
        args.push(self.compose_file.display().to_string());
        args.push("up".to_string());
        args.push("-d".to_string());
        args
    }

    /// Human-readable rendering of the command line, for diagnostics.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[async_trait::async_trait]
impl ServiceLauncher for ComposeLauncher {
    fn launcher_name(&self) -> &str {
        "compose"
    }

    async fn start(&self) -> AppResult<()> {
        if !self.compose_file.is_file() {
            return Err(AppError::ServiceStart(format!(
                "Compose file not found: {:?}",
                self.compose_file
            )));
        }

        tracing::info!("Requesting service start: {}", self.command_line());

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::ServiceStart(format!(
                    "Orchestration command `{}` not found: {}",
                    self.program, e
                )));
            }
            Ok(Err(e)) => {
                return Err(AppError::ServiceStart(format!(
                    "Failed to invoke `{}`: {}",
                    self.program, e
                )));
            }
            Err(_) => {
                return Err(AppError::ServiceStart(format!(
                    "`{}` did not return within {}s",
                    self.command_line(),
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let tail = stderr_tail(&output.stderr);
            return Err(AppError::ServiceStart(format!(
                "`{}` exited with {}{}",
                self.command_line(),
                output.status,
                if tail.is_empty() {
                    String::new()
                } else {
                    format!(":\n{}", tail)
                }
            )));
        }

        tracing::debug!("Orchestration stdout: {}", String::from_utf8_lossy(&output.stdout));
        tracing::info!("Service start requested");

        Ok(())
    }
}
