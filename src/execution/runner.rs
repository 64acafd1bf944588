//! Host command execution seam
//!
//! Everything the engine does to a host goes through `CommandRunner`:
//! shell commands, probe commands, file writes and file reads. That keeps
//! probes and actions dry-runnable and testable against the same interface.

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Captured result of a host command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited zero
    pub success: bool,

    pub stdout: String,

    pub stderr: String,
}

impl CommandOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: &str) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            success: true,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

/// Seam between the engine and the host.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a shell command, capturing its output. `Ok` means the process
    /// spawned and finished; a non-zero exit is reported in the output.
    async fn run(&self, command: &str) -> Result<CommandOutput>;

    /// Run an idempotency probe command. Implementations without host access
    /// report failure so every probe reads as unsatisfied.
    async fn probe(&self, command: &str) -> Result<CommandOutput> {
        self.run(command).await
    }

    /// Write a rendered artifact to the host.
    async fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Check a path for existence.
    async fn path_exists(&self, path: &Path) -> bool;

    /// Read a file from the host.
    async fn read_file(&self, path: &Path) -> Result<String>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<T> {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        (**self).run(command).await
    }

    async fn probe(&self, command: &str) -> Result<CommandOutput> {
        (**self).probe(command).await
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        (**self).write_file(path, contents).await
    }

    async fn path_exists(&self, path: &Path) -> bool {
        (**self).path_exists(path).await
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        (**self).read_file(path).await
    }
}

/// Executes commands on the local host through `sh -c`.
pub struct HostRunner;

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        debug!(command = %command, "Spawning host command");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn()?;
        let output = child.wait_with_output().await?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    async fn path_exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Records what a run would do instead of touching the host.
///
/// Probes report unsatisfied and file reads fail, so a dry run walks the full
/// plan as if the host were bare.
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn commands(&self) -> Vec<String> {
        self.commands.lock().await.clone()
    }

    pub async fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        info!(command = %command, "[DRY RUN] Would execute");
        self.commands.lock().await.push(command.to_string());
        Ok(CommandOutput::ok())
    }

    async fn probe(&self, _command: &str) -> Result<CommandOutput> {
        Ok(CommandOutput::failed("dry run"))
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        info!(path = %path.display(), "[DRY RUN] Would write");
        self.writes
            .lock()
            .await
            .push((path.to_path_buf(), contents.to_string()));
        Ok(())
    }

    async fn path_exists(&self, _path: &Path) -> bool {
        false
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("dry run: {}", path.display()),
        )
        .into())
    }
}
