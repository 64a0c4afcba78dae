//! Process execution behind a substitutable capability
//!
//! External-process invocation is modeled as a narrow trait with exactly the
//! three responsibilities the pipeline needs: start the process, stream its
//! output, await its exit status. Everything else (judging the exit status,
//! reading the manifest, retry policy) belongs to callers. Keeping the seam
//! this narrow lets tests swap in a fake launcher without spawning real
//! processes.
//!
//! [`ProcessLauncher`] is the sole production implementation.

use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::command::PackerCommand;
use crate::core::ExecutionError;

/// Capability to run an external builder command and stream its output.
///
/// Implementations start the described process, forward both of its output
/// streams to `sink` as they arrive, and resolve with the exit status once
/// the process terminates. A non-zero exit is `Ok`: the launcher reports
/// facts, callers judge them. Errors are reserved for the process failing to
/// start or the output stream breaking mid-run.
///
/// Cancellation follows the future: dropping an in-flight `launch` call
/// terminates the child process.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Runs `command` to completion, forwarding its output to `sink`.
    async fn launch(
        &self,
        command: &PackerCommand,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<ExitStatus, ExecutionError>;
}

/// Launcher that spawns real child processes via [`tokio::process`].
///
/// The child gets a null stdin and piped stdout/stderr; both pipes are
/// forwarded to the caller's sink in arrival order, chunk by chunk, so
/// progress output appears live rather than after the build finishes. The
/// child is spawned with kill-on-drop, so abandoning the invocation future
/// terminates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Creates a new process launcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(
        &self,
        command: &PackerCommand,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<ExitStatus, ExecutionError> {
        let mut cmd = Command::new(command.get_program());
        cmd.args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = command.get_current_dir() {
            cmd.current_dir(dir);
        }
        for (key, value) in command.get_envs() {
            tracing::trace!(target: "packer", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        tracing::debug!(target: "packer", "Executing command: {}", command.command_line());

        let mut child = cmd.spawn().map_err(|source| ExecutionError::Launch {
            program: command.get_program().to_string(),
            source,
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            ExecutionError::Io(std::io::Error::other("child stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            ExecutionError::Io(std::io::Error::other("child stderr was not captured"))
        })?;

        // Both pipes feed one channel so the sink sees chunks in arrival
        // order and is written from a single place.
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(16);
        let stdout_pump = tokio::spawn(pump(stdout, tx.clone()));
        let stderr_pump = tokio::spawn(pump(stderr, tx));

        while let Some(chunk) = rx.recv().await {
            sink.write_all(&chunk).await.map_err(ExecutionError::Io)?;
            sink.flush().await.map_err(ExecutionError::Io)?;
        }

        for pump_task in [stdout_pump, stderr_pump] {
            pump_task
                .await
                .map_err(|join_error| ExecutionError::Io(std::io::Error::other(join_error)))?
                .map_err(ExecutionError::Io)?;
        }

        let status = child.wait().await.map_err(ExecutionError::Io)?;
        tracing::debug!(target: "packer", "Command finished with {status}");

        Ok(status)
    }
}

/// Forwards a child output pipe to the shared channel until EOF.
///
/// Stops quietly when the receiver is gone; the launch call has already
/// returned at that point and there is nowhere left to forward to.
async fn pump<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = vec![0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        if tx.send(buf[..n].to_vec()).await.is_err() {
            return Ok(());
        }
    }
}
