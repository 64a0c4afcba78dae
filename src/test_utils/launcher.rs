//! Scripted process launcher for builder tests
//!
//! [`FakeLauncher`] implements [`Launcher`] without spawning anything. Tests
//! script its output, exit code, and an optional manifest file to drop into
//! the working directory, then inspect the commands it was asked to run.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::core::ExecutionError;
use crate::packer::{Launcher, PackerCommand};

/// Builds an `ExitStatus` carrying the given exit code.
///
/// Wait status encoding on unix keeps the exit code in the high byte.
#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// A [`Launcher`] that replays a scripted outcome instead of running packer.
///
/// Every invocation is recorded and can be retrieved with
/// [`invocations`](Self::invocations), so tests can assert on the command
/// line, working directory, and environment the caller constructed.
#[derive(Debug, Default)]
pub struct FakeLauncher {
    output: Vec<u8>,
    exit_code: i32,
    fail_launch: bool,
    manifest: Option<(PathBuf, String)>,
    invocations: Mutex<Vec<PackerCommand>>,
}

impl FakeLauncher {
    /// A launcher whose process exits with code 0 and prints nothing.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A launcher whose process exits with the given non-negative code.
    #[must_use]
    pub fn exiting_with(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// A launcher that fails to start the process at all, as if the binary
    /// were missing from `PATH`.
    #[must_use]
    pub fn failing_to_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    /// Sets the bytes the fake process writes to the sink.
    #[must_use]
    pub fn with_output(mut self, output: impl Into<Vec<u8>>) -> Self {
        self.output = output.into();
        self
    }

    /// Writes `content` to `file_name` in the command's working directory
    /// before reporting the exit status, the way a packer manifest
    /// post-processor would.
    #[must_use]
    pub fn writing_manifest(mut self, file_name: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.manifest = Some((file_name.into(), content.into()));
        self
    }

    /// Commands this launcher has been asked to run, oldest first.
    #[must_use]
    pub fn invocations(&self) -> Vec<PackerCommand> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(
        &self,
        command: &PackerCommand,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<ExitStatus, ExecutionError> {
        self.invocations.lock().unwrap().push(command.clone());

        if self.fail_launch {
            return Err(ExecutionError::Launch {
                program: command.get_program().to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }

        sink.write_all(&self.output).await.map_err(ExecutionError::Io)?;
        sink.flush().await.map_err(ExecutionError::Io)?;

        if let Some((file_name, content)) = &self.manifest {
            let path = match command.get_current_dir() {
                Some(dir) if file_name.is_relative() => dir.join(file_name),
                _ => file_name.clone(),
            };
            std::fs::write(&path, content).map_err(ExecutionError::Io)?;
        }

        Ok(exit_status(self.exit_code))
    }
}
