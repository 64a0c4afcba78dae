//! Build pipeline for packer artifacts
//!
//! [`PackerBuilder`] composes the two halves of a build: running
//! `packer build <template>` in the artifact's workspace with live output
//! forwarding, then reading the manifest the run left behind to recover a
//! trustworthy artifact identifier. The halves are also exposed separately
//! ([`invoke`](PackerBuilder::invoke) and
//! [`BuildManifest`](crate::packer::BuildManifest)) for callers that manage
//! the manifest themselves.
//!
//! [`watch_paths`] is the third, independent entry point: it maps an
//! artifact's declared file list to the paths an orchestrator should watch
//! to decide when a rebuild is due.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::builder::PackerBuilder;
//! use kiln_cli::project::ArtifactSpec;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let spec = ArtifactSpec::new("images/web", "web.pkr.hcl");
//! let builder = PackerBuilder::new();
//! let mut sink = tokio::io::stdout();
//!
//! let artifact_id = builder.build(&spec, &mut sink).await?;
//! println!("built {artifact_id}");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWrite;
use tracing::debug;

use crate::core::{ExecutionError, KilnError};
use crate::packer::{
    BuildManifest, DOCKER_BUILDER_TYPE, Launcher, PackerCommand, ProcessLauncher,
};
use crate::project::ArtifactSpec;
use crate::utils::default_packer_command;

mod deps;

pub use deps::watch_paths;

/// Runs packer builds and verifies the manifests they produce.
///
/// Holds the packer program name and the [`Launcher`] used to execute it.
/// The default launcher spawns real processes; tests substitute a scripted
/// one. The builder itself is stateless across invocations, so one instance
/// can serve any number of sequential builds.
#[derive(Clone)]
pub struct PackerBuilder {
    launcher: Arc<dyn Launcher>,
    program: String,
}

impl PackerBuilder {
    /// Creates a builder that spawns the platform-default packer binary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_launcher(Arc::new(ProcessLauncher::new()))
    }

    /// Creates a builder that executes through the given launcher.
    #[must_use]
    pub fn with_launcher(launcher: Arc<dyn Launcher>) -> Self {
        Self {
            launcher,
            program: default_packer_command().to_string(),
        }
    }

    /// Overrides the packer program name or path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Program name or path this builder will execute.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs `packer build` for the artifact, forwarding all output to `sink`.
    ///
    /// The child runs with the artifact's workspace as working directory and
    /// no stdin, so the template path is interpreted by packer relative to
    /// the workspace. The call returns once the process has exited and its
    /// output streams are drained. Dropping the returned future kills the
    /// child.
    ///
    /// # Errors
    ///
    /// [`KilnError::ExecutionFailure`] when the process cannot be started,
    /// output forwarding breaks down, or the exit status is non-zero. The
    /// underlying [`ExecutionError`] preserves which of those happened.
    pub async fn invoke(
        &self,
        spec: &ArtifactSpec,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<(), KilnError> {
        let command = PackerCommand::build(&spec.template)
            .program(self.program.as_str())
            .current_dir(&spec.workspace);

        debug!(
            target: "builder",
            "Building template '{}' in workspace '{}'",
            spec.template.display(),
            spec.workspace.display()
        );
        let start = Instant::now();

        let status = self.launcher.launch(&command, sink).await.map_err(|source| {
            KilnError::ExecutionFailure {
                template: spec.template.display().to_string(),
                source,
            }
        })?;

        if !status.success() {
            return Err(KilnError::ExecutionFailure {
                template: spec.template.display().to_string(),
                source: ExecutionError::Failed {
                    status,
                },
            });
        }

        debug!(
            target: "builder",
            "Build of '{}' took {:.2}s",
            spec.template.display(),
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Builds the artifact and returns the verified artifact identifier.
    ///
    /// Composes [`invoke`](Self::invoke) with manifest verification: the
    /// manifest is read only after the build exits zero, so an execution
    /// failure is always reported as such and never masked by a manifest
    /// error from a previous run's leftovers.
    ///
    /// # Errors
    ///
    /// [`KilnError::ExecutionFailure`] from the build itself, or any of the
    /// manifest errors from
    /// [`verified_artifact_id`](BuildManifest::verified_artifact_id).
    pub async fn build(
        &self,
        spec: &ArtifactSpec,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<String, KilnError> {
        self.invoke(spec, sink).await?;

        let manifest = BuildManifest::load(&spec.workspace, &spec.manifest)?;
        let artifact_id = manifest.verified_artifact_id(DOCKER_BUILDER_TYPE)?;

        debug!(
            target: "builder",
            "Template '{}' produced artifact '{}'",
            spec.template.display(),
            artifact_id
        );
        Ok(artifact_id.to_string())
    }
}

impl Default for PackerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PackerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackerBuilder").field("program", &self.program).finish_non_exhaustive()
    }
}
