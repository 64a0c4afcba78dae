//! Packer integration: command description, process execution, manifest model
//!
//! This module is Kiln's boundary with the external builder. It deliberately
//! knows nothing about projects or CLI concerns; it deals in three things:
//!
//! - [`PackerCommand`] - a pure-data description of one invocation (the fixed
//!   `packer build <template>` form, working directory, environment)
//! - [`Launcher`] / [`ProcessLauncher`] - the capability that runs a command
//!   and streams its combined output to a caller-supplied sink
//! - [`BuildManifest`] / [`BuildRecord`] - the JSON manifest Packer writes,
//!   with the validation that recovers a trustworthy artifact id from it
//!
//! The split keeps the subprocess contract testable: a fake [`Launcher`]
//! exercises everything above this module without spawning processes, while
//! [`ProcessLauncher`]'s own tests cover the real spawn/stream/exit plumbing.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use kiln_cli::packer::{BuildManifest, DOCKER_BUILDER_TYPE, Launcher, PackerCommand,
//!     ProcessLauncher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let workspace = Path::new("/srv/images/web");
//! let command = PackerCommand::build("web.pkr.hcl").current_dir(workspace);
//!
//! let mut sink = tokio::io::stdout();
//! let status = ProcessLauncher::new().launch(&command, &mut sink).await?;
//! anyhow::ensure!(status.success(), "packer failed");
//!
//! let manifest = BuildManifest::load(workspace, Path::new("packer-manifest.json"))?;
//! println!("built {}", manifest.verified_artifact_id(DOCKER_BUILDER_TYPE)?);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod launcher;
pub mod manifest;

pub use command::PackerCommand;
pub use launcher::{Launcher, ProcessLauncher};
pub use manifest::{BuildManifest, BuildRecord, DOCKER_BUILDER_TYPE};
