//! Verify an existing manifest without running a build.
//!
//! This module provides the `inspect` command which applies the same
//! freshness and builder-type checks as `bake` to whatever manifest is
//! already on disk in the artifact's workspace, then prints the artifact
//! identifier. Useful for re-reading a previous build's result in a later
//! pipeline stage, or for diagnosing why a manifest was rejected.
//!
//! # Examples
//!
//! ```bash
//! kiln inspect web
//! kiln inspect web --format json
//! ```
//!
//! # Error Conditions
//!
//! The command fails with the same distinct error kinds a build would:
//! missing or unreadable manifest, malformed JSON, no build records, a
//! last record whose run identity does not match the manifest's, or a
//! builder type other than docker.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::common::{CommandContext, OutputFormat};
use crate::packer::{BuildManifest, DOCKER_BUILDER_TYPE};

/// Command to verify an on-disk manifest and print its artifact identifier.
#[derive(Args)]
pub struct InspectCommand {
    /// Artifact whose manifest to verify
    #[arg(value_name = "NAME")]
    name: String,

    /// Output format (`json` prints the full last build record)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl InspectCommand {
    /// Execute the inspect command, finding the project file automatically
    /// unless an explicit path was given.
    pub async fn execute_with_project_path(self, project_path: Option<PathBuf>) -> Result<()> {
        let context = CommandContext::locate(project_path)?;
        self.execute_from_context(&context)
    }

    fn execute_from_context(self, context: &CommandContext) -> Result<()> {
        let spec = context.project.artifact(&self.name)?;

        let manifest = BuildManifest::load(&spec.workspace, &spec.manifest)?;
        let artifact_id = manifest.verified_artifact_id(DOCKER_BUILDER_TYPE)?.to_string();

        match self.format {
            OutputFormat::Text => println!("{artifact_id}"),
            OutputFormat::Json => {
                // verified_artifact_id proved a last record exists
                if let Some(record) = manifest.last_build() {
                    println!("{}", serde_json::to_string_pretty(record)?);
                }
            }
        }

        Ok(())
    }
}
