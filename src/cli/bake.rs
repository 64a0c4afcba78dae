//! Build artifacts with Packer and report their verified identifiers.
//!
//! This module provides the `bake` command which runs `packer build` for one
//! or more declared artifacts. Build output streams to stdout as Packer
//! produces it; after each successful build the manifest Packer wrote is
//! verified and the artifact identifier is printed.
//!
//! Builds run strictly one at a time, in the order selected: Packer builds
//! are heavyweight (virtual machines, containers, network pulls) and their
//! interleaved output would be unreadable.
//!
//! # Examples
//!
//! Build every declared artifact:
//! ```bash
//! kiln bake
//! ```
//!
//! Build specific artifacts, in the order given:
//! ```bash
//! kiln bake web worker
//! ```
//!
//! # Error Conditions
//!
//! - Returns an error if any named artifact is not declared
//! - Returns an error if Packer cannot be started or exits non-zero
//! - Returns an error if a build succeeds but leaves a missing, stale,
//!   empty, malformed, or non-docker manifest
//!
//! The first failing artifact aborts the run; artifacts already built stay
//! built.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::builder::PackerBuilder;
use crate::cli::common::CommandContext;
use crate::utils::packer_program;

/// Command to build declared artifacts and verify their manifests.
#[derive(Args)]
pub struct BakeCommand {
    /// Artifacts to build (all declared artifacts, in name order, when omitted)
    #[arg(value_name = "NAME")]
    names: Vec<String>,
}

impl BakeCommand {
    /// Execute the bake command, finding the project file automatically
    /// unless an explicit path was given.
    pub async fn execute_with_project_path(self, project_path: Option<PathBuf>) -> Result<()> {
        let context = CommandContext::locate(project_path)?;
        self.execute_from_context(&context).await
    }

    async fn execute_from_context(self, context: &CommandContext) -> Result<()> {
        let selection = context.select_artifacts(&self.names)?;
        if selection.is_empty() {
            return Err(anyhow!(
                "No artifacts declared in {}. Add an [artifacts.<name>] table first",
                context.project_path.display()
            ));
        }

        let builder = PackerBuilder::new().with_program(packer_program());
        let mut sink = tokio::io::stdout();

        let total = selection.len();
        for (index, (name, spec)) in selection.into_iter().enumerate() {
            println!(
                "{} {} ({}/{})",
                "Baking".cyan().bold(),
                name.bold(),
                index + 1,
                total
            );

            let artifact_id = builder
                .build(&spec, &mut sink)
                .await
                .with_context(|| format!("Failed to build artifact '{name}'"))?;

            println!("{} {} -> {}", "✓".green(), name.bold(), artifact_id);
        }

        if total > 1 {
            println!("\n{} Baked {} artifacts", "✓".green(), total);
        }

        Ok(())
    }
}
