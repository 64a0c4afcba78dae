//! Validate the project file and build environment.
//!
//! This module provides the `validate` command which checks everything a
//! build needs before any build runs: the project file parses and is
//! structurally sound, each artifact's workspace and template exist on disk,
//! and the packer binary is available. Checks report as ✓/✗ lines; any
//! failed check makes the command exit non-zero.
//!
//! # Examples
//!
//! ```bash
//! kiln validate
//! kiln --project-path ./deploy/kiln.toml validate
//! ```
//!
//! # Checks Performed
//!
//! 1. Project file found (search from the current directory upward, or the
//!    explicit `--project-path`)
//! 2. Project file parses and passes structural validation
//! 3. Per artifact: workspace directory exists, template file exists
//! 4. Packer binary resolvable (honors `KILN_PACKER` / `--packer`)
//!
//! Manifest freshness is deliberately not checked here: manifests describe a
//! past build, and `kiln inspect` exists for interrogating them.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::common::CommandContext;
use crate::core::KilnError;
use crate::project::find_project_with_optional;
use crate::utils::{command_available, packer_program};

/// Command to check the project file and build environment.
#[derive(Args)]
pub struct ValidateCommand {}

impl ValidateCommand {
    /// Execute the validate command, finding the project file automatically
    /// unless an explicit path was given.
    pub async fn execute_with_project_path(self, project_path: Option<PathBuf>) -> Result<()> {
        let project_path = match find_project_with_optional(project_path) {
            Ok(path) => {
                println!("{} Project file found at {}", "✓".green(), path.display());
                path
            }
            Err(e) => {
                println!(
                    "{} No kiln.toml found in the current directory or any parent directory",
                    "✗".red()
                );
                return Err(e);
            }
        };

        let context = match CommandContext::from_project_path(&project_path) {
            Ok(context) => {
                println!("{} Project structure is valid", "✓".green());
                context
            }
            Err(e) => {
                println!("{} {e}", "✗".red());
                return Err(e);
            }
        };

        let mut errors = 0usize;

        for name in context.project.artifact_names() {
            let spec = context.project.artifact(name)?;

            if spec.workspace.is_dir() {
                println!("{} artifact '{}': workspace {}", "✓".green(), name, spec.workspace.display());
            } else {
                errors += 1;
                println!(
                    "{} artifact '{}': workspace {} does not exist",
                    "✗".red(),
                    name,
                    spec.workspace.display()
                );
            }

            let template = spec.template_path();
            if template.is_file() {
                println!("{} artifact '{}': template {}", "✓".green(), name, spec.template.display());
            } else {
                errors += 1;
                println!(
                    "{} artifact '{}': template {} does not exist",
                    "✗".red(),
                    name,
                    template.display()
                );
            }
        }

        let program = packer_program();
        let packer_missing = if command_available(&program) {
            println!("{} packer binary '{program}' is available", "✓".green());
            false
        } else {
            errors += 1;
            println!(
                "{} packer binary '{program}' not found. Install packer or set KILN_PACKER",
                "✗".red()
            );
            true
        };

        if packer_missing && errors == 1 {
            return Err(KilnError::PackerNotFound {
                program,
            }
            .into());
        }
        if errors > 0 {
            return Err(anyhow!("Validation failed with {errors} error(s)"));
        }

        println!("\n{} Project is ready to bake", "✓".green());
        Ok(())
    }
}
