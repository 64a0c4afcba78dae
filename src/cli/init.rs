//! Initialize a new Kiln project with a project file.
//!
//! This module provides the `init` command which creates a new `kiln.toml`
//! project file in the specified directory (or current directory). The
//! project file declares the artifacts Kiln can bake: each one names a
//! workspace, a Packer template, and the files that should trigger a
//! rebuild.
//!
//! # Examples
//!
//! Initialize a project in the current directory:
//! ```bash
//! kiln init
//! ```
//!
//! Initialize a project in a specific directory:
//! ```bash
//! kiln init ./my-images
//! ```
//!
//! Force overwrite an existing project file:
//! ```bash
//! kiln init --force
//! ```
//!
//! # Error Conditions
//!
//! - Returns error if a project file already exists and `--force` is not used
//! - Returns error if unable to create the target directory
//! - Returns error if unable to write the project file (permissions, disk space, etc.)
//!
//! # Safety
//!
//! This command is safe to run and will not overwrite existing files unless
//! `--force` is specified.

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use crate::project::PROJECT_FILE_NAME;

/// Command to initialize a new Kiln project with a project file.
#[derive(Args)]
pub struct InitCommand {
    /// Directory to initialize (defaults to current directory)
    ///
    /// If the specified directory doesn't exist, it will be created.
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Force overwrite if a project file already exists
    ///
    /// By default, the command will fail if a `kiln.toml` file already exists
    /// in the target directory. Use this flag to overwrite an existing file.
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    /// Execute the init command to create a new project file.
    ///
    /// Creates `kiln.toml` with a commented starter template and adds
    /// Packer's build droppings to `.gitignore` so generated manifests and
    /// caches stay out of version control.
    pub async fn execute(self) -> Result<()> {
        let target_dir = self.path.unwrap_or_else(|| PathBuf::from("."));
        let project_path = target_dir.join(PROJECT_FILE_NAME);
        let gitignore_path = target_dir.join(".gitignore");

        // Check if a project file already exists
        if project_path.exists() && !self.force {
            return Err(anyhow!(
                "Project file already exists at {}. Use --force to overwrite",
                project_path.display()
            ));
        }

        // Create directory if it doesn't exist
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)?;
        }

        // Write a commented starter template
        let template = r#"# Kiln Project
# This file declares the artifacts Kiln can bake with Packer.
#
# Each artifact names a workspace directory (where `packer build` runs and
# where the manifest lands), a template, and the files whose changes should
# trigger a rebuild. Templates need a manifest post-processor so the build
# result can be verified:
#
#   post-processor "manifest" {}

# [artifacts.web]
# workspace = "images/web"
# template = "web.pkr.hcl"
# files = ["web.pkr.hcl", "scripts/provision.sh"]

# [artifacts.worker]
# workspace = "images/worker"
# template = "worker.pkr.hcl"
# manifest = "packer-manifest.json"  # workspace-relative, this is the default
"#;
        fs::write(&project_path, template)?;

        // Update or create .gitignore with Packer's build droppings
        let gitignore_entries = vec!["packer_cache/", "packer-manifest.json", "crash.log"];

        let mut gitignore_content = if gitignore_path.exists() {
            fs::read_to_string(&gitignore_path)?
        } else {
            String::new()
        };

        // Check if the Packer section exists
        if !gitignore_content.contains("# Packer build output") {
            if !gitignore_content.is_empty() && !gitignore_content.ends_with('\n') {
                gitignore_content.push('\n');
            }
            if !gitignore_content.is_empty() {
                gitignore_content.push('\n');
            }
            gitignore_content.push_str("# Packer build output\n");

            for entry in gitignore_entries {
                // Check if entry doesn't already exist
                if !gitignore_content.lines().any(|line| line.trim() == entry) {
                    gitignore_content.push_str(entry);
                    gitignore_content.push('\n');
                }
            }

            fs::write(&gitignore_path, gitignore_content)?;
            println!("{} Updated .gitignore with Packer entries", "✓".green());
        }

        println!("{} Initialized kiln.toml at {}", "✓".green(), project_path.display());

        println!("\n{}", "Next steps:".cyan());
        println!("  Declare an artifact by uncommenting one of the examples, then:");
        println!("    {}  # check workspaces, templates, and the packer binary", "kiln validate".bright_white());
        println!("    {}      # build and verify", "kiln bake".bright_white());

        Ok(())
    }
}
