//! Show the files that trigger a rebuild of an artifact.
//!
//! This module provides the `deps` command which resolves an artifact's
//! declared file list into watch paths: absolute entries unchanged, relative
//! entries joined onto the artifact's workspace. The output preserves the
//! declared order, so it can feed a file watcher or a change-detection step
//! in a pipeline directly.
//!
//! # Examples
//!
//! ```bash
//! kiln deps web
//! kiln deps web --format json
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::builder::watch_paths;
use crate::cli::common::{CommandContext, OutputFormat};

/// Command to print an artifact's watch paths.
#[derive(Args)]
pub struct DepsCommand {
    /// Artifact whose watch paths to print
    #[arg(value_name = "NAME")]
    name: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl DepsCommand {
    /// Execute the deps command, finding the project file automatically
    /// unless an explicit path was given.
    pub async fn execute_with_project_path(self, project_path: Option<PathBuf>) -> Result<()> {
        let context = CommandContext::locate(project_path)?;
        self.execute_from_context(&context)
    }

    fn execute_from_context(self, context: &CommandContext) -> Result<()> {
        let spec = context.project.artifact(&self.name)?;
        let paths = watch_paths(&spec);

        match self.format {
            OutputFormat::Text => {
                for path in &paths {
                    println!("{}", path.display());
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&paths)?);
            }
        }

        Ok(())
    }
}
