//! Common utilities for CLI commands

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::project::{ArtifactSpec, Project, find_project_with_optional};

/// Output format selection for commands that support machine-readable output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,

    /// Structured JSON output for automation.
    Json,
}

/// Common context for CLI commands that operate on a loaded project.
///
/// The loaded [`Project`] carries the project directory itself, so relative
/// workspace resolution has exactly one source of truth.
#[derive(Debug)]
pub struct CommandContext {
    /// Parsed project file (kiln.toml)
    pub project: Project,
    /// Path to the project file
    pub project_path: PathBuf,
}

impl CommandContext {
    /// Locates and loads the project, honoring an explicit `--project-path`.
    ///
    /// # Errors
    /// Returns an error if no project file can be found or it fails to load.
    pub fn locate(explicit_path: Option<PathBuf>) -> Result<Self> {
        let project_path = find_project_with_optional(explicit_path)?;
        Self::from_project_path(project_path)
    }

    /// Creates a context from a known project file path.
    ///
    /// # Errors
    /// Returns an error if the project fails to load or validate.
    pub fn from_project_path(project_path: impl AsRef<Path>) -> Result<Self> {
        let project_path = project_path.as_ref();
        let project = Project::load(project_path)?;

        Ok(Self {
            project,
            project_path: project_path.to_path_buf(),
        })
    }

    /// Resolves the artifacts a command should operate on.
    ///
    /// An empty `names` slice selects every declared artifact in sorted name
    /// order; otherwise each name is looked up in the order given.
    ///
    /// # Errors
    /// Returns an error if any requested name is not declared.
    pub fn select_artifacts(&self, names: &[String]) -> Result<Vec<(String, ArtifactSpec)>> {
        if names.is_empty() {
            self.project
                .artifact_names()
                .into_iter()
                .map(|name| Ok((name.to_string(), self.project.artifact(name)?)))
                .collect()
        } else {
            names
                .iter()
                .map(|name| Ok((name.clone(), self.project.artifact(name)?)))
                .collect()
        }
    }
}
