//! Project file (kiln.toml) parsing, validation, and discovery
//!
//! A project file declares named artifacts under `[artifacts.<name>]` tables.
//! Loading remembers the file's directory so relative workspaces resolve
//! against the project root no matter where the command was run from, and
//! discovery walks parent directories the way Cargo and Git find their
//! project files.
//!
//! # Example
//!
//! ```toml
//! # kiln.toml
//! [artifacts.web]
//! workspace = "images/web"
//! template = "web.pkr.hcl"
//! files = ["web.pkr.hcl", "scripts/provision.sh"]
//!
//! [artifacts.worker]
//! workspace = "images/worker"
//! template = "worker.pkr.hcl"
//! ```
//!
//! ```rust,no_run
//! use kiln_cli::project::{Project, find_project};
//!
//! # fn main() -> anyhow::Result<()> {
//! let path = find_project()?;
//! let project = Project::load(&path)?;
//! let web = project.artifact("web")?; // workspace already resolved
//! println!("builds in {}", web.workspace().display());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::KilnError;

mod artifact;

pub use artifact::{ArtifactSpec, DEFAULT_MANIFEST_NAME};

/// File name Kiln projects are declared in.
pub const PROJECT_FILE_NAME: &str = "kiln.toml";

/// Parsed kiln.toml.
///
/// Artifact specs handed out by [`artifact`](Self::artifact) have their
/// workspaces resolved against the project file's directory; the raw
/// `artifacts` table keeps the paths exactly as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    /// Declared artifacts, keyed by name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub artifacts: HashMap<String, ArtifactSpec>,

    /// Directory containing the project file, for resolving relative
    /// workspaces. Not part of the file format.
    #[serde(skip)]
    project_dir: Option<PathBuf>,
}

impl Project {
    /// Creates an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a project file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML for this schema
    /// (reported as [`KilnError::ProjectParseError`]), or fails
    /// [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;

        let mut project: Self = toml::from_str(&content)
            .map_err(|e| KilnError::ProjectParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
            .with_context(|| {
                format!(
                    "Invalid TOML syntax in project file: {}\n\n\
                    Common TOML syntax errors:\n\
                    - Missing quotes around strings\n\
                    - Unmatched brackets [ ] or braces {{ }}\n\
                    - Invalid characters in keys or values",
                    path.display()
                )
            })?;

        // Remember where the file lives so relative workspaces resolve
        // against the project root.
        project.project_dir = Some(
            path.parent()
                .ok_or_else(|| anyhow::anyhow!("Project path has no parent directory"))?
                .to_path_buf(),
        );

        project.validate()?;

        Ok(project)
    }

    /// Checks the declared artifacts for structural mistakes.
    ///
    /// A project without artifacts is valid (a freshly initialized file has
    /// only commented examples); commands that need artifacts report that
    /// case themselves.
    ///
    /// # Errors
    ///
    /// [`KilnError::ProjectValidationError`] naming the first offending
    /// artifact: empty workspace or template, or an absolute manifest path
    /// (the manifest location is defined as workspace-relative).
    pub fn validate(&self) -> Result<(), KilnError> {
        for (name, spec) in &self.artifacts {
            if name.trim().is_empty() {
                return Err(KilnError::ProjectValidationError {
                    reason: "artifact names must not be empty".to_string(),
                });
            }
            if spec.workspace.as_os_str().is_empty() {
                return Err(KilnError::ProjectValidationError {
                    reason: format!("artifact '{name}' has an empty workspace"),
                });
            }
            if spec.template.as_os_str().is_empty() {
                return Err(KilnError::ProjectValidationError {
                    reason: format!("artifact '{name}' has an empty template"),
                });
            }
            if spec.manifest.is_absolute() {
                return Err(KilnError::ProjectValidationError {
                    reason: format!(
                        "artifact '{name}' declares an absolute manifest path; it must be workspace-relative"
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns the named artifact with its workspace resolved.
    ///
    /// Relative workspaces are joined onto the project file's directory;
    /// absolute ones are returned unchanged.
    ///
    /// # Errors
    ///
    /// [`KilnError::ArtifactNotFound`] when no `[artifacts.<name>]` table
    /// exists for the name.
    pub fn artifact(&self, name: &str) -> Result<ArtifactSpec, KilnError> {
        self.artifacts
            .get(name)
            .map(|spec| self.resolved_spec(spec))
            .ok_or_else(|| KilnError::ArtifactNotFound {
                name: name.to_string(),
            })
    }

    /// Declared artifact names, sorted for stable iteration and output.
    #[must_use]
    pub fn artifact_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.artifacts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Directory the project file was loaded from, when loaded from disk.
    #[must_use]
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    fn resolved_spec(&self, spec: &ArtifactSpec) -> ArtifactSpec {
        let mut spec = spec.clone();
        if !spec.workspace.is_absolute() {
            if let Some(dir) = &self.project_dir {
                spec.workspace = dir.join(&spec.workspace);
            }
        }
        spec
    }
}

/// Find the project file by searching up from the current directory.
///
/// Looks for `kiln.toml` starting at the current working directory and
/// walking up until found or the filesystem root is reached. Mirrors Cargo,
/// Git, and NPM project file discovery so commands work from any
/// subdirectory.
///
/// # Errors
///
/// [`KilnError::ProjectNotFound`] when the search exhausts the directory
/// tree.
pub fn find_project() -> Result<PathBuf> {
    let current = std::env::current_dir()
        .context("Cannot determine current working directory. This may indicate a permission issue or corrupted filesystem")?;
    find_project_from(current)
}

/// Find the project file using an explicit path or directory search.
///
/// Uses the explicit path when provided (failing if it does not exist),
/// otherwise falls back to [`find_project`].
pub fn find_project_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            if path.exists() {
                Ok(path)
            } else {
                Err(KilnError::ProjectNotFound.into())
            }
        }
        None => find_project(),
    }
}

/// Find the project file by searching up from a specific directory.
pub fn find_project_from(mut current: PathBuf) -> Result<PathBuf> {
    loop {
        let project_path = current.join(PROJECT_FILE_NAME);
        if project_path.exists() {
            return Ok(project_path);
        }

        if !current.pop() {
            return Err(KilnError::ProjectNotFound.into());
        }
    }
}
