//! Artifact declarations from the project file
//!
//! One [`ArtifactSpec`] is one `[artifacts.<name>]` table in kiln.toml: where
//! the artifact builds, which template drives the build, where the builder's
//! manifest lands, and which files should trigger a rebuild when they change.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default manifest file name, matching Packer's manifest post-processor.
pub const DEFAULT_MANIFEST_NAME: &str = "packer-manifest.json";

/// Declaration of one buildable artifact.
///
/// The four fields are the entire contract between the project file and the
/// build pipeline:
///
/// - `workspace`: the directory the build runs in. Relative values are
///   resolved against the project file's directory when the spec is handed
///   out by [`Project::artifact`](crate::project::Project::artifact).
/// - `template`: passed to the external builder as-is; the builder resolves
///   it against its working directory (the workspace).
/// - `manifest`: where, relative to the workspace, the builder writes its
///   manifest. Defaults to [`DEFAULT_MANIFEST_NAME`].
/// - `files`: the explicit rebuild watch-list. Entries are either absolute or
///   workspace-relative; see [`watch_paths`](crate::builder::watch_paths).
///
/// # Examples
///
/// ```toml
/// [artifacts.web]
/// workspace = "images/web"
/// template = "web.pkr.hcl"
/// files = ["web.pkr.hcl", "scripts/provision.sh"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Directory the build runs in
    pub workspace: PathBuf,

    /// Builder template path, interpreted by the external tool
    pub template: PathBuf,

    /// Manifest location relative to the workspace
    #[serde(default = "default_manifest_name")]
    pub manifest: PathBuf,

    /// Explicit dependency watch-list (absolute or workspace-relative)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

fn default_manifest_name() -> PathBuf {
    PathBuf::from(DEFAULT_MANIFEST_NAME)
}

impl ArtifactSpec {
    /// Creates a spec with the default manifest name and no watch files.
    pub fn new(workspace: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            template: template.into(),
            manifest: default_manifest_name(),
            files: Vec::new(),
        }
    }

    /// Replaces the manifest location.
    #[must_use]
    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = manifest.into();
        self
    }

    /// Replaces the watch-list.
    #[must_use]
    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Full path the builder's manifest is expected at.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.workspace.join(&self.manifest)
    }

    /// Full path of the template when it is workspace-relative.
    ///
    /// Used for project-level checks only; the build itself passes
    /// `template` through untouched.
    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        if self.template.is_absolute() {
            self.template.clone()
        } else {
            self.workspace.join(&self.template)
        }
    }

    /// The workspace as a `Path`.
    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}
