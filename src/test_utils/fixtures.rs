//! Test fixtures for creating sample data structures
//!
//! This module provides builders for creating test data like project files
//! and packer manifests.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::project::{DEFAULT_MANIFEST_NAME, PROJECT_FILE_NAME};

/// Test fixture for creating sample kiln.toml files
#[derive(Clone, Debug)]
pub struct ProjectFixture {
    pub content: String,
    pub name: String,
}

impl ProjectFixture {
    /// Basic project with a single artifact
    pub fn basic() -> Self {
        Self {
            name: "basic".to_string(),
            content: r#"
[artifacts.web]
workspace = "images/web"
template = "web.pkr.hcl"
files = ["web.pkr.hcl", "scripts/provision.sh"]
"#
            .trim()
            .to_string(),
        }
    }

    /// Project with several artifacts
    pub fn multi() -> Self {
        Self {
            name: "multi".to_string(),
            content: r#"
[artifacts.web]
workspace = "images/web"
template = "web.pkr.hcl"

[artifacts.worker]
workspace = "images/worker"
template = "worker.pkr.hcl"
files = ["worker.pkr.hcl"]

[artifacts.api]
workspace = "images/api"
template = "api.pkr.hcl"
"#
            .trim()
            .to_string(),
        }
    }

    /// Project with invalid syntax
    pub fn invalid_syntax() -> Self {
        Self {
            name: "invalid_syntax".to_string(),
            content: r#"
[artifacts.web
workspace = "images/web"
template = "web.pkr.hcl
"#
            .trim()
            .to_string(),
        }
    }

    /// Project with missing required fields
    pub fn missing_fields() -> Self {
        Self {
            name: "missing_fields".to_string(),
            content: r#"
[artifacts.web]
workspace = "images/web"  # Missing template
"#
            .trim()
            .to_string(),
        }
    }

    /// Empty project (only comments)
    pub fn empty() -> Self {
        Self {
            name: "empty".to_string(),
            content: r#"
# Empty kiln.toml file
# No artifacts defined
"#
            .trim()
            .to_string(),
        }
    }

    /// Write the project file to a directory
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let project_path = dir.join(PROJECT_FILE_NAME);
        fs::write(&project_path, &self.content)?;
        Ok(project_path)
    }
}

/// Test fixture for creating sample packer-manifest.json files
///
/// The manifests mirror what `packer build` writes when a template carries a
/// manifest post-processor, including the `files: null` and `custom_data`
/// noise real runs produce.
#[derive(Clone, Debug)]
pub struct PackerManifestFixture {
    pub content: String,
    pub name: String,
}

impl PackerManifestFixture {
    /// Single docker build whose run uuid matches `last_run_uuid`
    pub fn docker(artifact_id: &str) -> Self {
        let run_uuid = Uuid::new_v4();
        Self {
            name: "docker".to_string(),
            content: format!(
                r#"{{
  "builds": [
    {{
      "name": "docker",
      "builder_type": "docker",
      "build_time": 1672531200,
      "files": null,
      "artifact_id": "{artifact_id}",
      "packer_run_uuid": "{run_uuid}",
      "custom_data": null
    }}
  ],
  "last_run_uuid": "{run_uuid}"
}}"#
            ),
        }
    }

    /// Docker build with an explicit file list
    pub fn docker_with_files(artifact_id: &str, files: &[&str]) -> Self {
        let run_uuid = Uuid::new_v4();
        let files_json = files
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            name: "docker_with_files".to_string(),
            content: format!(
                r#"{{
  "builds": [
    {{
      "name": "docker",
      "builder_type": "docker",
      "build_time": 1672531200,
      "files": [{files_json}],
      "artifact_id": "{artifact_id}",
      "packer_run_uuid": "{run_uuid}",
      "custom_data": null
    }}
  ],
  "last_run_uuid": "{run_uuid}"
}}"#
            ),
        }
    }

    /// Last record's run uuid differs from `last_run_uuid`
    pub fn stale(artifact_id: &str) -> Self {
        Self {
            name: "stale".to_string(),
            content: format!(
                r#"{{
  "builds": [
    {{
      "name": "docker",
      "builder_type": "docker",
      "build_time": 1672531200,
      "files": null,
      "artifact_id": "{artifact_id}",
      "packer_run_uuid": "{}",
      "custom_data": null
    }}
  ],
  "last_run_uuid": "{}"
}}"#,
                Uuid::new_v4(),
                Uuid::new_v4()
            ),
        }
    }

    /// Last record was produced by a non-docker builder
    pub fn wrong_builder(builder_type: &str) -> Self {
        let run_uuid = Uuid::new_v4();
        Self {
            name: "wrong_builder".to_string(),
            content: format!(
                r#"{{
  "builds": [
    {{
      "name": "{builder_type}",
      "builder_type": "{builder_type}",
      "build_time": 1672531200,
      "files": null,
      "artifact_id": "ami-0123456789abcdef0",
      "packer_run_uuid": "{run_uuid}",
      "custom_data": null
    }}
  ],
  "last_run_uuid": "{run_uuid}"
}}"#
            ),
        }
    }

    /// Manifest with no build records
    pub fn empty() -> Self {
        Self {
            name: "empty".to_string(),
            content: format!(
                r#"{{
  "builds": [],
  "last_run_uuid": "{}"
}}"#,
                Uuid::new_v4()
            ),
        }
    }

    /// Truncated JSON
    pub fn malformed() -> Self {
        Self {
            name: "malformed".to_string(),
            content: r#"{"builds": [{"name": "docker", "#.to_string(),
        }
    }

    /// Write the manifest to a workspace directory under the default name
    pub fn write_to(&self, workspace: &Path) -> Result<PathBuf> {
        let manifest_path = workspace.join(DEFAULT_MANIFEST_NAME);
        fs::write(&manifest_path, &self.content)?;
        Ok(manifest_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::BuildManifest;
    use crate::project::Project;
    use tempfile::TempDir;

    #[test]
    fn test_project_fixtures_parse() {
        let temp = TempDir::new().unwrap();
        for fixture in [ProjectFixture::basic(), ProjectFixture::multi(), ProjectFixture::empty()] {
            let path = fixture.write_to(temp.path()).unwrap();
            Project::load(&path).unwrap_or_else(|e| panic!("{} fixture: {e}", fixture.name));
        }
    }

    #[test]
    fn test_invalid_fixtures_fail_to_parse() {
        let temp = TempDir::new().unwrap();
        for fixture in [ProjectFixture::invalid_syntax(), ProjectFixture::missing_fields()] {
            let path = fixture.write_to(temp.path()).unwrap();
            assert!(Project::load(&path).is_err(), "{} fixture parsed", fixture.name);
        }
    }

    #[test]
    fn test_docker_manifest_fixture_verifies() {
        let temp = TempDir::new().unwrap();
        PackerManifestFixture::docker("sha256:49dd9b4b").write_to(temp.path()).unwrap();

        let manifest =
            BuildManifest::load(temp.path(), Path::new(DEFAULT_MANIFEST_NAME)).unwrap();
        assert_eq!(manifest.verified_artifact_id("docker").unwrap(), "sha256:49dd9b4b");
    }
}
