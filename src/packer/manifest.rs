//! Packer build manifest parsing and validation
//!
//! Packer's manifest post-processor appends one record per completed build to
//! a JSON file in the workspace, together with a top-level id of the run that
//! wrote last. This module reads that file and answers the only question the
//! pipeline has: *which artifact did the invocation that just ran produce?*
//!
//! Trust is the point of the validation. A manifest file survives in the
//! workspace across runs, so the last record may be leftover from an earlier
//! invocation (stale) or may have been produced by a builder the pipeline
//! cannot use. Both conditions surface as their own error kinds rather than
//! being collapsed into a generic failure.
//!
//! The wire format is fixed by the external tool; field names here must not
//! be renamed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::KilnError;

/// Builder type tag the pipeline accepts: local Docker image builds.
pub const DOCKER_BUILDER_TYPE: &str = "docker";

/// One completed build reported by Packer.
///
/// Field names mirror `packer-manifest.json` exactly. Unknown fields written
/// by newer Packer versions (e.g. `custom_data`) are ignored on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Build name from the template (may be empty)
    pub name: String,
    /// Which builder produced the artifact (e.g. `docker`, `amazon-ebs`)
    pub builder_type: String,
    /// Build duration in seconds
    pub build_time: i64,
    /// Output files, when the builder reports any (`null` for image builds)
    #[serde(default)]
    pub files: Option<Vec<String>>,
    /// Identifier of the produced artifact (e.g. an image digest)
    pub artifact_id: String,
    /// Id of the Packer run that wrote this record
    pub packer_run_uuid: String,
}

/// The manifest Packer writes on completion.
///
/// Records are in build order; "last" means most recently appended. The
/// top-level `last_run_uuid` names the invocation that wrote most recently,
/// which [`verified_artifact_id`](Self::verified_artifact_id) checks the
/// final record against.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use kiln_cli::packer::{BuildManifest, DOCKER_BUILDER_TYPE};
///
/// # fn main() -> Result<(), kiln_cli::core::KilnError> {
/// let manifest =
///     BuildManifest::load(Path::new("/srv/images/web"), Path::new("packer-manifest.json"))?;
/// let image = manifest.verified_artifact_id(DOCKER_BUILDER_TYPE)?;
/// println!("built {image}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Completed builds, oldest first. A manifest written without the key
    /// decodes as empty rather than failing to parse.
    #[serde(default)]
    pub builds: Vec<BuildRecord>,
    /// Id of the run that wrote the manifest last
    pub last_run_uuid: String,
    /// Where the manifest was read from, for error reporting
    #[serde(skip)]
    path: PathBuf,
}

impl BuildManifest {
    /// Reads and parses the manifest for one artifact.
    ///
    /// The on-disk location is the workspace directory joined with the
    /// workspace-relative manifest path declared in the artifact spec.
    ///
    /// # Errors
    ///
    /// - [`KilnError::ManifestUnreadable`] if the file is missing or cannot
    ///   be read, wrapping the I/O cause
    /// - [`KilnError::ManifestMalformed`] if the content does not parse as a
    ///   manifest, wrapping the parse cause
    pub fn load(workspace: &Path, manifest: &Path) -> Result<Self, KilnError> {
        let path = workspace.join(manifest);
        tracing::debug!(target: "manifest", "Reading packer manifest '{}'", path.display());

        let content =
            std::fs::read_to_string(&path).map_err(|source| KilnError::ManifestUnreadable {
                path: path.clone(),
                source,
            })?;

        let mut parsed: Self =
            serde_json::from_str(&content).map_err(|source| KilnError::ManifestMalformed {
                path: path.clone(),
                source,
            })?;
        parsed.path = path;

        Ok(parsed)
    }

    /// Returns the most recently appended build record, if any.
    #[must_use]
    pub fn last_build(&self) -> Option<&BuildRecord> {
        self.builds.last()
    }

    /// Validates the manifest and returns the last record's artifact id.
    ///
    /// Checks, in order:
    /// 1. at least one build record exists,
    /// 2. the last record was written by the run the manifest declares last
    ///    (anything else means the record is leftover from an earlier run),
    /// 3. the last record's builder type is `expected_builder`.
    ///
    /// Staleness is checked before builder type on purpose: a leftover
    /// record is reported as stale no matter which builder wrote it.
    ///
    /// # Errors
    ///
    /// [`KilnError::ManifestEmpty`], [`KilnError::StaleManifest`], or
    /// [`KilnError::UnexpectedBuilderType`], each naming the manifest path
    /// and the observed values.
    pub fn verified_artifact_id(&self, expected_builder: &str) -> Result<&str, KilnError> {
        let last = self.builds.last().ok_or_else(|| KilnError::ManifestEmpty {
            path: self.path.clone(),
        })?;

        if last.packer_run_uuid != self.last_run_uuid {
            return Err(KilnError::StaleManifest {
                path: self.path.clone(),
                record_run_uuid: last.packer_run_uuid.clone(),
                last_run_uuid: self.last_run_uuid.clone(),
            });
        }

        if last.builder_type != expected_builder {
            return Err(KilnError::UnexpectedBuilderType {
                path: self.path.clone(),
                expected: expected_builder.to_string(),
                actual: last.builder_type.clone(),
            });
        }

        Ok(&last.artifact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shaped like real packer output, `custom_data` and `files: null`
    /// included.
    const REAL_MANIFEST: &str = r#"{
        "builds": [
            {
                "name": "web",
                "builder_type": "docker",
                "build_time": 1608084919,
                "files": null,
                "artifact_id": "sha256:b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c",
                "packer_run_uuid": "4a2b0b22-8a98-4fb8-9f5c-2c4b7c0c7f4e",
                "custom_data": null
            }
        ],
        "last_run_uuid": "4a2b0b22-8a98-4fb8-9f5c-2c4b7c0c7f4e"
    }"#;

    fn manifest_with(builds: &str, last_run_uuid: &str) -> BuildManifest {
        let raw = format!(r#"{{"builds": [{builds}], "last_run_uuid": "{last_run_uuid}"}}"#);
        serde_json::from_str(&raw).expect("test manifest parses")
    }

    fn record(builder_type: &str, artifact_id: &str, run_uuid: &str) -> String {
        format!(
            r#"{{"name": "b", "builder_type": "{builder_type}", "build_time": 7,
                 "files": null, "artifact_id": "{artifact_id}", "packer_run_uuid": "{run_uuid}"}}"#
        )
    }

    #[test]
    fn test_parses_real_shaped_manifest() {
        let manifest: BuildManifest = serde_json::from_str(REAL_MANIFEST).unwrap();
        assert_eq!(manifest.builds.len(), 1);
        assert_eq!(manifest.builds[0].builder_type, "docker");
        assert_eq!(manifest.builds[0].build_time, 1608084919);
        assert_eq!(manifest.builds[0].files, None);
        assert_eq!(manifest.last_run_uuid, "4a2b0b22-8a98-4fb8-9f5c-2c4b7c0c7f4e");
    }

    #[test]
    fn test_verified_artifact_id_happy_path() {
        let manifest: BuildManifest = serde_json::from_str(REAL_MANIFEST).unwrap();
        let id = manifest.verified_artifact_id(DOCKER_BUILDER_TYPE).unwrap();
        assert_eq!(id, "sha256:b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c");
    }

    #[test]
    fn test_verified_artifact_id_uses_last_record() {
        let builds =
            format!("{}, {}", record("docker", "sha256:old", "run-1"), record("docker", "sha256:new", "run-2"));
        let manifest = manifest_with(&builds, "run-2");
        assert_eq!(manifest.verified_artifact_id(DOCKER_BUILDER_TYPE).unwrap(), "sha256:new");
    }

    #[test]
    fn test_mismatched_run_uuid_is_stale() {
        let manifest = manifest_with(&record("docker", "sha256:x", "run-old"), "run-new");
        match manifest.verified_artifact_id(DOCKER_BUILDER_TYPE) {
            Err(KilnError::StaleManifest {
                record_run_uuid,
                last_run_uuid,
                ..
            }) => {
                assert_eq!(record_run_uuid, "run-old");
                assert_eq!(last_run_uuid, "run-new");
            }
            other => panic!("expected StaleManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_wins_over_builder_type() {
        // Leftover record from another run, wrong builder type as well: the
        // run identity check comes first.
        let manifest = manifest_with(&record("amazon-ebs", "ami-123", "run-old"), "run-new");
        match manifest.verified_artifact_id(DOCKER_BUILDER_TYPE) {
            Err(KilnError::StaleManifest {
                ..
            }) => {}
            other => panic!("expected StaleManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_builder_type() {
        let manifest = manifest_with(&record("amazon-ebs", "ami-123", "run-1"), "run-1");
        match manifest.verified_artifact_id(DOCKER_BUILDER_TYPE) {
            Err(KilnError::UnexpectedBuilderType {
                expected,
                actual,
                ..
            }) => {
                assert_eq!(expected, "docker");
                assert_eq!(actual, "amazon-ebs");
            }
            other => panic!("expected UnexpectedBuilderType, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_builds_is_manifest_empty() {
        let manifest: BuildManifest =
            serde_json::from_str(r#"{"builds": [], "last_run_uuid": "run-1"}"#).unwrap();
        match manifest.verified_artifact_id(DOCKER_BUILDER_TYPE) {
            Err(KilnError::ManifestEmpty {
                ..
            }) => {}
            other => panic!("expected ManifestEmpty, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_builds_key_decodes_empty() {
        let manifest: BuildManifest =
            serde_json::from_str(r#"{"last_run_uuid": "run-1"}"#).unwrap();
        assert!(manifest.builds.is_empty());
        assert!(matches!(
            manifest.verified_artifact_id(DOCKER_BUILDER_TYPE),
            Err(KilnError::ManifestEmpty { .. })
        ));
    }

    #[test]
    fn test_missing_last_run_uuid_is_malformed_on_load() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("m.json"), r#"{"builds": []}"#).unwrap();

        match BuildManifest::load(temp.path(), Path::new("m.json")) {
            Err(KilnError::ManifestMalformed {
                ..
            }) => {}
            other => panic!("expected ManifestMalformed, got {other:?}"),
        }
    }

    #[test]
    fn test_load_joins_workspace_and_relative_path() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("out")).unwrap();
        std::fs::write(temp.path().join("out/manifest.json"), REAL_MANIFEST).unwrap();

        let manifest = BuildManifest::load(temp.path(), Path::new("out/manifest.json")).unwrap();
        assert_eq!(manifest.builds.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_unreadable_with_io_cause() {
        let temp = tempfile::TempDir::new().unwrap();

        match BuildManifest::load(temp.path(), Path::new("missing.json")) {
            Err(KilnError::ManifestUnreadable {
                path,
                source,
            }) => {
                assert!(path.ends_with("missing.json"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected ManifestUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn test_load_garbage_is_malformed() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("m.json"), "not json at all {").unwrap();

        match BuildManifest::load(temp.path(), Path::new("m.json")) {
            Err(KilnError::ManifestMalformed {
                path, ..
            }) => assert!(path.ends_with("m.json")),
            other => panic!("expected ManifestMalformed, got {other:?}"),
        }
    }

    #[test]
    fn test_error_messages_name_the_manifest_path() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("m.json"),
            r#"{"builds": [], "last_run_uuid": "r"}"#,
        )
        .unwrap();

        let manifest = BuildManifest::load(temp.path(), Path::new("m.json")).unwrap();
        let err = manifest.verified_artifact_id(DOCKER_BUILDER_TYPE).unwrap_err();
        assert!(err.to_string().contains("m.json"));
    }

    #[test]
    fn test_type_mismatch_in_record_is_malformed() {
        let temp = tempfile::TempDir::new().unwrap();
        // build_time as a string instead of a number
        std::fs::write(
            temp.path().join("m.json"),
            r#"{"builds": [{"name": "b", "builder_type": "docker", "build_time": "7",
                "files": null, "artifact_id": "a", "packer_run_uuid": "r"}],
                "last_run_uuid": "r"}"#,
        )
        .unwrap();

        assert!(matches!(
            BuildManifest::load(temp.path(), Path::new("m.json")),
            Err(KilnError::ManifestMalformed { .. })
        ));
    }

    #[test]
    fn test_files_list_survives_round_trip() {
        let raw = r#"{"builds": [{"name": "b", "builder_type": "docker", "build_time": 1,
            "files": ["out/disk.img"], "artifact_id": "a", "packer_run_uuid": "r"}],
            "last_run_uuid": "r"}"#;
        let manifest: BuildManifest = serde_json::from_str(raw).unwrap();
        assert_eq!(
            manifest.builds[0].files.as_deref(),
            Some(["out/disk.img".to_string()].as_slice())
        );
    }
}
