//! Watch-path resolution for declared artifact files

use std::path::PathBuf;

use tracing::debug;

use crate::project::ArtifactSpec;

/// Resolves the artifact's declared file list into paths to watch for changes.
///
/// Packer has a full variable system with includes, which can reference
/// either local or absolute paths, so the files to watch must be declared
/// explicitly; nothing is discovered from the template. Entries keep their
/// declared order, duplicates included: absolute entries pass through
/// unchanged, relative ones are joined onto the artifact's workspace. No
/// existence check is performed, so a declared file that never appears on
/// disk simply never triggers a change.
#[must_use]
pub fn watch_paths(spec: &ArtifactSpec) -> Vec<PathBuf> {
    let paths: Vec<PathBuf> = spec
        .files
        .iter()
        .map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                spec.workspace.join(file)
            }
        })
        .collect();

    debug!(target: "builder", "Found files to watch: {:?}", paths);
    paths
}
