//! Integration tests for the `bake` command
//!
//! These tests drive the compiled `kiln` binary against a scripted packer
//! stand-in, so no real Packer installation (or Docker daemon) is needed.
//! The stand-in prints build output and exits with a chosen code; manifests
//! are either pre-written into the workspace or written by the stand-in
//! itself, exactly where a manifest post-processor would put them.

use anyhow::Result;

use kiln_cli::test_utils::PackerManifestFixture;

mod common;
use common::TestProject;

const BASIC_PROJECT: &str = r#"
[artifacts.web]
workspace = "images/web"
template = "web.pkr.hcl"
"#;

const MULTI_PROJECT: &str = r#"
[artifacts.web]
workspace = "images/web"
template = "web.pkr.hcl"

[artifacts.worker]
workspace = "images/worker"
template = "worker.pkr.hcl"

[artifacts.api]
workspace = "images/api"
template = "api.pkr.hcl"
"#;

/// A successful build streams the builder's output live and finishes by
/// printing the manifest's verified artifact identifier.
#[test]
fn test_bake_streams_output_and_prints_verified_id() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(BASIC_PROJECT)?;
    let workspace = project.create_workspace("images/web")?;
    PackerManifestFixture::docker("sha256:feedface01").write_to(&workspace)?;
    project.stub_packer_exit(0, "==> docker: Pulling image", "warning: noisy plugin")?;

    let output = project.run_kiln(&["bake", "web"])?;
    output
        .assert_success()
        .assert_stdout_contains("Baking web (1/1)")
        // Both of the builder's streams are forwarded to the caller's output.
        .assert_stdout_contains("==> docker: Pulling image")
        .assert_stdout_contains("warning: noisy plugin")
        .assert_stdout_contains("✓ web -> sha256:feedface01");

    Ok(())
}

/// When the builder exits non-zero the failure is reported as a build
/// failure. The manifest is never consulted, so a leftover stale manifest
/// in the workspace must not change the error.
#[test]
fn test_bake_failure_reports_build_error_not_manifest() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(BASIC_PROJECT)?;
    let workspace = project.create_workspace("images/web")?;
    PackerManifestFixture::stale("sha256:leftover").write_to(&workspace)?;
    project.stub_packer_exit(2, "==> docker: Step 1/4", "Error: provisioner failed")?;

    let output = project.run_kiln(&["bake", "web"])?;
    output
        .assert_failure()
        // Output produced before the failure was still forwarded live.
        .assert_stdout_contains("==> docker: Step 1/4")
        .assert_stderr_contains("Packer build failed for template 'web.pkr.hcl'")
        .assert_stderr_contains("manifest was not consulted")
        .assert_stderr_not_contains("Stale");

    Ok(())
}

/// A build that exits zero but leaves a stale manifest fails with the
/// staleness error, not a generic one.
#[test]
fn test_bake_rejects_stale_manifest_after_successful_build() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(BASIC_PROJECT)?;
    let workspace = project.create_workspace("images/web")?;
    PackerManifestFixture::stale("sha256:leftover").write_to(&workspace)?;
    project.stub_packer_exit(0, "==> docker: done", "")?;

    let output = project.run_kiln(&["bake", "web"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Stale packer manifest");

    Ok(())
}

/// `kiln bake` without names builds every declared artifact in name order.
#[test]
fn test_bake_all_builds_in_name_order() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(MULTI_PROJECT)?;
    for (name, id) in [
        ("api", "sha256:aaa111"),
        ("web", "sha256:beb222"),
        ("worker", "sha256:ccc333"),
    ] {
        let workspace = project.create_workspace(&format!("images/{name}"))?;
        PackerManifestFixture::docker(id).write_to(&workspace)?;
    }
    project.stub_packer_exit(0, "==> docker: built", "")?;

    let output = project.run_kiln(&["bake"])?;
    output
        .assert_success()
        .assert_stdout_contains("✓ api -> sha256:aaa111")
        .assert_stdout_contains("✓ web -> sha256:beb222")
        .assert_stdout_contains("✓ worker -> sha256:ccc333")
        .assert_stdout_contains("✓ Baked 3 artifacts");

    let api = output.stdout.find("Baking api (1/3)").expect("api built first");
    let web = output.stdout.find("Baking web (2/3)").expect("web built second");
    let worker = output.stdout.find("Baking worker (3/3)").expect("worker built third");
    assert!(api < web && web < worker, "builds out of order:\n{}", output.stdout);

    Ok(())
}

/// The first failing artifact aborts the run; later artifacts are never
/// attempted, earlier ones stay built.
#[cfg(unix)]
#[test]
fn test_bake_stops_at_first_failure() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(MULTI_PROJECT)?;
    for (name, id) in [("api", "sha256:aaa111"), ("web", "sha256:beb222")] {
        let workspace = project.create_workspace(&format!("images/{name}"))?;
        PackerManifestFixture::docker(id).write_to(&workspace)?;
    }
    project.create_workspace("images/worker")?;
    // Fail only the worker build; $2 is the template argument.
    project.stub_packer_script(
        "case \"$2\" in\n  worker.pkr.hcl) exit 1 ;;\n  *) exit 0 ;;\nesac\n",
    )?;

    let output = project.run_kiln(&["bake"])?;
    output
        .assert_failure()
        .assert_stdout_contains("✓ api -> sha256:aaa111")
        .assert_stdout_contains("✓ web -> sha256:beb222")
        .assert_stdout_contains("Baking worker (3/3)")
        .assert_stdout_not_contains("Baked 3 artifacts")
        .assert_stderr_contains("Packer build failed for template 'worker.pkr.hcl'");

    Ok(())
}

/// End to end: no pre-written manifest. The stand-in writes one into its
/// working directory mid-build, like a real manifest post-processor, and
/// the pipeline picks it up from the workspace.
#[cfg(unix)]
#[test]
fn test_bake_reads_manifest_written_by_the_build() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(BASIC_PROJECT)?;
    project.create_workspace("images/web")?;

    let manifest = PackerManifestFixture::docker("sha256:e2e00001").content;
    project.stub_packer_script(&format!(
        "cat > packer-manifest.json <<'EOF'\n{manifest}\nEOF\necho \"==> docker: image built\"\nexit 0\n"
    ))?;

    let output = project.run_kiln(&["bake", "web"])?;
    output
        .assert_success()
        .assert_stdout_contains("==> docker: image built")
        .assert_stdout_contains("✓ web -> sha256:e2e00001");

    Ok(())
}

/// A declared `manifest` entry relocates where the verification step looks.
#[test]
fn test_bake_honors_declared_manifest_path() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(
        r#"
[artifacts.web]
workspace = "images/web"
template = "web.pkr.hcl"
manifest = "out/manifest.json"
"#,
    )?;
    project.create_workspace("images/web/out")?;
    let fixture = PackerManifestFixture::docker("sha256:relocated");
    project.write_file("images/web/out/manifest.json", &fixture.content)?;
    project.stub_packer_exit(0, "==> docker: built", "")?;

    let output = project.run_kiln(&["bake", "web"])?;
    output
        .assert_success()
        .assert_stdout_contains("✓ web -> sha256:relocated");

    Ok(())
}

#[test]
fn test_bake_unknown_artifact_fails() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project(BASIC_PROJECT)?;

    let output = project.run_kiln(&["bake", "nope"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Artifact 'nope' is not defined in the project file");

    Ok(())
}

#[test]
fn test_bake_empty_project_fails() -> Result<()> {
    let project = TestProject::new()?;
    project.write_project("# no artifacts declared\n")?;

    let output = project.run_kiln(&["bake"])?;
    output
        .assert_failure()
        .assert_stderr_contains("No artifacts declared");

    Ok(())
}
