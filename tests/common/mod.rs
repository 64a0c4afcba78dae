//! Common test utilities and fixtures for Kiln integration tests
//!
//! This module consolidates frequently used test patterns to reduce
//! duplication: a temporary project layout, a scripted stand-in for the
//! packer binary, and assertion helpers over command output.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use kiln_cli::utils::platform::PACKER_ENV;

/// Test project builder for creating test environments
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    stub_dir: PathBuf,
}

impl TestProject {
    /// Create a new test project with default structure
    pub fn new() -> Result<Self> {
        // Honors RUST_LOG for test-side diagnostics
        kiln_cli::test_utils::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let stub_dir = temp_dir.path().join("bin");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&stub_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            stub_dir,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Write a kiln.toml to the project directory
    pub fn write_project(&self, content: &str) -> Result<()> {
        let project_path = self.project_dir.join("kiln.toml");
        fs::write(&project_path, content)
            .with_context(|| format!("Failed to write project file to {project_path:?}"))?;
        Ok(())
    }

    /// Create a workspace directory under the project
    pub fn create_workspace(&self, rel: &str) -> Result<PathBuf> {
        let workspace = self.project_dir.join(rel);
        fs::create_dir_all(&workspace)?;
        Ok(workspace)
    }

    /// Create a file under the project directory, creating parents as needed
    pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
        let path = self.project_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(())
    }

    /// Path the packer stand-in is (or would be) installed at
    pub fn stub_packer_path(&self) -> PathBuf {
        if cfg!(windows) {
            self.stub_dir.join("packer.bat")
        } else {
            self.stub_dir.join("packer")
        }
    }

    /// Install a scripted packer stand-in that prints one line to each
    /// stream and exits with the given code
    pub fn stub_packer_exit(&self, code: i32, stdout_line: &str, stderr_line: &str) -> Result<()> {
        let script = if cfg!(windows) {
            format!("@echo off\r\necho {stdout_line}\r\necho {stderr_line} 1>&2\r\nexit /b {code}\r\n")
        } else {
            format!("#!/bin/sh\necho \"{stdout_line}\"\necho \"{stderr_line}\" >&2\nexit {code}\n")
        };
        self.install_stub(&script)
    }

    /// Install a packer stand-in from a raw script body (unix shell)
    #[cfg(unix)]
    pub fn stub_packer_script(&self, body: &str) -> Result<()> {
        self.install_stub(&format!("#!/bin/sh\n{body}"))
    }

    fn install_stub(&self, script: &str) -> Result<()> {
        let path = self.stub_packer_path();
        fs::write(&path, script)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(())
    }

    /// Run a kiln command in the project directory
    pub fn run_kiln(&self, args: &[&str]) -> Result<CommandOutput> {
        let kiln_binary = env!("CARGO_BIN_EXE_kiln");
        let mut command = Command::new(kiln_binary);
        command.args(args).current_dir(&self.project_dir).env("NO_COLOR", "1");

        // Point builds at the stand-in when one was installed; otherwise make
        // sure a developer's real override doesn't leak into the test.
        let stub = self.stub_packer_path();
        if stub.exists() {
            command.env(PACKER_ENV, &stub);
        } else {
            command.env_remove(PACKER_ENV);
        }

        let output = command.output().context("Failed to run kiln command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(
            !self.success,
            "Command unexpectedly succeeded\nStdout: {}",
            self.stdout
        );
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }

    /// Assert stdout does not contain the given text
    pub fn assert_stdout_not_contains(&self, text: &str) -> &Self {
        assert!(
            !self.stdout.contains(text),
            "Expected stdout to not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr does not contain the given text
    pub fn assert_stderr_not_contains(&self, text: &str) -> &Self {
        assert!(
            !self.stderr.contains(text),
            "Expected stderr to not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
