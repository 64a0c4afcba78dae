//! Test utilities for Kiln
//!
//! This module provides utilities for writing tests: fixtures for project
//! files and packer manifests, and a scripted [`Launcher`](crate::packer::Launcher)
//! implementation so builder behavior can be tested without a packer binary.
//!
//! # Test Isolation
//!
//! The utilities in this module help ensure tests don't interfere with each
//! other:
//! - Fixtures write into caller-owned temporary directories
//! - The fake launcher records invocations per instance
//! - Logging is initialized once per process with a test-compatible writer
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::test_utils::{FakeLauncher, ProjectFixture};
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! let project_path = ProjectFixture::basic().write_to(temp.path()).unwrap();
//! let launcher = FakeLauncher::succeeding().with_output("docker build output\n");
//! ```

pub mod fixtures;
pub mod launcher;

pub use fixtures::{PackerManifestFixture, ProjectFixture};
pub use launcher::FakeLauncher;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Tracks whether the test subscriber has been installed in this process.
static INIT_LOGGING: Once = Once::new();

/// Installs a tracing subscriber for tests, at most once per process.
///
/// An explicit `level` becomes the filter; with `None`, `RUST_LOG` is honored
/// when set and logging stays off otherwise. Called at the top of tests whose
/// code paths emit tracing events, so
/// `RUST_LOG=debug cargo test -- --nocapture` shows the launcher's and
/// builder's diagnostics while a plain run stays quiet. The test-capture
/// writer keeps output attached to the owning test.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = match level {
            Some(level) => EnvFilter::new(level.to_string()),
            None => match EnvFilter::try_from_default_env() {
                Ok(filter) => filter,
                Err(_) => return,
            },
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
