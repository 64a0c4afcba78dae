//! Kiln - Packer Artifact Pipeline
//!
//! A build pipeline front end for HashiCorp Packer that turns templates into
//! verified artifact identifiers: it runs `packer build`, streams the build
//! output live, then cross-checks the manifest Packer writes so a stale or
//! foreign manifest is never mistaken for the result of the run that just
//! finished.
//!
//! # Architecture Overview
//!
//! Kiln follows a declare/build/verify model where:
//! - `kiln.toml` declares named artifacts: a workspace, a template, and the
//!   files that should trigger a rebuild when they change
//! - `kiln bake` runs Packer in the artifact's workspace, forwarding both
//!   output streams as the build progresses
//! - The manifest left behind by the run is validated (fresh, produced by the
//!   docker builder) before its artifact identifier is trusted
//! - Watch paths come only from the declared file list - Packer's variable
//!   and include system can reference files anywhere on disk, so dependency
//!   discovery is explicit rather than inferred
//!
//! ## Key Features
//!
//! - **Live output**: build progress streams to the caller as Packer runs,
//!   not after it exits
//! - **Manifest verification**: run-correlation and builder-type checks catch
//!   stale or unexpected manifests instead of silently shipping them
//! - **Distinguishable failures**: process failure, unreadable manifest,
//!   malformed manifest, empty manifest, stale manifest, and wrong builder
//!   type are separate error kinds, each carrying its underlying cause
//! - **Cross-platform**: Windows, macOS, and Linux with proper path handling
//! - **Substitutable execution**: the process boundary is a narrow trait, so
//!   the pipeline is testable without a Packer binary
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`bake`, `deps`, `inspect`, `validate`,
//!   `init`)
//! - [`core`] - Error taxonomy and user-facing error context
//! - [`builder`] - The build pipeline: invoke Packer, verify the manifest,
//!   resolve watch paths
//! - [`packer`] - The external tool boundary: command description, process
//!   launcher, manifest format
//! - [`project`] - `kiln.toml` parsing, validation, and discovery
//! - [`utils`] - Platform helpers (Packer binary discovery)
//!
//! # Project Format (kiln.toml)
//!
//! ```toml
//! [artifacts.web]
//! workspace = "images/web"
//! template = "web.pkr.hcl"
//! files = ["web.pkr.hcl", "scripts/provision.sh"]
//!
//! [artifacts.worker]
//! workspace = "images/worker"
//! template = "worker.pkr.hcl"
//! manifest = "packer-manifest.json"  # workspace-relative, this is the default
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Start a new project
//! kiln init
//!
//! # Build every declared artifact, or just some
//! kiln bake
//! kiln bake web worker
//!
//! # Show the files a rebuild watches
//! kiln deps web
//!
//! # Re-verify an existing manifest without building
//! kiln inspect web --format json
//!
//! # Check the project file and the packer binary
//! kiln validate
//! ```

// Core functionality modules
pub mod cli;
pub mod core;

// Build pipeline
pub mod builder;
pub mod packer;

// Project model
pub mod project;

// Supporting modules
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
