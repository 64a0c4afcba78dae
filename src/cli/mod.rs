//! Command-line interface for Kiln.
//!
//! This module contains all CLI command implementations. Each command is a
//! separate module with its own argument structure and execution logic,
//! dispatched from the [`Commands`] enum:
//!
//! - [`bake`] - Build artifacts with Packer and verify their manifests
//! - [`deps`] - Print the files whose changes should trigger a rebuild
//! - [`inspect`] - Verify an existing manifest without building
//! - [`validate`] - Check the project file and build environment
//! - [`init`] - Create a starter `kiln.toml`
//!
//! # Global Options
//!
//! All subcommands inherit:
//! - `--project-path <FILE>`: explicit `kiln.toml` instead of directory search
//! - `--packer <PATH>`: Packer binary override (exported as `KILN_PACKER`)
//! - `-v/--verbose` and `-q/--quiet`: log level (exported as `RUST_LOG`)
//!
//! # Examples
//!
//! ```bash
//! # Start a project and declare an artifact
//! kiln init
//!
//! # Check everything a build needs
//! kiln validate
//!
//! # Build with a specific packer binary, with debug logging
//! kiln --packer /opt/packer/bin/packer --verbose bake web
//! ```

mod bake;
pub mod common;
mod deps;
mod init;
mod inspect;
mod validate;


use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::utils::platform::PACKER_ENV;

/// Runtime configuration for CLI execution.
///
/// Holds configuration that is ultimately communicated through environment
/// variables, keeping the translation in one place so tests and programmatic
/// callers can build a configuration without re-parsing arguments.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the `RUST_LOG` environment variable.
    ///
    /// Set from `--verbose` (debug) or `--quiet` (error). When `None`, the
    /// existing `RUST_LOG` value is left untouched, so an operator's own
    /// filter wins over the default.
    pub log_level: Option<String>,

    /// Packer binary override for the `KILN_PACKER` environment variable.
    ///
    /// Set from `--packer`. When `None`, the existing `KILN_PACKER` value
    /// (or the platform default command name) is used.
    pub packer_path: Option<PathBuf>,
}

impl CliConfig {
    /// Create a new CLI configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Should be called exactly once at the start of CLI execution, before
    /// any command reads the environment.
    pub fn apply_to_env(&self) {
        // SAFETY: called once from CLI startup before any command runs;
        // nothing reads these variables concurrently at this point.
        if let Some(ref level) = self.log_level {
            unsafe { std::env::set_var("RUST_LOG", level) };
        }

        if let Some(ref path) = self.packer_path {
            unsafe { std::env::set_var(PACKER_ENV, path) };
        }
    }
}

/// Main CLI structure for Kiln.
///
/// This struct represents the root command and all its global options. It
/// uses the `clap` derive API to generate command-line parsing, help text,
/// and validation. Options marked `global = true` are available to all
/// subcommands.
#[derive(Parser)]
#[command(
    name = "kiln",
    about = "Kiln - bake machine images with Packer and verify the results",
    version,
    author,
    long_about = "Kiln drives Packer image builds for artifact pipelines: it runs \
packer build with live output, verifies the manifest the run produces, and resolves \
the files a rebuild should watch."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging and detailed information.
    ///
    /// Equivalent to setting `RUST_LOG=debug`. Shows command construction,
    /// manifest reads, and build timings on stderr. Mutually exclusive with
    /// `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging except errors.
    ///
    /// Equivalent to setting `RUST_LOG=error`. Build output and command
    /// results still print; only diagnostic logging is silenced.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the Packer binary to use.
    ///
    /// Overrides `PATH` lookup and any `KILN_PACKER` already set. Useful
    /// when several Packer versions are installed or the binary lives
    /// outside `PATH`.
    ///
    /// # Examples
    ///
    /// ```bash
    /// kiln --packer /opt/packer/1.11/packer bake
    /// ```
    #[arg(long, global = true, value_name = "PATH")]
    packer: Option<PathBuf>,

    /// Path to the project file (kiln.toml).
    ///
    /// By default, Kiln searches for kiln.toml in the current directory and
    /// parent directories. This option allows you to specify an exact path,
    /// which is useful for:
    ///
    /// - Running commands from outside the project directory
    /// - CI/CD pipelines with non-standard layouts
    /// - Testing with temporary projects
    ///
    /// # Examples
    ///
    /// ```bash
    /// kiln --project-path /path/to/kiln.toml bake
    /// kiln --project-path ../other-project/kiln.toml deps web
    /// ```
    #[arg(long, global = true, value_name = "FILE")]
    project_path: Option<PathBuf>,
}

/// Available subcommands for the Kiln CLI.
#[derive(Subcommand)]
enum Commands {
    /// Build artifacts with Packer and print their verified identifiers.
    ///
    /// Runs `packer build` for the named artifacts (or all of them),
    /// streaming output live, then verifies each build's manifest before
    /// trusting its artifact identifier.
    ///
    /// See [`bake::BakeCommand`] for detailed options and behavior.
    Bake(bake::BakeCommand),

    /// Print the files whose changes should trigger a rebuild.
    ///
    /// Resolves an artifact's declared file list against its workspace and
    /// prints the watch paths in declared order.
    ///
    /// See [`deps::DepsCommand`] for detailed options and behavior.
    Deps(deps::DepsCommand),

    /// Verify an existing manifest without building.
    ///
    /// Applies the same freshness and builder-type checks as `bake` to the
    /// manifest already on disk and prints the artifact identifier.
    ///
    /// See [`inspect::InspectCommand`] for detailed options and behavior.
    Inspect(inspect::InspectCommand),

    /// Check the project file and build environment.
    ///
    /// Reports ✓/✗ for project structure, per-artifact workspaces and
    /// templates, and Packer binary availability.
    ///
    /// See [`validate::ValidateCommand`] for detailed options and behavior.
    Validate(validate::ValidateCommand),

    /// Initialize a new Kiln project with a project file.
    ///
    /// Creates a commented starter `kiln.toml` and adds Packer's build
    /// droppings to `.gitignore`.
    ///
    /// See [`init::InitCommand`] for detailed options and behavior.
    Init(init::InitCommand),
}

impl Cli {
    /// Execute the CLI with default configuration.
    ///
    /// This is the main entry point for CLI execution. It builds a
    /// configuration from the parsed command-line arguments and delegates to
    /// [`execute_with_config`](Self::execute_with_config).
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the parsed CLI arguments.
    ///
    /// `--verbose` maps to debug-level logging, `--quiet` to error-only;
    /// with neither flag the environment's own `RUST_LOG` (if any) stays in
    /// effect. The parser enforces that the two flags are mutually
    /// exclusive.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            packer_path: self.packer.clone(),
        }
    }

    /// Execute the CLI with a specific configuration for dependency injection.
    ///
    /// Applies the configuration to the process environment, installs the
    /// logging subscriber, and dispatches to the selected subcommand. Tests
    /// and programmatic callers can inject a configuration instead of
    /// building one from arguments.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        // Apply configuration to environment once at the start
        config.apply_to_env();
        init_logging();

        match self.command {
            Commands::Bake(cmd) => cmd.execute_with_project_path(self.project_path).await,
            Commands::Deps(cmd) => cmd.execute_with_project_path(self.project_path).await,
            Commands::Inspect(cmd) => cmd.execute_with_project_path(self.project_path).await,
            Commands::Validate(cmd) => cmd.execute_with_project_path(self.project_path).await,
            Commands::Init(cmd) => cmd.execute().await,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Respects `RUST_LOG` (which [`CliConfig::apply_to_env`] may have just set
/// from `--verbose`/`--quiet`), defaulting to warnings only. Logs go to
/// stderr so stdout stays reserved for build output and command results.
fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
