//! Type-safe Packer command builder
//!
//! This module provides a fluent API for describing a Packer invocation:
//! which program to run, with which arguments, in which directory, with which
//! extra environment. A [`PackerCommand`] is pure data; executing one is the
//! job of a [`Launcher`](crate::packer::Launcher) implementation, which keeps
//! the invocation description testable without spawning processes.

use std::path::{Path, PathBuf};

use crate::utils::platform::default_packer_command;

/// Builder describing a single Packer invocation.
///
/// The canonical constructor is [`build`](Self::build), which produces the
/// fixed two-argument form `packer build <template>` that the pipeline uses.
/// The fluent setters mirror [`std::process::Command`]; so do the `get_*`
/// accessors that launchers and tests read the description back through.
///
/// # Examples
///
/// ```rust
/// use kiln_cli::packer::PackerCommand;
///
/// let command = PackerCommand::build("web.pkr.hcl").current_dir("/srv/images/web");
///
/// assert_eq!(command.get_args(), ["build", "web.pkr.hcl"]);
/// assert_eq!(command.command_line(), "packer build web.pkr.hcl");
/// ```
#[derive(Debug, Clone)]
pub struct PackerCommand {
    /// Program to invoke (defaults to the platform's `packer` command name)
    program: String,

    /// Arguments to pass (e.g. ["build", "web.pkr.hcl"])
    args: Vec<String>,

    /// Working directory for the child process (the artifact workspace)
    current_dir: Option<PathBuf>,

    /// Extra environment variables for the child process
    env_vars: Vec<(String, String)>,
}

impl Default for PackerCommand {
    fn default() -> Self {
        Self {
            program: default_packer_command().to_string(),
            args: Vec::new(),
            current_dir: None,
            env_vars: Vec::new(),
        }
    }
}

impl PackerCommand {
    /// Creates an empty command builder with the platform-default program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the canonical build invocation: `packer build <template>`.
    ///
    /// The template path is passed through as given; Packer resolves it
    /// against its own working directory, which the pipeline sets to the
    /// artifact workspace via [`current_dir`](Self::current_dir).
    pub fn build(template: impl AsRef<Path>) -> Self {
        Self::new().arg("build").arg(template.as_ref().display().to_string())
    }

    /// Overrides the program to invoke.
    ///
    /// Used by the CLI to apply the `KILN_PACKER` / `--packer` override; the
    /// value may be a bare command name or a path to the executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the working directory for the invocation.
    ///
    /// For builds this is always the artifact's workspace directory, so the
    /// external tool reads templates from and writes the manifest into the
    /// workspace.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the child process.
    ///
    /// The child otherwise inherits the parent environment; this only adds
    /// or overrides single variables (e.g. `PACKER_LOG=1`).
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Returns the program that will be invoked.
    #[must_use]
    pub fn get_program(&self) -> &str {
        &self.program
    }

    /// Returns the arguments that will be passed.
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Returns the working directory, if one was set.
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Returns the extra environment variables.
    #[must_use]
    pub fn get_envs(&self) -> &[(String, String)] {
        &self.env_vars
    }

    /// Renders the invocation as a single line for logs and error messages.
    #[must_use]
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}
