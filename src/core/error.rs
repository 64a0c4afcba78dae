//! Error handling for Kiln
//!
//! This module provides the error types and user-friendly error reporting for
//! the Kiln build tool. The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of three types:
//! - [`KilnError`] - Enumerated error types for all failure cases in Kiln
//! - [`ExecutionError`] - The precise cause of a failed builder invocation
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! The pipeline errors mirror the two phases of a build:
//! - **Invocation**: [`KilnError::ExecutionFailure`] - the external builder
//!   failed to start or reported failure. Manifest errors are never produced
//!   for an invocation that failed; the pipeline stops here.
//! - **Manifest validation**: [`KilnError::ManifestUnreadable`],
//!   [`KilnError::ManifestMalformed`], [`KilnError::ManifestEmpty`],
//!   [`KilnError::StaleManifest`], [`KilnError::UnexpectedBuilderType`] - the
//!   builder succeeded but its manifest cannot be trusted.
//!
//! The remaining variants cover project-file handling and environment issues.
//! Each kind is distinguishable by the caller and carries its underlying cause
//! (I/O error, parse error, exit status) for diagnostics.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiln_cli::core::{KilnError, user_friendly_error};
//!
//! fn check_project() -> Result<(), KilnError> {
//!     Err(KilnError::ProjectNotFound)
//! }
//!
//! if let Err(e) = check_project() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for Kiln operations
///
/// Each variant represents a specific failure mode and carries the context
/// needed to diagnose it. The manifest variants record the manifest path they
/// were raised for; the execution variant preserves the exact launch/exit
/// cause through [`ExecutionError`].
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_cli::core::KilnError;
///
/// fn handle_error(error: &KilnError) {
///     match error {
///         KilnError::ExecutionFailure { template, .. } => {
///             eprintln!("packer failed while building '{template}'");
///         }
///         KilnError::StaleManifest { .. } => {
///             eprintln!("leftover manifest from an earlier run; rebuild");
///         }
///         _ => eprintln!("unexpected error: {error}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum KilnError {
    /// The external builder failed to start or reported failure
    ///
    /// Raised for any launch error, output-forwarding error, or non-zero exit
    /// status. The nested [`ExecutionError`] preserves which of those it was.
    /// No manifest validation happens after this error.
    #[error("Packer build failed for template '{template}'")]
    ExecutionFailure {
        /// The template the failed invocation was building
        template: String,
        /// The precise launch or exit cause
        #[source]
        source: ExecutionError,
    },

    /// Packer executable not found
    ///
    /// Raised by environment checks when the configured builder binary cannot
    /// be located, either on PATH or at an explicitly configured path.
    #[error("Packer executable '{program}' not found")]
    PackerNotFound {
        /// The program name or path that was looked up
        program: String,
    },

    /// The build manifest file could not be opened or read
    #[error("Cannot read packer manifest at {}", path.display())]
    ManifestUnreadable {
        /// Path the manifest was expected at (workspace joined with the
        /// declared relative path)
        path: PathBuf,
        /// The underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The build manifest content failed to parse as manifest JSON
    #[error("Packer manifest at {} is not valid manifest JSON", path.display())]
    ManifestMalformed {
        /// Path of the manifest that failed to parse
        path: PathBuf,
        /// The underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The build manifest parsed but contains no build records
    ///
    /// A manifest without records carries no artifact identifier. This is a
    /// distinct kind rather than an index panic or a generic parse error.
    #[error("Packer manifest at {} contains no build records", path.display())]
    ManifestEmpty {
        /// Path of the empty manifest
        path: PathBuf,
    },

    /// The build manifest's last record belongs to a different run
    ///
    /// The run id of the final build record must match the manifest's declared
    /// last run id. A mismatch means the record is leftover from an earlier
    /// invocation and its artifact identifier must not be trusted.
    #[error(
        "Stale packer manifest at {}: last record is from run '{record_run_uuid}' but the manifest's last run is '{last_run_uuid}'",
        path.display()
    )]
    StaleManifest {
        /// Path of the stale manifest
        path: PathBuf,
        /// Run id recorded on the final build record
        record_run_uuid: String,
        /// The manifest's declared last run id
        last_run_uuid: String,
    },

    /// The build manifest's last record was produced by an unexpected builder
    #[error(
        "Unexpected builder type in packer manifest at {}: expected '{expected}', found '{actual}'",
        path.display()
    )]
    UnexpectedBuilderType {
        /// Path of the offending manifest
        path: PathBuf,
        /// The builder type the caller requires (normally `docker`)
        expected: String,
        /// The builder type recorded on the final build record
        actual: String,
    },

    /// Project file (kiln.toml) not found
    ///
    /// Kiln searches for kiln.toml starting from the current working directory
    /// and walking up the directory tree, similar to how git searches for
    /// `.git`.
    #[error("Project file kiln.toml not found in current directory or any parent directory")]
    ProjectNotFound,

    /// Project file parsing error
    #[error("Invalid project file syntax in {file}")]
    ProjectParseError {
        /// Path to the project file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Project file validation error
    #[error("Project validation failed: {reason}")]
    ProjectValidationError {
        /// Reason why project validation failed
        reason: String,
    },

    /// Named artifact not defined in the project file
    #[error("Artifact '{name}' is not defined in the project file")]
    ArtifactNotFound {
        /// Name of the artifact that could not be found
        name: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// The precise cause of a failed builder invocation
///
/// [`KilnError::ExecutionFailure`] always wraps one of these, so callers can
/// tell "the binary could not start" apart from "the build ran and failed"
/// without string matching.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The builder binary could not be spawned
    #[error("Failed to launch '{program}'")]
    Launch {
        /// The program that was being launched
        program: String,
        /// The spawn failure reported by the OS
        #[source]
        source: std::io::Error,
    },

    /// Output forwarding or process supervision failed mid-build
    #[error("Failed to stream build output")]
    Io(#[source] std::io::Error),

    /// The builder ran to completion and reported failure
    #[error("Build process exited with {status}")]
    Failed {
        /// The non-zero exit status
        status: ExitStatus,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`KilnError`] and adds optional suggestions for
/// resolution and additional details. This is the primary way Kiln presents
/// errors to CLI users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_cli::core::{ErrorContext, KilnError};
///
/// let context = ErrorContext::new(KilnError::ProjectNotFound)
///     .with_suggestion("Run 'kiln init' to create a kiln.toml")
///     .with_details("Kiln searches current and parent directories for kiln.toml");
///
/// context.display(); // Prints colored error to stderr
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Kiln error
    pub error: KilnError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`KilnError`]
    ///
    /// This creates a basic error context with no additional suggestions or
    /// details. Use [`with_suggestion`](Self::with_suggestion) and
    /// [`with_details`](Self::with_details) to add user-friendly information.
    #[must_use]
    pub const fn new(error: KilnError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps that users can take to resolve
    /// the error. They are displayed in green in the terminal.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred or what it means.
    /// They are displayed in yellow in the terminal.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// Prints the error, details, and suggestion to stderr using color coding:
    /// error in red and bold, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly error messages for CLI display. It recognizes [`KilnError`]
/// values anywhere in an [`anyhow::Error`] chain and provides appropriate
/// context and suggestions; common standard library errors get generic
/// guidance.
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_cli::core::{KilnError, user_friendly_error};
///
/// let error = KilnError::ProjectNotFound;
/// let context = user_friendly_error(anyhow::Error::from(error));
///
/// context.display(); // Shows project setup suggestions
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // Take the typed error by value when one is present so no information is
    // lost rebuilding it.
    let error = match error.downcast::<KilnError>() {
        Ok(kiln_error) => return create_error_context(kiln_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(KilnError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion(
                    "Check file ownership, or re-run with sufficient permissions",
                )
                .with_details(
                    "Kiln needs read access to the project and workspace directories and the external builder needs write access to the workspace",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(KilnError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details("A required file or directory could not be found");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(KilnError::ProjectParseError {
            file: "kiln.toml".to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion(
            "Check the TOML syntax in your kiln.toml file. Verify quotes, brackets, and table headers",
        )
        .with_details(
            "TOML parsing errors are usually caused by syntax issues like missing quotes or mismatched brackets",
        );
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> = error
        .chain()
        .skip(1) // Skip the root cause which is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(KilnError::Other {
        message,
    })
}

/// Create an appropriate [`ErrorContext`] with suggestions for specific Kiln errors
///
/// Maps each [`KilnError`] variant to tailored suggestions and details. Used
/// by [`user_friendly_error`] to provide consistent, helpful error messages.
fn create_error_context(error: KilnError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match &error {
        KilnError::ExecutionFailure {
            source, ..
        } => match source {
            ExecutionError::Launch {
                program,
                source,
            } if source.kind() == std::io::ErrorKind::NotFound => (
                Some(
                    "Install Packer from https://developer.hashicorp.com/packer, or point KILN_PACKER (or --packer) at the binary"
                        .to_string(),
                ),
                Some(format!("The builder binary '{program}' could not be started")),
            ),
            ExecutionError::Launch {
                program, ..
            } => (
                Some(format!(
                    "Check that '{program}' is executable and that the artifact's workspace directory exists"
                )),
                Some("The builder process could not be started".to_string()),
            ),
            ExecutionError::Io(_) => (
                Some("Re-run the build; if it persists, check for disk or pipe errors on this host".to_string()),
                Some("The builder was running but its output could no longer be read".to_string()),
            ),
            ExecutionError::Failed {
                status,
            } => (
                Some("Inspect the build output above for the builder's own error report".to_string()),
                Some(format!(
                    "The builder exited with {status}. Its manifest was not consulted"
                )),
            ),
        },

        KilnError::PackerNotFound {
            program,
        } => (
            Some(
                "Install Packer from https://developer.hashicorp.com/packer, or point KILN_PACKER (or --packer) at the binary"
                    .to_string(),
            ),
            Some(format!("Looked for '{program}' on PATH and as a direct path")),
        ),

        KilnError::ManifestUnreadable {
            ..
        } => (
            Some(
                "Confirm the template configures a manifest post-processor writing to the declared path"
                    .to_string(),
            ),
            Some(
                "The manifest path is resolved by joining the artifact's workspace directory with the 'manifest' entry in kiln.toml"
                    .to_string(),
            ),
        ),

        KilnError::ManifestMalformed {
            ..
        } => (
            Some(
                "Inspect the manifest file; it should be the unmodified JSON written by the manifest post-processor"
                    .to_string(),
            ),
            Some("The file exists but does not parse as a packer manifest".to_string()),
        ),

        KilnError::ManifestEmpty {
            ..
        } => (
            Some(
                "Ensure the template defines at least one builder and that the manifest post-processor ran"
                    .to_string(),
            ),
            Some("A manifest without build records carries no artifact identifier".to_string()),
        ),

        KilnError::StaleManifest {
            ..
        } => (
            Some("Delete the leftover manifest file and re-run the build".to_string()),
            Some(
                "The manifest's last record was written by a different builder invocation than the one that just ran"
                    .to_string(),
            ),
        ),

        KilnError::UnexpectedBuilderType {
            expected,
            actual,
            ..
        } => (
            Some(format!(
                "Use a '{expected}' builder in the template, or build this artifact with a different tool"
            )),
            Some(format!(
                "The manifest's last record was produced by a '{actual}' builder"
            )),
        ),

        KilnError::ProjectNotFound => (
            Some("Run 'kiln init' to create a kiln.toml in your project directory".to_string()),
            Some(
                "Kiln looks for kiln.toml in the current directory and parent directories up to the filesystem root"
                    .to_string(),
            ),
        ),

        KilnError::ProjectParseError {
            file, ..
        } => (
            Some(format!(
                "Check the TOML syntax in {file}. Common issues: missing quotes, unmatched brackets, invalid characters"
            )),
            Some("Use a TOML validator or compare against the output of 'kiln init'".to_string()),
        ),

        KilnError::ArtifactNotFound {
            name,
        } => (
            Some(format!(
                "Add an [artifacts.{name}] table to kiln.toml, or check the name for typos"
            )),
            Some("Artifacts are the [artifacts.<name>] tables in the project file".to_string()),
        ),

        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}
