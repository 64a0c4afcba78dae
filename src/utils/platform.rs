//! Platform-specific utilities and builder binary discovery
//!
//! This module encapsulates the platform differences Kiln cares about: the
//! name of the Packer executable, how an override is supplied, and how
//! availability is checked before a build is attempted.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiln_cli::utils::platform::{command_available, packer_program};
//!
//! let program = packer_program();
//! if !command_available(&program) {
//!     eprintln!("'{program}' is not installed");
//! }
//! ```

use std::path::Path;

/// Environment variable naming the Packer binary to invoke.
///
/// Set either directly or via the CLI's `--packer` flag. The value may be a
/// bare command name (resolved through PATH) or a path to the executable.
pub const PACKER_ENV: &str = "KILN_PACKER";

/// Checks if the current platform is Windows.
///
/// Compile-time check used to pick platform-specific executable names and
/// path handling.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Returns the platform-default Packer command name.
///
/// - `"packer.exe"` on Windows
/// - `"packer"` on Unix-like systems (macOS, Linux, BSD)
///
/// This is the command name, not a full path; PATH resolution still has to
/// find the executable. See [`packer_program`] for the override-aware lookup
/// the CLI uses.
#[must_use]
pub const fn default_packer_command() -> &'static str {
    if is_windows() {
        "packer.exe"
    } else {
        "packer"
    }
}

/// Returns the Packer program to invoke, honoring the `KILN_PACKER` override.
///
/// Resolution order:
/// 1. The [`PACKER_ENV`] environment variable, when set and non-empty
/// 2. [`default_packer_command`], leaving resolution to PATH
///
/// # Examples
///
/// ```rust,no_run
/// use kiln_cli::utils::platform::packer_program;
///
/// let program = packer_program();
/// println!("builds will run '{program}'");
/// ```
#[must_use]
pub fn packer_program() -> String {
    match std::env::var(PACKER_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default_packer_command().to_string(),
    }
}

/// Checks whether a command can be invoked.
///
/// A value containing a path separator (an explicit binary location, as set
/// through `KILN_PACKER`) is checked for existence directly; a bare command
/// name is resolved through PATH via the `which` crate.
///
/// # Examples
///
/// ```rust
/// use kiln_cli::utils::platform::command_available;
///
/// // Bare names go through PATH lookup
/// let _ = command_available("packer");
/// // Paths are checked directly
/// assert!(!command_available("/nonexistent/bin/packer"));
/// ```
#[must_use]
pub fn command_available(cmd: &str) -> bool {
    let path = Path::new(cmd);
    if path.components().count() > 1 {
        return path.is_file();
    }
    which::which(cmd).is_ok()
}
