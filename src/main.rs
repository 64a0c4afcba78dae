//! Kiln CLI entry point
//!
//! This is the main executable for Kiln. It handles command-line argument
//! parsing, error display, and command execution.
//!
//! The CLI supports commands for driving Packer image builds:
//! - `init` - Create a starter kiln.toml project file
//! - `bake` - Build artifacts and verify their manifests
//! - `deps` - Print the files a rebuild watches
//! - `inspect` - Verify an existing manifest without building
//! - `validate` - Check the project file and build environment

use anyhow::Result;
use clap::Parser;
use kiln_cli::cli;
use kiln_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
