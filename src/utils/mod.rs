//! Utility functions and platform helpers
//!
//! Small shared helpers that do not belong to any one subsystem. Currently
//! this is platform handling: Packer binary discovery and the Windows/Unix
//! differences around executable names.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::utils::platform::packer_program;
//!
//! println!("builder binary: {}", packer_program());
//! ```

pub mod platform;

pub use platform::{command_available, default_packer_command, is_windows, packer_program};
