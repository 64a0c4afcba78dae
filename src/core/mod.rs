//! Core types and functionality for Kiln
//!
//! This module forms the foundation of Kiln's type system: the error taxonomy
//! every other module reports through, and the user-facing error context the
//! CLI renders.
//!
//! # Error Management
//!
//! Kiln uses a two-layer error handling system designed for both developer
//! ergonomics and end-user experience:
//! - **Strongly-typed errors** ([`KilnError`], [`ExecutionError`]) for precise
//!   error handling in code. Each manifest-validation failure and each
//!   invocation failure is a distinct variant carrying its underlying cause.
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions
//!   for CLI users, produced by [`user_friendly_error`] at the binary's edge.
//!
//! # Examples
//!
//! ```rust,no_run
//! use kiln_cli::core::{KilnError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(KilnError::ProjectNotFound.into())
//! }
//!
//! match example_operation() {
//!     Ok(result) => println!("Success: {result}"),
//!     Err(e) => user_friendly_error(e).display(),
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, ExecutionError, KilnError, user_friendly_error};
