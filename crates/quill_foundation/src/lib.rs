//! Error and diagnostic types for the Quill script compiler.
//!
//! This crate provides:
//! - [`Error`] - Rich error types for parse failures
//! - [`Diagnostic`] - Structured compile diagnostics (errors and warnings)
//! - [`CompileLog`] - The collaborator interface diagnostics are reported to

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod diagnostics;
mod error;

pub use diagnostics::{CompileLog, Diagnostic, LogCollector, ScriptId, Severity};
pub use error::{Error, ErrorKind, Result};
