//! Integration tests for the script language frontend.
//!
//! Tests for parsing, error reporting, headers, and desugaring.

mod desugaring;
mod errors;
mod headers;
mod scripts;
