//! Quill - compiler frontend for the SCI script language
//!
//! This crate re-exports both layers of the Quill frontend for
//! convenient access. For detailed documentation, see the individual
//! layer crates.
//!
//! ```text
//! Layer 1: quill_language   — grammar, AST, desugaring, entry points
//! Layer 0: quill_foundation — errors, diagnostics, compile log
//! ```

pub use quill_foundation as foundation;
pub use quill_language as language;
