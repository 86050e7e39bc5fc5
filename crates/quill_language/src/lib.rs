//! Parser and desugaring passes for SCI adventure-game scripts.
//!
//! This crate turns script source into a fully lowered [`Script`] AST.
//!
//! # Architecture
//!
//! ```text
//! "(procedure (Add a b) (return (+ a b)))"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ STREAM          │  → chars + positions, whitespace/comment skipping,
//! └─────────────────┘    checkpoint/restore for backtracking
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ GRAMMAR         │  → one shared combinator grammar; operator tries
//! │ MATCHING        │    recognize spellings, semantic actions build
//! └─────────────────┘    nodes on the statement slot stack
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ RAW AST         │  → Script with transient forms still present
//! └─────────────────┘    (cond, switchto, foreach, verb clauses)
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ DESUGARING      │  → if-chains, numbered cases, counted loops,
//! └─────────────────┘    synthesized doVerb methods, and-chains
//! ```
//!
//! # Modules
//!
//! - [`stream`] - Character stream with checkpoint/restore
//! - [`span`] - Source positions
//! - [`primitives`] - Lexical matchers (words, integers, strings)
//! - [`operators`] - Operator vocabulary and spellings
//! - [`optrie`] - Trie-encoded operator recognition
//! - [`rule`] - The combinator core and rule arena
//! - [`context`] - Per-parse mutable state
//! - [`ast`] - Syntax tree types
//! - [`grammar`] - The script and header grammars
//! - [`desugar`] - Post-parse lowering
//! - [`parser`] - Public entry points

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod context;
pub mod desugar;
pub mod grammar;
pub mod operators;
pub mod optrie;
pub mod parser;
pub mod primitives;
pub mod rule;
pub mod span;
pub mod stream;

#[cfg(test)]
mod fuzz_tests;

// Re-export main types for convenience
pub use ast::{ClassDecl, Function, Node, Procedure, Script, Value, ValueKind};
pub use context::TokenClass;
pub use desugar::desugar;
pub use parser::{ParseOptions, annotate_script, parse_header, parse_script};
pub use span::Position;
