//! Structured compile diagnostics.
//!
//! A parse produces at most one fatal error, but may produce any number
//! of advisory diagnostics (misplaced cond defaults, unimplemented
//! declaration forms, and so on). Those are reported through the
//! [`CompileLog`] collaborator; when no log is supplied, non-fatal
//! diagnostics are simply skipped.

use std::fmt;

/// Identifies the script a diagnostic refers to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptId {
    /// File name or other display identity of the script.
    pub name: String,
}

impl ScriptId {
    /// Creates a script identity from a display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// How severe a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// The construct is wrong; output may be missing the offending piece.
    Error,
    /// Advisory only; the script remains usable.
    Warning,
}

/// A single structured diagnostic record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description.
    pub message: String,
    /// Which script the diagnostic refers to.
    pub script: ScriptId,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub column: u32,
    /// Error or warning.
    pub severity: Severity,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>, script: ScriptId, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            script,
            line,
            column,
            severity: Severity::Error,
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>, script: ScriptId, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            script,
            line,
            column,
            severity: Severity::Warning,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{tag}: ({}) {} ({}, {})",
            self.script, self.message, self.line, self.column
        )
    }
}

/// Receiver for compile diagnostics.
pub trait CompileLog {
    /// Records one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A [`CompileLog`] that collects diagnostics into a vector.
#[derive(Debug, Default)]
pub struct LogCollector {
    /// All diagnostics reported so far, in order.
    pub results: Vec<Diagnostic>,
}

impl LogCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded errors only.
    #[must_use]
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.results
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect()
    }

    /// Returns the recorded warnings only.
    #[must_use]
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.results
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }
}

impl CompileLog for LogCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.results.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_records_in_order() {
        let mut log = LogCollector::new();
        log.report(Diagnostic::warning("first", ScriptId::new("rm001.sc"), 1, 0));
        log.report(Diagnostic::error("second", ScriptId::new("rm001.sc"), 2, 4));
        assert_eq!(log.results.len(), 2);
        assert_eq!(log.results[0].message, "first");
        assert_eq!(log.errors().len(), 1);
        assert_eq!(log.warnings().len(), 1);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error("Expected word.", ScriptId::new("main.sc"), 12, 3);
        let text = format!("{d}");
        assert!(text.contains("main.sc"));
        assert!(text.contains("Expected word."));
        assert!(text.contains("(12, 3)"));
    }
}
