//! Source location tracking.
//!
//! `Position` records where a token or AST node begins in source code,
//! for error reporting and editor integration.

/// A point in source text.
///
/// Immutable once taken from the stream cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Position {
    /// Absolute byte offset from the start of input.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Creates a position at the start of input.
    #[must_use]
    pub const fn at_start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_at_start() {
        let pos = Position::at_start();
        assert_eq!(pos.offset, 0);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn position_new() {
        let pos = Position::new(10, 2, 5);
        assert_eq!(pos.offset, 10);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 5);
    }
}
