//! Character stream over source text.
//!
//! The stream is the single input abstraction for the whole grammar: it
//! exposes the current character (a NUL sentinel at end of input),
//! 1-based line/column tracking, and a cheap checkpoint/restore pair.
//! Every combinator that can fail restores the stream to its entry
//! checkpoint; that restore is the sole mechanism enabling backtracking,
//! so it must stay an O(1) value copy.

use crate::span::Position;

/// Sentinel returned at end of input.
pub const EOF_CHAR: char = '\0';

/// A cursor over source text.
pub struct Stream<'src> {
    source: &'src [u8],
    offset: usize,
    line: u32,
    column: u32,
}

/// A saved stream position. Restoring one is a value copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    offset: usize,
    line: u32,
    column: u32,
}

impl Checkpoint {
    /// The byte offset this checkpoint was taken at.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<'src> Stream<'src> {
    /// Creates a stream over the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source: source.as_bytes(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the current character, or NUL at end of input.
    #[must_use]
    pub fn current(&self) -> char {
        self.source.get(self.offset).map_or(EOF_CHAR, |&b| b as char)
    }

    /// Returns the character `n` places ahead of the cursor.
    #[must_use]
    pub fn peek_ahead(&self, n: usize) -> char {
        self.source
            .get(self.offset + n)
            .map_or(EOF_CHAR, |&b| b as char)
    }

    /// Returns true if the cursor is at end of input.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// Advances past the current character.
    pub fn advance(&mut self) {
        if let Some(&b) = self.source.get(self.offset) {
            self.offset += 1;
            if b == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Returns the current character and advances past it.
    pub fn take(&mut self) -> char {
        let c = self.current();
        self.advance();
        c
    }

    /// Skips whitespace and `;` line comments.
    pub fn skip_ws(&mut self) {
        loop {
            let c = self.current();
            if c.is_ascii_whitespace() && c != EOF_CHAR {
                self.advance();
            } else if c == ';' {
                while self.current() != '\n' && !self.at_end() {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Returns the position of the cursor.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    /// Returns the absolute byte offset of the cursor.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Saves the cursor so a failed rule can back out.
    #[must_use]
    pub const fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Restores a previously saved cursor.
    pub const fn restore(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.offset;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
    }
}
