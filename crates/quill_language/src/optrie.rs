//! Trie-encoded operator tables.
//!
//! Each operator group (binary, n-ary, unary, assignment) is compiled
//! once into a compact byte-encoded trie. A level is a list of
//! `(character, relative-offset-to-subtable)` pairs in sorted order,
//! then an optional terminal entry (a reserved space marker) for an
//! operator that ends at this level, then a zero sentinel. Matching
//! tries every character transition before considering the terminal
//! entry, which is what makes scanning longest-match: `--` is never
//! split into `-` followed by a dangling `-`.
//!
//! Operators in this syntax must be followed by whitespace (`++i` is
//! illegal, `(++ i)` is required), so the terminal entry only accepts
//! when the next input character is whitespace.

use crate::stream::{EOF_CHAR, Stream};
use std::collections::{BTreeMap, BTreeSet};

/// Longest operator spelling the encoding supports.
pub const MAX_OP_LENGTH: usize = 4;

/// Marker byte for an operator that terminates at the current level.
const TERMINAL: u8 = b' ';

/// An immutable, byte-encoded operator trie.
///
/// Built once per operator group at startup and never mutated after.
#[derive(Debug)]
pub struct OperatorTable {
    encoded: Vec<u8>,
}

impl OperatorTable {
    /// Builds a table from a set of operator spellings.
    ///
    /// # Panics
    /// Panics if a spelling is empty, longer than [`MAX_OP_LENGTH`], or
    /// contains a space.
    #[must_use]
    pub fn new(spellings: &[&str]) -> Self {
        let mut set = BTreeSet::new();
        for op in spellings {
            assert!(!op.is_empty() && op.len() <= MAX_OP_LENGTH);
            assert!(!op.contains(' '));
            set.insert(op.as_bytes().to_vec());
        }
        Self {
            encoded: encode_level(&set),
        }
    }

    /// Scans the stream for the longest operator this table knows.
    ///
    /// On success the matched spelling is written to `out`, the stream
    /// is left after the final operator character (before the trailing
    /// whitespace), and true is returned. On a structural dead-end the
    /// stream may have consumed characters; the calling rule restores
    /// it to the entry checkpoint.
    pub fn matches(&self, stream: &mut Stream<'_>, out: &mut String) -> bool {
        let table = &self.encoded;
        let mut level = 0usize;
        let mut built = String::new();
        loop {
            let ch = stream.current();
            if ch == EOF_CHAR {
                return false;
            }
            let mut i = level;
            loop {
                let entry = table[i];
                if entry == 0 {
                    // No transition and no acceptable terminal.
                    return false;
                }
                if entry == TERMINAL && ch.is_ascii_whitespace() {
                    out.clear();
                    out.push_str(&built);
                    return true;
                }
                if entry as char == ch {
                    break;
                }
                i += 2;
            }
            built.push(ch);
            let offset = table[i + 1] as usize;
            debug_assert!(offset != 0, "transition entry must carry an offset");
            level += offset;
            stream.advance();
        }
    }
}

/// Encodes one trie level and its subtables.
fn encode_level(spellings: &BTreeSet<Vec<u8>>) -> Vec<u8> {
    let mut groups: BTreeMap<u8, BTreeSet<Vec<u8>>> = BTreeMap::new();
    let mut has_terminal = false;
    for op in spellings {
        match op.split_first() {
            Some((&first, rest)) => {
                groups.entry(first).or_default().insert(rest.to_vec());
            }
            None => has_terminal = true,
        }
    }

    // This level's width: one pair per group, an extra pair if some
    // operator terminates here, plus the sentinel.
    let mut offset = (groups.len() + usize::from(has_terminal)) * 2 + 1;
    let mut result = Vec::new();
    let mut subtables = Vec::new();
    for (first, suffixes) in &groups {
        let sub = encode_level(suffixes);
        result.push(*first);
        assert!(offset < 256, "operator table level overflow");
        result.push(u8::try_from(offset).expect("offset checked above"));
        offset += sub.len();
        subtables.push(sub);
    }
    if has_terminal {
        result.push(TERMINAL);
        result.push(0);
    }
    result.push(0);
    for sub in subtables {
        result.extend(sub);
    }
    result
}
