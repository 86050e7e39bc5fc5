//! Character-level recognizers and keyword tables.
//!
//! These are the [`MatcherFn`](crate::rule::MatcherFn)-shaped leaves of
//! the grammar. Each skips leading whitespace, recognizes one lexeme
//! directly off the stream, and writes it into the context's scratch
//! registers. A primitive may consume input and then fail; the rule
//! wrapper restores the stream, so primitives never rewind themselves.

use crate::context::ParseContext;
use crate::stream::{EOF_CHAR, Stream};

/// Words reserved by the grammar; none may be used as an identifier.
pub const KEYWORDS: &[&str] = &[
    "and",
    "asm",
    "break",
    "breakif",
    "class",
    "class#",
    "classdef",
    "cond",
    "continue",
    "contif",
    "define",
    "else",
    "enum",
    "extern",
    "file#",
    "for",
    "foreach",
    "global",
    "if",
    "instance",
    "local",
    "method",
    "methods",
    "mod",
    "not",
    "of",
    "or",
    "procedure",
    "properties",
    "public",
    "repeat",
    "return",
    "script#",
    "selectors",
    "send",
    "super",
    "super#",
    "switch",
    "switchto",
    "synonyms",
    "text#",
    "verbs",
    "while",
];

/// Statement-introducing keywords, used to decorate parse errors: a
/// bare one at the failure point usually means a missing `(`.
pub const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "asm", "break", "breakif", "continue", "contif", "repeat", "switch", "switchto", "for",
    "return", "cond", "while", "define",
];

/// VM opcode mnemonics, banned from identifiers inside `asm` blocks so
/// an operand never swallows the next instruction.
pub const ASM_OPCODES: &[&str] = &[
    "add", "sub", "mul", "div", "mod", "shr", "shl", "xor", "and", "or", "neg", "not", "eq?",
    "ne?", "gt?", "ge?", "lt?", "le?", "ugt?", "uge?", "ult?", "ule?", "bt", "bnt", "jmp", "ldi",
    "push", "pushi", "toss", "dup", "link", "call", "callk", "callb", "calle", "ret", "send",
    "class", "self", "super", "rest", "lea", "selfID", "pprev", "pToa", "aTop", "pTos", "sTop",
    "ipToa", "dpToa", "ipTos", "dpTos", "lofsa", "lofss", "push0", "push1", "push2", "pushSelf",
    "lag", "lal", "lat", "lap", "lsg", "lsl", "lst", "lsp", "lagi", "lali", "lati", "lapi",
    "lsgi", "lsli", "lsti", "lspi", "sag", "sal", "sat", "sap", "ssg", "ssl", "sst", "ssp",
    "sagi", "sali", "sati", "sapi", "ssgi", "ssli", "ssti", "sspi",
];

/// Returns true if `word` is reserved.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_selector_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Reads a selector-shaped word into the scratch register. Fails on a
/// leading digit or a word with no letter in it (so `-` and `100`
/// never lex as names).
fn read_word(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    stream.skip_ws();
    let first = stream.current();
    if !is_selector_char(first) || first.is_ascii_digit() {
        return false;
    }
    ctx.scratch.clear();
    let mut has_letter = false;
    while is_selector_char(stream.current()) {
        let c = stream.take();
        has_letter |= c.is_ascii_alphabetic();
        ctx.scratch.push(c);
    }
    has_letter
}

/// A selector name: property, method, or send selector position.
pub fn selector(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_word(ctx, stream)
}

fn word_is_plain(ctx: &ParseContext<'_>, stream: &Stream<'_>) -> bool {
    // A trailing `:` or `?` makes this a send selector or property
    // read, not an identifier.
    stream.current() != ':' && stream.current() != '?' && !is_keyword(&ctx.scratch)
}

/// An identifier: a selector that is not a keyword, is not in the
/// dynamic exclusion set, and is not followed by `:` or `?`.
pub fn identifier(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_word(ctx, stream)
        && word_is_plain(ctx, stream)
        && !ctx.is_extra_keyword(&ctx.scratch)
}

/// An identifier that ignores the dynamic exclusion set (asm labels
/// may collide with opcode names).
pub fn identifier_any(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_word(ctx, stream) && word_is_plain(ctx, stream)
}

/// An identifier that additionally permits `send` and `super`, for
/// send targets.
pub fn send_target_name(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if !read_word(ctx, stream) {
        return false;
    }
    if stream.current() == ':' || stream.current() == '?' {
        return false;
    }
    let word = ctx.scratch.as_str();
    word == "send" || word == "super" || (!is_keyword(word) && !ctx.is_extra_keyword(word))
}

/// A selector immediately followed by `:` (no whitespace between);
/// consumes the terminator.
pub fn selector_colon(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if read_word(ctx, stream) && stream.current() == ':' {
        stream.advance();
        true
    } else {
        false
    }
}

/// A selector immediately followed by `?`; consumes the terminator.
pub fn selector_question(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if read_word(ctx, stream) && stream.current() == '?' {
        stream.advance();
        true
    } else {
        false
    }
}

/// Reads a delimited string body into the scratch register. `\` escapes
/// the closing delimiter and itself; a line break plus any following
/// whitespace collapses to a single space.
fn read_delimited(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>, open: char, close: char) -> bool {
    stream.skip_ws();
    if stream.current() != open {
        return false;
    }
    stream.advance();
    ctx.scratch.clear();
    loop {
        let c = stream.current();
        if c == EOF_CHAR {
            return false;
        }
        stream.advance();
        if c == close {
            return true;
        }
        if c == '\\' {
            let escaped = stream.current();
            if escaped == close || escaped == '\\' {
                stream.advance();
                ctx.scratch.push(escaped);
                continue;
            }
            ctx.scratch.push(c);
            continue;
        }
        if c == '\n' {
            ctx.scratch.push(' ');
            while stream.current().is_ascii_whitespace() && stream.current() != EOF_CHAR {
                stream.advance();
            }
            continue;
        }
        ctx.scratch.push(c);
    }
}

/// A `"…"` string.
pub fn quoted_string(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_delimited(ctx, stream, '"', '"')
}

/// A `{…}` string.
pub fn brace_string(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_delimited(ctx, stream, '{', '}')
}

/// A `'…'` word-pattern (Said) string.
pub fn pattern_string(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    read_delimited(ctx, stream, '\'', '\'')
}

/// A 16-bit integer: decimal with optional leading `-`, or `$hex`.
/// Out-of-range decimals wrap; the result lands in the integer
/// register.
pub fn integer(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    stream.skip_ws();
    if stream.current() == '$' {
        stream.advance();
        let mut value = 0u16;
        let mut digits = 0usize;
        while let Some(d) = stream.current().to_digit(16) {
            stream.advance();
            value = value.wrapping_mul(16).wrapping_add(d as u16);
            digits += 1;
        }
        if digits == 0 {
            return false;
        }
        ctx.integer = value;
        return true;
    }
    let negative = if stream.current() == '-' {
        stream.advance();
        true
    } else {
        false
    };
    let mut value = 0u16;
    let mut digits = 0usize;
    while let Some(d) = stream.current().to_digit(10) {
        stream.advance();
        value = value.wrapping_mul(10).wrapping_add(d as u16);
        digits += 1;
    }
    if digits == 0 {
        return false;
    }
    ctx.integer = if negative { value.wrapping_neg() } else { value };
    true
}

/// A file name for `include`/`use` arguments: `[A-Za-z0-9_.-]+`.
pub fn filename(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    stream.skip_ws();
    ctx.scratch.clear();
    while is_selector_char(stream.current()) || stream.current() == '.' {
        ctx.scratch.push(stream.take());
    }
    !ctx.scratch.is_empty()
}

/// An asm opcode mnemonic, optionally ending in `?` (e.g. `le?`).
pub fn asm_instruction(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if !read_word(ctx, stream) {
        return false;
    }
    if stream.current() == '?' {
        stream.advance();
        ctx.scratch.push('?');
    }
    true
}

/// An asm jump-target label declaration: a word immediately followed
/// by `:`. No keyword restrictions apply.
pub fn asm_label(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
    if read_word(ctx, stream) && stream.current() == ':' {
        stream.advance();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_foundation::ScriptId;

    fn context() -> ParseContext<'static> {
        ParseContext::new(ScriptId::new("test.sc"), None)
    }

    fn run(
        primitive: fn(&mut ParseContext<'_>, &mut Stream<'_>) -> bool,
        input: &str,
    ) -> Option<(String, usize)> {
        let mut ctx = context();
        let mut stream = Stream::new(input);
        if primitive(&mut ctx, &mut stream) {
            Some((ctx.scratch.clone(), stream.offset()))
        } else {
            None
        }
    }

    #[test]
    fn selector_shapes() {
        assert_eq!(run(selector, "b-moveCnt:"), Some(("b-moveCnt".into(), 9)));
        assert_eq!(run(selector, "x2"), Some(("x2".into(), 2)));
        assert_eq!(run(selector, "2x"), None);
        assert_eq!(run(selector, "--"), None);
        assert_eq!(run(selector, "("), None);
    }

    #[test]
    fn identifier_rejects_keywords_and_terminators() {
        assert_eq!(run(identifier, "gEgo "), Some(("gEgo".into(), 4)));
        assert_eq!(run(identifier, "while"), None);
        assert_eq!(run(identifier, "foo:"), None);
        assert_eq!(run(identifier, "foo?"), None);
    }

    #[test]
    fn send_target_permits_super() {
        assert_eq!(run(send_target_name, "super "), Some(("super".into(), 5)));
        assert_eq!(run(send_target_name, "send "), Some(("send".into(), 4)));
        assert_eq!(run(send_target_name, "while"), None);
    }

    #[test]
    fn dynamic_exclusion_set() {
        let mut ctx = context();
        ctx.set_extra_keywords(&["lag"]);
        let mut stream = Stream::new("lag");
        assert!(!identifier(&mut ctx, &mut stream));
        // The any-variant ignores the dynamic set.
        let mut stream = Stream::new("lag");
        assert!(identifier_any(&mut ctx, &mut stream));
    }

    #[test]
    fn terminated_selectors() {
        assert_eq!(run(selector_colon, "init:"), Some(("init".into(), 5)));
        assert_eq!(run(selector_colon, "init :"), None);
        assert_eq!(run(selector_question, "cycles?"), Some(("cycles".into(), 7)));
        assert_eq!(run(selector_question, "cycles"), None);
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(run(quoted_string, r#""hi there""#), Some(("hi there".into(), 10)));
        assert_eq!(run(brace_string, r"{a \} b}"), Some(("a } b".into(), 8)));
        assert_eq!(run(pattern_string, "'look/window'"), Some(("look/window".into(), 13)));
        assert_eq!(run(quoted_string, "\"unterminated"), None);
    }

    #[test]
    fn string_newline_collapses() {
        assert_eq!(
            run(quoted_string, "\"one\n    two\""),
            Some(("one two".into(), 13))
        );
    }

    #[test]
    fn integers_wrap_to_machine_words() {
        let mut ctx = context();
        let mut stream = Stream::new("42");
        assert!(integer(&mut ctx, &mut stream));
        assert_eq!(ctx.integer, 42);
        let mut stream = Stream::new("-1");
        assert!(integer(&mut ctx, &mut stream));
        assert_eq!(ctx.integer, 0xFFFF);
        let mut stream = Stream::new("$beef");
        assert!(integer(&mut ctx, &mut stream));
        assert_eq!(ctx.integer, 0xBEEF);
        let mut stream = Stream::new("65537");
        assert!(integer(&mut ctx, &mut stream));
        assert_eq!(ctx.integer, 1);
        let mut stream = Stream::new("$");
        assert!(!integer(&mut ctx, &mut stream));
        let mut stream = Stream::new("x");
        assert!(!integer(&mut ctx, &mut stream));
    }

    #[test]
    fn filenames() {
        assert_eq!(run(filename, "game.sh)"), Some(("game.sh".into(), 7)));
        assert_eq!(run(filename, ")"), None);
    }

    #[test]
    fn asm_lexemes() {
        assert_eq!(run(asm_instruction, "le? x"), Some(("le?".into(), 3)));
        assert_eq!(run(asm_instruction, "lag x"), Some(("lag".into(), 3)));
        assert_eq!(run(asm_label, "done:"), Some(("done".into(), 5)));
        assert_eq!(run(asm_label, "done"), None);
    }
}
