//! Backtracking parser-combinator core.
//!
//! A [`Rule`] pairs a matcher shape with attached semantic actions.
//! The shapes form a closed variant tree composed with ordinary
//! functions; there is no trait object in the hot path. Matching
//! centralizes the backtracking contract: every rule checkpoints the
//! stream on entry and restores it on failure, so a failed alternative
//! never leaves partial input consumed.
//!
//! Actions run after the inner match completes, successful or not —
//! error-reporting actions rely on firing for failures. Actions must
//! commit durable mutations only on success.

use crate::context::{ParseContext, TokenClass};
use crate::optrie::OperatorTable;
use crate::stream::Stream;

/// A primitive matcher operating directly on the stream.
pub type MatcherFn = for<'a, 'b, 'c> fn(&'a mut ParseContext<'b>, &'a mut Stream<'c>) -> bool;

/// A semantic action: context, match outcome, stream after the match.
pub type ActionFn = for<'a, 'b, 'c> fn(&'a mut ParseContext<'b>, bool, &'a Stream<'c>);

/// Index of a named rule in the [`Grammar`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleId(usize);

/// The matcher shapes.
enum RuleKind {
    /// A primitive matcher function.
    Match(MatcherFn),
    /// A literal character token.
    Char(char),
    /// A literal word token, not followed by an identifier character.
    Keyword(&'static str),
    /// An operator-table scan; the spelling lands in the scratch
    /// register.
    Operator(&'static OperatorTable),
    /// Matches nothing, always succeeds. Used to fire an action at a
    /// known point in a sequence.
    Always,
    /// All in order.
    Seq(Vec<Rule>),
    /// First success wins; order encodes precedence.
    Alt(Vec<Rule>),
    /// Inner rule or nothing; always succeeds.
    Opt(Box<Rule>),
    /// Inner rule at least `min` times.
    Repeat {
        /// Minimum repetitions for success.
        min: usize,
        /// Repeated rule.
        rule: Box<Rule>,
    },
    /// Items separated by a separator; zero items succeed.
    SepBy {
        /// Item rule.
        item: Box<Rule>,
        /// Separator rule.
        sep: Box<Rule>,
    },
    /// Negative lookahead; consumes nothing either way.
    Not(Box<Rule>),
    /// A named rule resolved against the grammar arena, enabling
    /// mutual recursion.
    Call(RuleId),
}

/// A composable grammar rule with attached actions.
pub struct Rule {
    kind: RuleKind,
    actions: Vec<ActionFn>,
    token_class: Option<TokenClass>,
}

impl Rule {
    fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            actions: Vec::new(),
            token_class: None,
        }
    }

    /// Attaches a semantic action, fired after this rule completes.
    #[must_use]
    pub fn act(mut self, action: ActionFn) -> Self {
        self.actions.push(action);
        self
    }

    /// Marks this rule as an autocomplete annotation source.
    #[must_use]
    pub fn classify(mut self, class: TokenClass) -> Self {
        self.token_class = Some(class);
        self
    }

    /// Attempts this rule. Restores the stream on failure.
    pub fn matches(
        &self,
        grammar: &Grammar,
        ctx: &mut ParseContext<'_>,
        stream: &mut Stream<'_>,
    ) -> bool {
        let entry = stream.checkpoint();
        let matched = match &self.kind {
            RuleKind::Match(f) => f(ctx, stream),
            RuleKind::Char(c) => {
                stream.skip_ws();
                if stream.current() == *c {
                    stream.advance();
                    true
                } else {
                    false
                }
            }
            RuleKind::Keyword(word) => {
                stream.skip_ws();
                let mut ok = true;
                for expected in word.chars() {
                    if stream.current() == expected {
                        stream.advance();
                    } else {
                        ok = false;
                        break;
                    }
                }
                // `fore` must not match the head of `foreach`.
                ok && !is_identifier_char(stream.current())
            }
            RuleKind::Operator(table) => {
                stream.skip_ws();
                let mut spelling = String::new();
                if table.matches(stream, &mut spelling) {
                    ctx.scratch = spelling;
                    true
                } else {
                    false
                }
            }
            RuleKind::Always => true,
            RuleKind::Seq(rules) => rules.iter().all(|r| r.matches(grammar, ctx, stream)),
            RuleKind::Alt(rules) => rules.iter().any(|r| r.matches(grammar, ctx, stream)),
            RuleKind::Opt(rule) => {
                rule.matches(grammar, ctx, stream);
                true
            }
            RuleKind::Repeat { min, rule } => {
                let mut count = 0usize;
                while rule.matches(grammar, ctx, stream) {
                    count += 1;
                }
                count >= *min
            }
            RuleKind::SepBy { item, sep } => {
                if item.matches(grammar, ctx, stream) {
                    loop {
                        let before = stream.checkpoint();
                        if sep.matches(grammar, ctx, stream) {
                            if !item.matches(grammar, ctx, stream) {
                                stream.restore(before);
                                break;
                            }
                        } else {
                            break;
                        }
                    }
                }
                true
            }
            RuleKind::Not(rule) => {
                let matched = rule.matches(grammar, ctx, stream);
                stream.restore(entry);
                !matched
            }
            RuleKind::Call(id) => grammar.rule(*id).matches(grammar, ctx, stream),
        };
        if !matched {
            stream.restore(entry);
        }
        if matched {
            if let Some(class) = self.token_class {
                ctx.annotate(entry.offset(), class);
            }
        }
        for action in &self.actions {
            action(ctx, matched, stream);
        }
        matched
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Wraps a primitive matcher function.
#[must_use]
pub fn matcher(f: MatcherFn) -> Rule {
    Rule::new(RuleKind::Match(f))
}

/// A literal character token.
#[must_use]
pub fn char_token(c: char) -> Rule {
    Rule::new(RuleKind::Char(c))
}

/// A literal word token.
#[must_use]
pub fn keyword(word: &'static str) -> Rule {
    Rule::new(RuleKind::Keyword(word))
}

/// An operator-table scan.
#[must_use]
pub fn operator(table: &'static OperatorTable) -> Rule {
    Rule::new(RuleKind::Operator(table))
}

/// Matches nothing and succeeds; an action anchor.
#[must_use]
pub fn always() -> Rule {
    Rule::new(RuleKind::Always)
}

/// All rules in order.
#[must_use]
pub fn seq(rules: Vec<Rule>) -> Rule {
    Rule::new(RuleKind::Seq(rules))
}

/// First matching rule wins.
#[must_use]
pub fn alt(rules: Vec<Rule>) -> Rule {
    Rule::new(RuleKind::Alt(rules))
}

/// Inner rule or nothing.
#[must_use]
pub fn opt(rule: Rule) -> Rule {
    Rule::new(RuleKind::Opt(Box::new(rule)))
}

/// Inner rule zero or more times.
#[must_use]
pub fn zero_or_more(rule: Rule) -> Rule {
    at_least(0, rule)
}

/// Inner rule one or more times.
#[must_use]
pub fn one_or_more(rule: Rule) -> Rule {
    at_least(1, rule)
}

/// Inner rule at least `min` times.
#[must_use]
pub fn at_least(min: usize, rule: Rule) -> Rule {
    Rule::new(RuleKind::Repeat {
        min,
        rule: Box::new(rule),
    })
}

/// Items separated by a separator, zero items allowed.
#[must_use]
pub fn sep_by(item: Rule, sep: Rule) -> Rule {
    Rule::new(RuleKind::SepBy {
        item: Box::new(item),
        sep: Box::new(sep),
    })
}

/// Negative lookahead.
#[must_use]
pub fn not(rule: Rule) -> Rule {
    Rule::new(RuleKind::Not(Box::new(rule)))
}

/// A reference to a named rule in the arena.
#[must_use]
pub fn call(id: RuleId) -> Rule {
    Rule::new(RuleKind::Call(id))
}

/// The rule arena. Built once per process; rules reference each other
/// by [`RuleId`], which is what lets the grammar be mutually recursive
/// without self-referential ownership.
#[derive(Default)]
pub struct Grammar {
    rules: Vec<Option<Rule>>,
}

impl Grammar {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a slot so the rule can be referenced before it is
    /// defined.
    pub fn declare(&mut self) -> RuleId {
        self.rules.push(None);
        RuleId(self.rules.len() - 1)
    }

    /// Fills a declared slot.
    ///
    /// # Panics
    /// Panics if the slot is already defined.
    pub fn define(&mut self, id: RuleId, rule: Rule) {
        let slot = &mut self.rules[id.0];
        assert!(slot.is_none(), "rule defined twice");
        *slot = Some(rule);
    }

    /// Declares and defines in one step.
    pub fn add(&mut self, rule: Rule) -> RuleId {
        let id = self.declare();
        self.define(id, rule);
        id
    }

    fn rule(&self, id: RuleId) -> &Rule {
        self.rules[id.0]
            .as_ref()
            .unwrap_or_else(|| panic!("rule {} declared but never defined", id.0))
    }

    /// Runs a named rule against the stream from the top.
    pub fn parse(
        &self,
        id: RuleId,
        ctx: &mut ParseContext<'_>,
        stream: &mut Stream<'_>,
    ) -> bool {
        self.rule(id).matches(self, ctx, stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_foundation::ScriptId;

    fn context() -> ParseContext<'static> {
        ParseContext::new(ScriptId::new("test.sc"), None)
    }

    fn letter(ctx: &mut ParseContext<'_>, stream: &mut Stream<'_>) -> bool {
        stream.skip_ws();
        let c = stream.current();
        if c.is_ascii_alphabetic() {
            stream.advance();
            ctx.scratch.clear();
            ctx.scratch.push(c);
            true
        } else {
            false
        }
    }

    fn note_failure(ctx: &mut ParseContext<'_>, matched: bool, stream: &Stream<'_>) {
        if !matched {
            ctx.report_failure(stream, "Expected word.");
        }
    }

    #[test]
    fn sequence_restores_on_partial_failure() {
        let grammar = Grammar::new();
        let rule = seq(vec![char_token('('), matcher(letter), char_token(')')]);
        let mut ctx = context();
        let mut stream = Stream::new("(a");
        assert!(!rule.matches(&grammar, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn alternation_first_success_wins() {
        let grammar = Grammar::new();
        let rule = alt(vec![keyword("break"), keyword("breakif")]);
        let mut ctx = context();
        // "breakif" is not matched by the "break" branch because the
        // keyword must not be followed by an identifier character.
        let mut stream = Stream::new("breakif x");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 7);
    }

    #[test]
    fn optional_always_succeeds() {
        let grammar = Grammar::new();
        let rule = seq(vec![opt(char_token('@')), matcher(letter)]);
        let mut ctx = context();
        let mut stream = Stream::new("x");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        let mut stream = Stream::new("@x");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
    }

    #[test]
    fn repetition_minimum_enforced() {
        let grammar = Grammar::new();
        let rule = one_or_more(matcher(letter));
        let mut ctx = context();
        let mut stream = Stream::new("abc 1");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        let mut stream = Stream::new("123");
        assert!(!rule.matches(&grammar, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn separated_list_leaves_trailing_separator() {
        let grammar = Grammar::new();
        let rule = sep_by(matcher(letter), char_token(','));
        let mut ctx = context();
        let mut stream = Stream::new("a, b, c)");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        stream.skip_ws();
        assert_eq!(stream.current(), ')');
        // A dangling separator is not consumed.
        let mut stream = Stream::new("a, )");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        stream.skip_ws();
        assert_eq!(stream.current(), ',');
    }

    #[test]
    fn negative_lookahead_consumes_nothing() {
        let grammar = Grammar::new();
        let rule = not(char_token('('));
        let mut ctx = context();
        let mut stream = Stream::new("x");
        assert!(rule.matches(&grammar, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 0);
        let mut stream = Stream::new("(");
        assert!(!rule.matches(&grammar, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 0);
    }

    #[test]
    fn actions_fire_on_failure() {
        let grammar = Grammar::new();
        let rule = matcher(letter).act(note_failure);
        let mut ctx = context();
        let mut stream = Stream::new("123");
        assert!(!rule.matches(&grammar, &mut ctx, &mut stream));
        let (message, _, _) = ctx.deepest_failure();
        assert_eq!(message, "Expected word.");
    }

    #[test]
    fn arena_recursion() {
        // nested = '(' nested* ')'
        let mut grammar = Grammar::new();
        let nested = grammar.declare();
        grammar.define(
            nested,
            seq(vec![
                char_token('('),
                zero_or_more(call(nested)),
                char_token(')'),
            ]),
        );
        let mut ctx = context();
        let mut stream = Stream::new("(() (()))");
        assert!(grammar.parse(nested, &mut ctx, &mut stream));
        let mut stream = Stream::new("(()");
        assert!(!grammar.parse(nested, &mut ctx, &mut stream));
        assert_eq!(stream.offset(), 0);
    }
}
