//! Per-parse mutable state.
//!
//! One `ParseContext` exists per parse call and is threaded by exclusive
//! reference through every rule and action; nothing here is shared
//! between parses. It carries the statement slot stack the semantic
//! actions build AST nodes on, typed builder slots for the declaration
//! forms, scratch registers the lexical primitives write into, and the
//! single deepest-failure record that becomes the parse error.

use crate::ast::{ClassDecl, Define, Function, Node, Script, Synonym, VariableDecl, Value};
use crate::span::Position;
use crate::stream::Stream;
use quill_foundation::{CompileLog, Diagnostic, ScriptId};
use std::collections::HashSet;

/// What kind of token an autocomplete annotation marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    /// A structural keyword (`if`, `procedure`, `properties`, …).
    Keyword,
    /// A selector position (send selector or property name).
    Selector,
    /// A value position (variable, define, class name).
    Value,
    /// A class name position (`of` clause, instance species).
    ClassName,
}

/// The deepest failure seen so far.
#[derive(Clone, Debug)]
struct Failure {
    offset: usize,
    pos: Position,
    message: String,
}

/// Mutable state for one parse.
pub struct ParseContext<'a> {
    /// The script being built.
    pub script: Script,
    /// Which script diagnostics refer to.
    pub script_id: ScriptId,

    // Statement construction.
    stack: Vec<Option<Node>>,
    statement_result: Option<Node>,

    // Typed builder slots, one per declaration form that spans several
    // sub-rules.
    /// Procedure or method under construction.
    pub function_builder: Option<Function>,
    /// Class or instance under construction.
    pub class_builder: Option<ClassDecl>,
    /// Synonym entry under construction.
    pub synonym_builder: Option<Synonym>,
    /// Variable declaration under construction.
    pub var_decl_builder: Option<VariableDecl>,
    /// Define under construction.
    pub define_builder: Option<Define>,

    // Scratch registers the lexical primitives write into.
    /// Most recent word, string, or operator spelling.
    pub scratch: String,
    /// Secondary string register (declaration names, labels).
    pub scratch2: String,
    /// Most recent integer.
    pub integer: u16,
    /// Secondary integer register (enum counters, export slots).
    pub integer2: u16,
    /// True when the most recent property-value rule produced a value.
    pub value_was_set: bool,
    /// Set by a matched `@` prefix; consumed by the token value that
    /// follows it.
    pub pointer_pending: bool,
    /// The most recent complex property value.
    pub property_value: Option<Value>,

    failure: Option<Failure>,

    // Keyword handling.
    extra_keywords: Option<&'static [&'static str]>,

    // Header preprocessor state. Single-level #ifdef only.
    defines: HashSet<String>,
    /// True while inside an `#ifdef` whose name is undefined.
    pub ignoring: bool,
    /// True while inside any `#ifdef`/`#endif` pair.
    pub in_conditional: bool,

    autocomplete: Option<Vec<(usize, TokenClass)>>,
    log: Option<&'a mut dyn CompileLog>,
}

impl<'a> ParseContext<'a> {
    /// Creates a fresh context for one parse.
    #[must_use]
    pub fn new(script_id: ScriptId, log: Option<&'a mut dyn CompileLog>) -> Self {
        Self {
            script: Script::new(),
            script_id,
            stack: Vec::new(),
            statement_result: None,
            function_builder: None,
            class_builder: None,
            synonym_builder: None,
            var_decl_builder: None,
            define_builder: None,
            scratch: String::new(),
            scratch2: String::new(),
            integer: 0,
            integer2: 0,
            value_was_set: false,
            pointer_pending: false,
            property_value: None,
            failure: None,
            extra_keywords: None,
            defines: HashSet::new(),
            ignoring: false,
            in_conditional: false,
            autocomplete: None,
            log,
        }
    }

    /// Pre-populates the preprocessor define set (header mode).
    pub fn add_defines<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defines.extend(names.into_iter().map(Into::into));
    }

    /// Returns true if `name` is a known preprocessor define.
    #[must_use]
    pub fn define_exists(&self, name: &str) -> bool {
        self.defines.contains(name)
    }

    /// True unless an `#ifdef` for an undefined name is open.
    #[must_use]
    pub fn including(&self) -> bool {
        !self.ignoring
    }

    // ---- statement slot stack -------------------------------------

    /// Opens a slot for a statement about to be parsed.
    pub fn start_statement(&mut self) {
        self.stack.push(None);
    }

    /// Closes the innermost slot. On success the slot's node becomes
    /// the statement result; on failure it is discarded.
    pub fn finish_statement(&mut self, success: bool) {
        let top = self.stack.pop().flatten();
        self.statement_result = if success { top } else { None };
    }

    /// Sets the node under construction in the innermost slot.
    pub fn set_statement(&mut self, node: Node) {
        if let Some(slot) = self.stack.last_mut() {
            *slot = Some(node);
        }
    }

    /// The node under construction in the innermost slot, if any.
    pub fn statement(&mut self) -> Option<&mut Node> {
        self.stack.last_mut().and_then(Option::as_mut)
    }

    /// Takes the completed statement out of the hand-off slot.
    pub fn take_result(&mut self) -> Option<Node> {
        self.statement_result.take()
    }

    /// Peeks at the completed statement without taking it.
    #[must_use]
    pub fn result(&self) -> Option<&Node> {
        self.statement_result.as_ref()
    }

    // ---- failure tracking -----------------------------------------

    /// Records a failure, keeping only the deepest one seen.
    pub fn report_failure(&mut self, stream: &Stream<'_>, message: &str) {
        let offset = stream.offset();
        let deeper = self.failure.as_ref().is_none_or(|f| offset > f.offset);
        if deeper {
            self.failure = Some(Failure {
                offset,
                pos: stream.position(),
                message: message.to_string(),
            });
        }
    }

    /// The deepest failure: message, position, and byte offset.
    #[must_use]
    pub fn deepest_failure(&self) -> (String, Position, usize) {
        self.failure.as_ref().map_or_else(
            || ("Syntax error.".to_string(), Position::at_start(), 0),
            |f| (f.message.clone(), f.pos, f.offset),
        )
    }

    // ---- keyword exclusion ----------------------------------------

    /// Bans an additional word list from identifiers (asm opcodes
    /// while inside an `asm` block).
    pub fn set_extra_keywords(&mut self, words: &'static [&'static str]) {
        self.extra_keywords = Some(words);
    }

    /// Clears the additional banned word list.
    pub fn clear_extra_keywords(&mut self) {
        self.extra_keywords = None;
    }

    /// Returns true if `word` is in the additional banned list.
    #[must_use]
    pub fn is_extra_keyword(&self, word: &str) -> bool {
        self.extra_keywords
            .is_some_and(|words| words.contains(&word))
    }

    // ---- autocomplete channel -------------------------------------

    /// Turns on autocomplete annotation recording.
    pub fn enable_autocomplete(&mut self) {
        self.autocomplete = Some(Vec::new());
    }

    /// Records one annotation when the channel is enabled.
    pub fn annotate(&mut self, offset: usize, class: TokenClass) {
        if let Some(channel) = &mut self.autocomplete {
            channel.push((offset, class));
        }
    }

    /// All recorded annotations, in match order.
    #[must_use]
    pub fn annotations(&self) -> &[(usize, TokenClass)] {
        self.autocomplete.as_deref().unwrap_or(&[])
    }

    // ---- diagnostics ----------------------------------------------

    /// Reports an advisory warning when a log is attached.
    pub fn warn(&mut self, message: impl Into<String>, pos: Position) {
        if let Some(log) = &mut self.log {
            log.report(Diagnostic::warning(
                message,
                self.script_id.clone(),
                pos.line,
                pos.column,
            ));
        }
    }

    /// Reports a non-fatal error when a log is attached.
    pub fn error(&mut self, message: impl Into<String>, pos: Position) {
        if let Some(log) = &mut self.log {
            log.report(Diagnostic::error(
                message,
                self.script_id.clone(),
                pos.line,
                pos.column,
            ));
        }
    }

    /// Detaches the log for the desugaring pass.
    pub fn take_log(&mut self) -> Option<&'a mut dyn CompileLog> {
        self.log.take()
    }
}
