//! Public parse entry points.
//!
//! `parse_script` and `parse_header` wrap the shared grammar: build a
//! context, run the match, desugar on success, and turn the deepest
//! recorded failure into an [`Error`] on failure. The failure message
//! is decorated with the token found at the failure point, which turns
//! the generic "Syntax error." into something actionable when the
//! writer forgot an opening parenthesis.

use crate::ast::Script;
use crate::context::{ParseContext, TokenClass};
use crate::desugar::desugar;
use crate::grammar::script_grammar;
use crate::operators::is_operator_name;
use crate::primitives::STATEMENT_KEYWORDS;
use crate::stream::Stream;
use quill_foundation::{CompileLog, Diagnostic, Error, Result, ScriptId};

/// Options controlling a parse.
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Name used in diagnostics, usually the file name.
    pub script_name: String,
    /// Preprocessor defines honored by `#ifdef` in header mode.
    pub defines: Vec<String>,
}

impl ParseOptions {
    /// Options for a named script with no defines.
    #[must_use]
    pub fn new(script_name: impl Into<String>) -> Self {
        Self {
            script_name: script_name.into(),
            defines: Vec::new(),
        }
    }
}

/// Parses a complete script source.
///
/// On success the returned script is fully desugared. Advisory
/// diagnostics from both phases go to `log` when one is given.
///
/// # Errors
///
/// Returns a parse error carrying the deepest failure position and
/// message when the source does not match the grammar. The same record
/// is also reported to `log`.
pub fn parse_script(
    source: &str,
    options: &ParseOptions,
    log: Option<&mut dyn CompileLog>,
) -> Result<Script> {
    run(source, options, log, false)
}

/// Parses a header file: defines, enums, includes, selectors, and
/// procedure forwards, optionally gated by one level of
/// `#ifdef`/`#endif` against `options.defines`.
///
/// # Errors
///
/// Returns a parse error carrying the deepest failure position and
/// message when the source does not match the grammar.
pub fn parse_header(
    source: &str,
    options: &ParseOptions,
    log: Option<&mut dyn CompileLog>,
) -> Result<Script> {
    run(source, options, log, true)
}

/// Re-parses a script with annotation recording on and returns the
/// token-class annotations, in match order. Parse failures are
/// ignored; whatever matched before the failure is still annotated.
#[must_use]
pub fn annotate_script(source: &str, options: &ParseOptions) -> Vec<(usize, TokenClass)> {
    let script_id = ScriptId::new(options.script_name.as_str());
    let mut ctx = ParseContext::new(script_id, None);
    ctx.enable_autocomplete();
    let mut stream = Stream::new(source);
    let _ = script_grammar().parse_script(&mut ctx, &mut stream);
    ctx.annotations().to_vec()
}

fn run(
    source: &str,
    options: &ParseOptions,
    log: Option<&mut dyn CompileLog>,
    header: bool,
) -> Result<Script> {
    let script_id = ScriptId::new(options.script_name.as_str());
    let mut ctx = ParseContext::new(script_id.clone(), log);
    ctx.add_defines(options.defines.iter().cloned());
    let mut stream = Stream::new(source);
    let grammar = script_grammar();
    let matched = if header {
        grammar.parse_header(&mut ctx, &mut stream)
    } else {
        grammar.parse_script(&mut ctx, &mut stream)
    };
    if matched {
        let mut script = std::mem::take(&mut ctx.script);
        let log = ctx.take_log();
        desugar(&mut script, &script_id, log);
        return Ok(script);
    }
    let (message, pos, offset) = ctx.deepest_failure();
    let message = decorate_failure(&message, source, offset);
    if let Some(log) = ctx.take_log() {
        log.report(Diagnostic::error(
            message.clone(),
            script_id,
            pos.line,
            pos.column,
        ));
    }
    Err(Error::parse_error(message, pos.line, pos.column))
}

/// Improves a failure message using the token at the failure point.
fn decorate_failure(base: &str, source: &str, offset: usize) -> String {
    let token = extract_token(source, offset);
    if token.is_empty() {
        return base.to_string();
    }
    if token == "else" {
        return "\"else\" cannot appear here.".to_string();
    }
    if STATEMENT_KEYWORDS.contains(&token.as_str()) {
        return format!("Statements must begin with a parenthesis: \"({token}\").");
    }
    if is_operator_name(&token) {
        return format!("Operator expressions must begin with a parenthesis: \"({token}\").");
    }
    format!("{base} Found \"{token}\".")
}

/// The run of non-delimiter characters at `offset`, capped so a wall
/// of garbage does not flood the message.
fn extract_token(source: &str, offset: usize) -> String {
    source
        .get(offset..)
        .unwrap_or("")
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .take(32)
        .collect()
}
