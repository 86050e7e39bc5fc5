//! Integration tests for parse error reporting.
//!
//! The parser keeps only the deepest failure it saw, so the reported
//! message and position should point at the real problem even after
//! heavy backtracking.

use quill_foundation::LogCollector;
use quill_language::{ParseOptions, parse_script};

fn parse_err(source: &str) -> String {
    parse_script(source, &ParseOptions::new("test.sc"), None)
        .expect_err("source should not parse")
        .to_string()
}

#[test]
fn empty_if_condition() {
    let message = parse_err("(procedure (P) (if ))");
    assert!(message.contains("Expected an expression."), "got: {message}");
}

#[test]
fn missing_procedure_name() {
    let message = parse_err("(procedure ( ) (return 0))");
    assert!(message.contains("Expected word."), "got: {message}");
}

#[test]
fn missing_define_value() {
    let message = parse_err("(define kThing)");
    assert!(message.contains("Expected integer."), "got: {message}");
}

#[test]
fn zero_break_levels() {
    let message = parse_err("(procedure (P) (while 1 (break 0)))");
    assert!(
        message.contains("Expected non-zero integer."),
        "got: {message}"
    );
}

#[test]
fn switch_case_without_value() {
    let message = parse_err("(procedure (P x) (switch x ()))");
    assert!(
        message.contains("Expected case value or 'else' keyword."),
        "got: {message}"
    );
}

#[test]
fn bad_array_size() {
    let message = parse_err("(local [buffer kUndefined])");
    assert!(message.contains("Expected array size."), "got: {message}");
}

#[test]
fn statement_keyword_without_parenthesis() {
    let message = parse_err("if (== x 1) (Print 1)");
    assert!(
        message.contains("Statements must begin with a parenthesis: \"(if\")."),
        "got: {message}"
    );
}

#[test]
fn operator_without_parenthesis() {
    let message = parse_err("== 1 1");
    assert!(
        message.contains("Operator expressions must begin with a parenthesis: \"(==\")."),
        "got: {message}"
    );
}

#[test]
fn deepest_failure_wins_over_earlier_ones() {
    // The grammar backtracks out of the whole procedure, but the
    // reported position is the empty condition, not the opening paren.
    let err = parse_script(
        "(procedure (P)\n\t(if ))",
        &ParseOptions::new("test.sc"),
        None,
    )
    .expect_err("empty condition");
    let message = err.to_string();
    assert!(message.contains("2:"), "got: {message}");
    assert!(message.contains("Expected an expression."), "got: {message}");
}

#[test]
fn failure_also_lands_in_the_log() {
    let mut log = LogCollector::new();
    let err = parse_script(
        "(procedure (P) (if ))",
        &ParseOptions::new("test.sc"),
        Some(&mut log),
    )
    .expect_err("empty condition");
    let errors = log.errors();
    assert_eq!(errors.len(), 1);
    assert!(err.to_string().contains(&errors[0].message));
}

#[test]
fn garbage_reports_a_syntax_error() {
    let message = parse_err("]]]]");
    assert!(message.contains("Syntax error."), "got: {message}");
}
