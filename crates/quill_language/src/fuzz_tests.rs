//! Fuzz tests for parser crash resistance.
//!
//! These tests use property-based testing to verify that the parser
//! never panics on any input, even malformed or adversarial inputs,
//! and that a handful of structural properties hold on generated
//! sources.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::optrie::OperatorTable;
    use crate::parser::{ParseOptions, parse_header, parse_script};
    use crate::stream::Stream;

    fn options() -> ParseOptions {
        ParseOptions::new("fuzz.sc")
    }

    // ==========================================================================
    // Arbitrary String Generators
    // ==========================================================================

    /// Strategy for generating completely random strings (potential garbage).
    fn arbitrary_string() -> impl Strategy<Value = String> {
        prop::collection::vec(any::<char>(), 0..1000).prop_map(|chars| chars.into_iter().collect())
    }

    /// Strategy for generating strings with script-like structure.
    fn script_like_string() -> impl Strategy<Value = String> {
        let atom = prop_oneof![
            "[0-9]+".prop_map(String::from),              // Numbers
            r"\$[0-9a-fA-F]+".prop_map(String::from),     // Hex numbers
            "[a-zA-Z][a-zA-Z0-9_-]*".prop_map(String::from), // Words
            "[a-z][a-zA-Z0-9]*:".prop_map(String::from),  // Selectors
            r#""[^"\\]*""#.prop_map(String::from),        // Strings
            Just("&rest".to_string()),
            Just("&tmp".to_string()),
            Just("@buffer".to_string()),
            Just("#init".to_string()),
            "(if|else|cond|switch|switchto|foreach|procedure|instance|of)"
                .prop_map(String::from),
            r"(\+|-|\*|/|==|!=|<=|>=|u<|\+\+|--|mod|and|or|not)".prop_map(String::from),
        ];

        let delim = prop_oneof![
            Just("(".to_string()),
            Just(")".to_string()),
            Just("[".to_string()),
            Just("]".to_string()),
            Just("{".to_string()),
            Just("}".to_string()),
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just("; comment\n".to_string()),
        ];

        prop::collection::vec(prop_oneof![atom, delim], 0..100)
            .prop_map(|parts| parts.join(" "))
    }

    /// Strategy for generating strings with unbalanced delimiters.
    fn unbalanced_delimiters() -> impl Strategy<Value = String> {
        let parts = prop::collection::vec(
            prop_oneof![
                Just("(".to_string()),
                Just(")".to_string()),
                Just("[".to_string()),
                Just("]".to_string()),
                Just("a".to_string()),
                Just(" ".to_string()),
            ],
            1..50,
        );
        parts.prop_map(|v| v.join(""))
    }

    /// Strategy for numeric edge cases.
    fn numeric_edge_cases() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("0".to_string()),
            Just("-0".to_string()),
            Just("65535".to_string()),
            Just("-32768".to_string()),
            Just("99999999999999999999".to_string()), // overflow
            Just("$".to_string()),                    // bare hex prefix
            Just("$ffff".to_string()),
            Just("$FFFFFFFF".to_string()),
            Just("-$10".to_string()),
            Just("1e5".to_string()),
        ]
    }

    /// Strategy for deep nesting.
    fn deeply_nested() -> impl Strategy<Value = String> {
        (1..60usize).prop_map(|depth| {
            let open: String = std::iter::repeat_n('(', depth).collect();
            let close: String = std::iter::repeat_n(')', depth).collect();
            format!("(procedure (P) {open}1{close})")
        })
    }

    /// Strategy for string-literal edge cases across all three quoting
    /// forms.
    fn string_edge_cases() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(r#""unterminated"#.to_string()),
            Just(r#""escaped \" quote""#.to_string()),
            Just("\"line\n   continuation\"".to_string()),
            Just("{brace string}".to_string()),
            Just("{unterminated brace".to_string()),
            Just("'pattern string'".to_string()),
            Just(r"'escaped \' tick'".to_string()),
            Just("\"trailing backslash \\".to_string()),
        ]
    }

    // ==========================================================================
    // Parser Fuzz Tests
    // ==========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        /// Parser never panics on arbitrary input.
        #[test]
        fn parser_never_panics_on_arbitrary_input(input in arbitrary_string()) {
            let _ = parse_script(&input, &options(), None);
        }

        /// Parser never panics on script-like input.
        #[test]
        fn parser_never_panics_on_script_like_input(input in script_like_string()) {
            let _ = parse_script(&input, &options(), None);
        }

        /// Header parser never panics on script-like input.
        #[test]
        fn header_parser_never_panics(input in script_like_string()) {
            let _ = parse_header(&input, &options(), None);
        }

        /// Parser never panics on unbalanced delimiters.
        #[test]
        fn parser_never_panics_on_unbalanced(input in unbalanced_delimiters()) {
            let _ = parse_script(&input, &options(), None);
        }

        /// Parser handles deeply nested expressions.
        #[test]
        fn parser_handles_deep_nesting(input in deeply_nested()) {
            let _ = parse_script(&input, &options(), None);
        }

        /// Parser handles numeric edge cases in value position.
        #[test]
        fn parser_handles_numeric_edge_cases(number in numeric_edge_cases()) {
            let input = format!("(procedure (P) (return {number}))");
            let _ = parse_script(&input, &options(), None);
        }

        /// Parser handles string-literal edge cases.
        #[test]
        fn parser_handles_string_edge_cases(string in string_edge_cases()) {
            let input = format!("(procedure (P) (Print {string}))");
            let _ = parse_script(&input, &options(), None);
        }
    }

    // ==========================================================================
    // Structural Properties
    // ==========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any in-range integer parses in value position.
        #[test]
        fn valid_integer_parses(n in 0u16..) {
            let input = format!("(procedure (P) (return {n}))");
            prop_assert!(parse_script(&input, &options(), None).is_ok());
        }

        /// Any generated procedure name round-trips into the script.
        #[test]
        fn procedure_name_survives(name in "[A-Za-z][A-Za-z0-9_]{0,12}") {
            prop_assume!(!crate::primitives::is_keyword(&name));
            prop_assume!(!crate::operators::is_operator_name(&name));
            let input = format!("(procedure ({name}) (return 0))");
            let script = parse_script(&input, &options(), None).unwrap();
            prop_assert_eq!(script.procedures[0].function.name.as_str(), name.as_str());
        }

        /// A second desugar run is a no-op on any parse that succeeded.
        #[test]
        fn desugar_is_idempotent_on_generated_scripts(
            count in 1..5usize,
            value in 0u16..100,
        ) {
            let cases: String = (0..count)
                .map(|_| format!("((Print {value}))"))
                .collect::<Vec<_>>()
                .join(" ");
            let input = format!(
                "(local [items 4])\n(procedure (P x)\n(switchto x {cases})\n(foreach t items (Print t))\n)"
            );
            let script = parse_script(&input, &options(), None).unwrap();
            let mut again = script.clone();
            crate::desugar::desugar(
                &mut again,
                &quill_foundation::ScriptId::new("fuzz.sc"),
                None,
            );
            prop_assert_eq!(script, again);
        }

        /// Operator recognition always takes the longest spelling: a
        /// two-character operator followed by whitespace never matches
        /// as its one-character prefix.
        #[test]
        fn operator_match_is_longest(op in prop_oneof![
            Just("++"), Just("--"), Just(">>"), Just("<<"), Just("<="),
            Just(">="), Just("=="), Just("!="), Just("u<"), Just("+="),
        ]) {
            let table = OperatorTable::new(&[
                "+", "++", "+=", "-", "--", ">>", "<<", "<", "<=", ">",
                ">=", "=", "==", "!=", "u<",
            ]);
            let source = format!("{op} x");
            let mut stream = Stream::new(&source);
            let mut spelling = String::new();
            prop_assert!(table.matches(&mut stream, &mut spelling));
            prop_assert_eq!(spelling.as_str(), op);
        }
    }

    // ==========================================================================
    // Specific Edge Cases
    // ==========================================================================

    #[test]
    fn parser_handles_empty_input() {
        let script = parse_script("", &options(), None).unwrap();
        assert!(script.procedures.is_empty());
    }

    #[test]
    fn parser_handles_only_whitespace() {
        assert!(parse_script("   \n\t   ", &options(), None).is_ok());
    }

    #[test]
    fn parser_handles_only_comments() {
        let script = parse_script("; a comment\n; another\n", &options(), None).unwrap();
        assert!(script.procedures.is_empty());
    }

    #[test]
    fn parser_handles_very_long_word() {
        let long_word: String = "x".repeat(10000);
        let input = format!("(procedure (P) (Print {long_word}))");
        assert!(parse_script(&input, &options(), None).is_ok());
    }

    #[test]
    fn parser_handles_very_long_string() {
        let content: String = "a".repeat(10000);
        let input = format!("(procedure (P) (Print \"{content}\"))");
        assert!(parse_script(&input, &options(), None).is_ok());
    }

    #[test]
    fn parser_handles_many_siblings() {
        let many: String = (0..1000).map(|i| format!("(Print {i}) ")).collect();
        let input = format!("(procedure (P) {many})");
        assert!(parse_script(&input, &options(), None).is_ok());
    }

    #[test]
    fn parser_rejects_mismatched_delimiters() {
        assert!(parse_script("(procedure (P) (Print 1]]", &options(), None).is_err());
    }

    #[test]
    fn parser_handles_null_bytes() {
        let _ = parse_script("(procedure (P)\0(Print 1))", &options(), None);
    }
}
