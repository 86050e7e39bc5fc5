//! Integration tests for header parsing.
//!
//! Headers carry defines, enums, includes, and selector tables, with a
//! single level of `#ifdef`/`#endif` gating.

use quill_foundation::LogCollector;
use quill_language::{ParseOptions, parse_header};

#[test]
fn parse_plain_header() {
    let script = parse_header(
        "(include \"base.sh\")\n\
         (define kInvItem 1)\n\
         (enum eRoomFirst eRoomSecond)",
        &ParseOptions::new("game.sh"),
        None,
    )
    .expect("valid header");
    assert_eq!(script.includes, vec!["base.sh".to_string()]);
    assert_eq!(script.define_value("kInvItem"), Some(1));
    assert_eq!(script.define_value("eRoomSecond"), Some(1));
}

#[test]
fn ifdef_skips_undefined_sections() {
    let source = "#ifdef SCI_1_1\n\
                  (define kNewStuff 7)\n\
                  #endif\n\
                  (define kAlways 8)";
    let script = parse_header(source, &ParseOptions::new("game.sh"), None).expect("header");
    assert!(script.define_value("kNewStuff").is_none());
    assert_eq!(script.define_value("kAlways"), Some(8));
}

#[test]
fn ifdef_keeps_defined_sections() {
    let source = "#ifdef SCI_1_1\n\
                  (define kNewStuff 7)\n\
                  #endif";
    let mut options = ParseOptions::new("game.sh");
    options.defines.push("SCI_1_1".to_string());
    let script = parse_header(source, &options, None).expect("header");
    assert_eq!(script.define_value("kNewStuff"), Some(7));
}

#[test]
fn header_selectors_warn_as_unimplemented() {
    let mut log = LogCollector::new();
    let script = parse_header(
        "(selectors\n\ty 3\n\tx 4\n)",
        &ParseOptions::new("game.sh"),
        Some(&mut log),
    )
    .expect("header");
    assert_eq!(script.selectors.len(), 2);
    assert!(
        log.warnings()
            .iter()
            .any(|d| d.message == "selectors ignored - not implemented")
    );
}
