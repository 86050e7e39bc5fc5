//! Integration tests for script parsing.
//!
//! Tests the full pipeline from source text to a lowered `Script`.

use quill_language::operators::{AssignmentOperator, BinaryOperator};
use quill_language::{Node, ParseOptions, Script, Value, ValueKind, parse_script};

fn parse(source: &str) -> Script {
    parse_script(source, &ParseOptions::new("test.sc"), None).expect("valid script")
}

// =============================================================================
// Metadata and declarations
// =============================================================================

#[test]
fn parse_metadata() {
    let script = parse(
        "(script# 42)\n\
         (text# 43)\n\
         (include \"game.sh\")\n\
         (use \"main\")",
    );
    assert_eq!(script.script_number, Some(42));
    assert_eq!(script.text_number, Some(43));
    assert_eq!(script.includes, vec!["game.sh".to_string()]);
    assert_eq!(script.uses, vec!["main".to_string()]);
}

#[test]
fn parse_defines_and_enums() {
    let script = parse("(define kMax 100)\n(enum 5 eFirst eSecond eThird)");
    assert_eq!(script.define_value("kMax"), Some(100));
    assert_eq!(script.define_value("eFirst"), Some(5));
    assert_eq!(script.define_value("eThird"), Some(7));
}

#[test]
fn parse_locals_with_arrays() {
    let script = parse("(local count [buffer 40] total)");
    assert_eq!(script.variables.len(), 3);
    assert!(!script.variables[0].is_array());
    assert_eq!(script.variables[1].size, 40);
    assert_eq!(script.variables[1].name, "buffer");
}

#[test]
fn parse_synonyms() {
    let script = parse("(synonyms (examine look inspect) (get take))");
    assert_eq!(script.synonyms.len(), 2);
    assert_eq!(script.synonyms[0].main_word, "examine");
    assert_eq!(script.synonyms[1].synonyms, vec!["take".to_string()]);
}

// =============================================================================
// Procedures and expressions
// =============================================================================

#[test]
fn parse_procedure_with_temps() {
    let script = parse("(procedure (Compute a b &tmp result [scratch 10]) (return result))");
    let function = &script.procedures[0].function;
    assert_eq!(function.name, "Compute");
    assert_eq!(function.params, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(function.temps.len(), 2);
    assert_eq!(function.temps[1].size, 10);
}

#[test]
fn parse_binary_expression() {
    let script = parse("(procedure (Add a b) (return (+ a b)))");
    let Node::Return {
        value: Some(value), ..
    } = &script.procedures[0].function.code[0]
    else {
        panic!("expected return");
    };
    assert!(matches!(
        value.as_ref(),
        Node::BinaryOp {
            operator: BinaryOperator::Add,
            ..
        }
    ));
}

#[test]
fn parse_assignment_operators() {
    let script = parse("(procedure (P x) (+= x 2) (= x (* x 3)))");
    let code = &script.procedures[0].function.code;
    assert!(matches!(
        &code[0],
        Node::Assignment {
            operator: AssignmentOperator::AddAssign,
            ..
        }
    ));
    let Node::Assignment { value, .. } = &code[1] else {
        panic!("expected assignment");
    };
    assert!(matches!(
        value.as_ref(),
        Node::BinaryOp {
            operator: BinaryOperator::Multiply,
            ..
        }
    ));
}

#[test]
fn parse_negative_and_hex_numbers() {
    let script = parse("(procedure (P) (return -5) (return $1f))");
    let code = &script.procedures[0].function.code;
    let Node::Return {
        value: Some(negative),
        ..
    } = &code[0]
    else {
        panic!("expected return");
    };
    assert!(matches!(
        negative.as_ref(),
        Node::Value(Value { kind: ValueKind::Number(n), .. }) if *n == 5u16.wrapping_neg()
    ));
    let Node::Return {
        value: Some(hex), ..
    } = &code[1]
    else {
        panic!("expected return");
    };
    assert!(matches!(
        hex.as_ref(),
        Node::Value(Value { kind: ValueKind::Number(0x1f), .. })
    ));
}

#[test]
fn parse_special_values() {
    let script = parse("(procedure (P buf) (Print #doit) (Print &sizeof buf) (Print @buf) (Print argc))");
    let code = &script.procedures[0].function.code;
    let arg = |i: usize| -> &Node {
        let Node::ProcedureCall { args, .. } = &code[i] else {
            panic!("expected call");
        };
        &args[0]
    };
    assert!(matches!(
        arg(0),
        Node::Value(Value { kind: ValueKind::Selector(s), .. }) if s == "doit"
    ));
    assert!(matches!(
        arg(1),
        Node::Value(Value { kind: ValueKind::ArraySize(s), .. }) if s == "buf"
    ));
    assert!(matches!(
        arg(2),
        Node::Value(Value { is_pointer: true, .. })
    ));
    assert!(matches!(
        arg(3),
        Node::Value(Value { kind: ValueKind::ParamTotal, .. })
    ));
}

#[test]
fn parse_string_forms() {
    let script = parse(
        "(procedure (P) (Print \"a quoted\") (Print {a brace}) (Print 'a said'))",
    );
    let code = &script.procedures[0].function.code;
    for (i, expected) in [
        (0usize, "a quoted"),
        (1, "a brace"),
        (2, "a said"),
    ] {
        let Node::ProcedureCall { args, .. } = &code[i] else {
            panic!("expected call");
        };
        match &args[0] {
            Node::Value(Value {
                kind: ValueKind::String(s) | ValueKind::Said(s),
                ..
            }) => assert_eq!(s, expected),
            other => panic!("expected string value, got {other:?}"),
        }
    }
}

// =============================================================================
// Sends
// =============================================================================

#[test]
fn parse_send_with_multiple_clauses() {
    let script = parse("(procedure (P) (gEgo view: 120 loop: 2 cel: 0))");
    let Node::SendCall { target, params, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected send");
    };
    assert_eq!(target.token_name(), Some("gEgo"));
    assert_eq!(params.len(), 3);
    let Node::SendParam { selector, args, .. } = &params[0] else {
        panic!("expected send param");
    };
    assert_eq!(selector, "view");
    assert_eq!(args.len(), 1);
}

#[test]
fn parse_property_read() {
    let script = parse("(procedure (P) (return (gEgo loop?)))");
    let Node::Return {
        value: Some(value), ..
    } = &script.procedures[0].function.code[0]
    else {
        panic!("expected return");
    };
    let Node::SendCall { params, .. } = value.as_ref() else {
        panic!("expected send");
    };
    assert!(matches!(
        &params[0],
        Node::SendParam {
            is_property_read: true,
            ..
        }
    ));
}

#[test]
fn parse_send_to_expression_target() {
    let script = parse("(procedure (P) ((ScriptID 255 0) doit: 1))");
    let Node::SendCall { target, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected send");
    };
    assert!(matches!(
        target.as_ref(),
        Node::ProcedureCall { name, .. } if name == "ScriptID"
    ));
}

// =============================================================================
// Classes and instances
// =============================================================================

#[test]
fn parse_class_with_members() {
    let script = parse(
        "(class Door of Feature\n\
         \t(properties\n\
         \t\tlocked 0\n\
         \t\topenSound 0\n\
         \t)\n\
         \t(method (open)\n\
         \t\t(= locked 0)\n\
         \t)\n\
         )",
    );
    let class = &script.classes[0];
    assert_eq!(class.name, "Door");
    assert_eq!(class.superclass.as_deref(), Some("Feature"));
    assert!(!class.is_instance);
    assert_eq!(class.properties.len(), 2);
    assert_eq!(class.methods[0].name, "open");
}

#[test]
fn parse_instance() {
    let script = parse(
        "(instance frontDoor of Door (properties locked 1))",
    );
    let class = &script.classes[0];
    assert!(class.is_instance);
    assert_eq!(class.properties[0].name, "locked");
}

// =============================================================================
// Control flow and asm
// =============================================================================

#[test]
fn parse_nested_control_flow() {
    let script = parse(
        "(procedure (P x)\n\
         \t(while (< x 10)\n\
         \t\t(if (== x 5) (break) else (++ x))\n\
         \t)\n\
         )",
    );
    let Node::While { body, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected while");
    };
    let Node::If { then_branch, else_branch, .. } = &body[0] else {
        panic!("expected if");
    };
    assert!(matches!(&then_branch[0], Node::Break { levels: 1, .. }));
    assert!(else_branch.is_some());
}

#[test]
fn parse_for_loop() {
    let script = parse("(procedure (P &tmp i) (for ((= i 0)) (< i 4) ((++ i)) (Print i)))");
    let Node::For {
        init,
        step,
        body,
        ..
    } = &script.procedures[0].function.code[0]
    else {
        panic!("expected for");
    };
    assert_eq!(init.len(), 1);
    assert_eq!(step.len(), 1);
    assert_eq!(body.len(), 1);
}

#[test]
fn parse_asm_block() {
    let script = parse(
        "(procedure (P)\n\
         \t(asm\n\
         \t\t\tpushi 4\n\
         \t\ttop:\tlag gThing\n\
         \t\t\tbnt top\n\
         \t)\n\
         )",
    );
    let Node::Asm { body, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected asm");
    };
    assert_eq!(body.len(), 3);
    let Node::AsmStatement { label, opcode, .. } = &body[1] else {
        panic!("expected asm statement");
    };
    assert_eq!(label.as_deref(), Some("top"));
    assert_eq!(opcode, "lag");
}
