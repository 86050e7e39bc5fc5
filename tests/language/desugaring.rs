//! Integration tests for the lowering pass.
//!
//! Scripts coming out of `parse_script` are fully lowered: no
//! transient constructs survive, and running the pass again changes
//! nothing.

use quill_foundation::{LogCollector, ScriptId};
use quill_language::operators::BinaryOperator;
use quill_language::{Node, ParseOptions, Script, desugar, parse_script};

fn parse(source: &str) -> Script {
    parse_script(source, &ParseOptions::new("test.sc"), None).expect("valid script")
}

fn assert_no_transients(node: &Node) {
    assert!(
        !matches!(
            node,
            Node::Cond { .. } | Node::ForEach { .. } | Node::VerbClause { .. }
        ),
        "transient construct survived lowering: {node:?}"
    );
    if let Node::NaryOp { operands, .. } = node {
        assert!(operands.len() <= 2, "unlowered n-ary comparison: {node:?}");
    }
}

fn walk(nodes: &[Node], check: &mut dyn FnMut(&Node)) {
    for node in nodes {
        check(node);
        match node {
            Node::CodeBlock { body, .. }
            | Node::Asm { body, .. }
            | Node::While { body, .. }
            | Node::VerbClause { body, .. } => walk(body, check),
            Node::If {
                then_branch,
                else_branch,
                ..
            } => {
                walk(then_branch, check);
                if let Some(els) = else_branch {
                    walk(els, check);
                }
            }
            Node::For {
                init, step, body, ..
            } => {
                walk(init, check);
                walk(step, check);
                walk(body, check);
            }
            Node::Switch { cases, .. } | Node::Cond { clauses: cases, .. } => walk(cases, check),
            Node::Case { body, .. } => walk(body, check),
            _ => {}
        }
    }
}

// =============================================================================
// Cond and switchto
// =============================================================================

#[test]
fn cond_becomes_if_chain() {
    let script = parse(
        "(procedure (Classify x)\n\
         \t(cond\n\
         \t\t((< x 10) (return 0))\n\
         \t\t((< x 100) (return 1))\n\
         \t\t(else (return 2))\n\
         \t)\n\
         )",
    );
    let Node::If { else_branch, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected if-chain");
    };
    let Node::If {
        else_branch: innermost,
        ..
    } = &else_branch.as_ref().expect("chain")[0]
    else {
        panic!("expected nested if");
    };
    assert!(matches!(
        innermost.as_ref().expect("default")[0],
        Node::Return { .. }
    ));
}

#[test]
fn switchto_cases_are_numbered() {
    let script = parse(
        "(procedure (P x)\n\
         \t(switchto x\n\
         \t\t((Print 100))\n\
         \t\t((Print 101))\n\
         \t\t((Print 102))\n\
         \t)\n\
         )",
    );
    let Node::Switch { cases, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected switch");
    };
    let numbers: Vec<Option<&str>> = cases
        .iter()
        .map(|case| {
            let Node::Case {
                value: Some(value), ..
            } = case
            else {
                return None;
            };
            match value.as_ref() {
                Node::Value(v) => Some(match v.kind {
                    quill_language::ValueKind::Number(0) => "0",
                    quill_language::ValueKind::Number(1) => "1",
                    quill_language::ValueKind::Number(2) => "2",
                    _ => "?",
                }),
                _ => None,
            }
        })
        .collect();
    assert_eq!(numbers, vec![Some("0"), Some("1"), Some("2")]);
}

// =============================================================================
// Foreach
// =============================================================================

#[test]
fn foreach_over_array_bounds_by_sizeof() {
    let script = parse(
        "(local [inventory 6])\n\
         (procedure (ShowAll)\n\
         \t(foreach item inventory (Print item))\n\
         )",
    );
    let function = &script.procedures[0].function;
    let Node::For { condition, body, .. } = &function.code[0] else {
        panic!("expected for loop");
    };
    let Node::BinaryOp {
        operator: BinaryOperator::LessThan,
        right,
        ..
    } = condition.as_ref()
    else {
        panic!("expected bounds check");
    };
    assert!(matches!(
        right.as_ref(),
        Node::Value(v) if matches!(&v.kind, quill_language::ValueKind::ArraySize(name) if name == "inventory")
    ));
    // The iteration variable is gone; only the shadow remains.
    let mut free = false;
    walk(body, &mut |node| {
        if node.token_name() == Some("item") {
            free = true;
        }
    });
    assert!(!free, "iteration variable still free in body");
}

#[test]
fn foreach_over_object_walks_nodes() {
    let script = parse("(procedure (P) (foreach obj gCast (obj doit:)))");
    let Node::CodeBlock { body, .. } = &script.procedures[0].function.code[0] else {
        panic!("expected wrapper block");
    };
    assert!(matches!(
        &body[0],
        Node::Assignment { value, .. }
            if matches!(value.as_ref(), Node::ProcedureCall { name, .. } if name == "FirstNode")
    ));
    assert!(matches!(&body[1], Node::While { .. }));
}

// =============================================================================
// Verb handlers and whole-script sweep
// =============================================================================

#[test]
fn verb_clauses_become_do_verb() {
    let script = parse(
        "(instance window of Feature\n\
         \t(properties x 5)\n\
         \t(verbs (look (Print 200)))\n\
         )",
    );
    let class = &script.classes[0];
    assert!(class.verb_handlers.is_empty());
    let do_verb = class
        .methods
        .iter()
        .find(|m| m.name == "doVerb")
        .expect("synthesized doVerb");
    let Node::Switch { value, cases, .. } = &do_verb.code[0] else {
        panic!("expected switch");
    };
    assert_eq!(value.token_name(), Some("theVerb"));
    assert!(matches!(
        cases.last(),
        Some(Node::Case {
            is_default: true,
            ..
        })
    ));
}

#[test]
fn lowered_scripts_carry_no_transients() {
    let script = parse(
        "(local [items 3])\n\
         (procedure (P x)\n\
         \t(cond ((== x 1) (Print 1)) (else (Print 2)))\n\
         \t(foreach i items (Print i))\n\
         \t(if (< 1 x 10) (Print 3))\n\
         \t(switchto x ((Print 4)) ((Print 5)))\n\
         )\n\
         (instance thing of Obj (verbs (take (Print 6))))",
    );
    for procedure in &script.procedures {
        walk(&procedure.function.code, &mut assert_no_transients);
    }
    for class in &script.classes {
        assert!(class.verb_handlers.is_empty());
        for method in &class.methods {
            walk(&method.code, &mut assert_no_transients);
        }
    }
}

#[test]
fn lowering_is_idempotent() {
    let mut script = parse(
        "(local [items 3])\n\
         (public P 0)\n\
         (procedure (P x)\n\
         \t(foreach i items (Print i))\n\
         \t(cond ((== x 1) (Print 1)))\n\
         )",
    );
    let before = script.clone();
    let mut log = LogCollector::new();
    desugar(&mut script, &ScriptId::new("test.sc"), Some(&mut log));
    assert_eq!(script, before);
    assert!(log.errors().is_empty());
}
