//! Post-parse lowering.
//!
//! Runs once after a successful parse and removes every transient
//! construct: `cond` becomes an if-chain, `switchto` cases get
//! numbered, `foreach` becomes a counted `for` or a linked-list
//! `while`, verb clauses become a synthesized `doVerb` method, and
//! n-ary comparisons become `and` chains. Exports are propagated onto
//! the things they name, and the inert compatibility sections warn.
//!
//! Every transform is idempotent on input already free of its
//! construct, and a malformed piece never aborts the pass: it is
//! dropped or left alone with a diagnostic.

use crate::ast::{
    ClassDecl, Function, LValue, Node, Script, Value, ValueKind, VariableDecl,
};
use crate::operators::{BinaryOperator, UnaryOperator};
use crate::operators::AssignmentOperator;
use crate::span::Position;
use quill_foundation::{CompileLog, Diagnostic, ScriptId};
use std::collections::HashSet;

/// Lowers all transient constructs in a parsed script.
pub fn desugar(script: &mut Script, script_id: &ScriptId, log: Option<&mut dyn CompileLog>) {
    let mut pass = Desugarer {
        script_id: script_id.clone(),
        log,
        counter: 0,
        script_vars: script.variables.iter().map(|v| v.name.clone()).collect(),
    };
    pass.propagate_exports(script);
    for class in &mut script.classes {
        pass.expand_verb_handlers(class);
    }
    for procedure in &mut script.procedures {
        pass.lower_function(&mut procedure.function);
    }
    for class in &mut script.classes {
        for method in &mut class.methods {
            pass.lower_function(method);
        }
        for procedure in &mut class.procedures {
            pass.lower_function(&mut procedure.function);
        }
    }
    pass.compatibility_warnings(script);
}

/// Names introduced per function while lowering.
struct FnScope {
    declared: HashSet<String>,
    new_temps: Vec<VariableDecl>,
}

impl FnScope {
    fn add_temp(&mut self, name: &str, pos: Position) {
        self.declared.insert(name.to_string());
        self.new_temps.push(VariableDecl::scalar(name, pos));
    }
}

/// How to rewrite occurrences of a foreach iteration variable.
enum Rewrite<'r> {
    /// Rename the variable to its shadow copy.
    Rename { from: &'r str, to: &'r str },
    /// Replace the variable with `collection[index]`.
    Index {
        from: &'r str,
        collection: &'r str,
        index: &'r str,
    },
}

struct Desugarer<'a> {
    script_id: ScriptId,
    log: Option<&'a mut dyn CompileLog>,
    counter: u32,
    script_vars: HashSet<String>,
}

impl Desugarer<'_> {
    fn warn(&mut self, message: impl Into<String>, pos: Position) {
        if let Some(log) = &mut self.log {
            log.report(Diagnostic::warning(
                message,
                self.script_id.clone(),
                pos.line,
                pos.column,
            ));
        }
    }

    fn error(&mut self, message: impl Into<String>, pos: Position) {
        if let Some(log) = &mut self.log {
            log.report(Diagnostic::error(
                message,
                self.script_id.clone(),
                pos.line,
                pos.column,
            ));
        }
    }

    /// A fresh name suffix: A, B, … Z, AA, AB, …
    fn next_suffix(&mut self) -> String {
        let mut n = self.counter;
        self.counter += 1;
        let mut suffix = String::new();
        loop {
            suffix.insert(0, char::from(b'A' + u8::try_from(n % 26).unwrap_or(0)));
            n /= 26;
            if n == 0 {
                break;
            }
            n -= 1;
        }
        suffix
    }

    // ---- exports ---------------------------------------------------

    fn propagate_exports(&mut self, script: &mut Script) {
        let entries = script.exports.clone();
        for entry in entries {
            let mut found = false;
            for procedure in &mut script.procedures {
                if procedure.function.name == entry.name {
                    procedure.is_public = true;
                    found = true;
                }
            }
            for class in &mut script.classes {
                if class.name == entry.name {
                    class.is_public = true;
                    found = true;
                }
            }
            if !found {
                self.error(
                    format!("Export not found in this script: {}", entry.name),
                    entry.pos,
                );
            }
        }
    }

    // ---- verb handlers ---------------------------------------------

    /// Builds one `doVerb` method per class with verb clauses: a
    /// switch on `theVerb` keyed by each clause's first verb, with a
    /// default case deferring to `super`.
    fn expand_verb_handlers(&mut self, class: &mut ClassDecl) {
        if class.verb_handlers.is_empty() {
            return;
        }
        let handlers = std::mem::take(&mut class.verb_handlers);
        if class.methods.iter().any(|m| m.name == "doVerb") {
            self.warn(
                "doVerb is already defined; verb clauses ignored",
                class.pos,
            );
            return;
        }
        let pos = handlers[0].pos;
        let mut cases = Vec::new();
        for handler in handlers {
            if handler.verbs.len() > 1 {
                self.warn(
                    format!(
                        "A verb clause handles one verb; using \"{}\" only",
                        handler.verbs[0]
                    ),
                    handler.pos,
                );
            }
            let Some(first) = handler.verbs.first() else {
                continue;
            };
            cases.push(Node::Case {
                value: Some(Box::new(token_node(first, handler.pos))),
                is_default: false,
                body: handler.code,
                pos: handler.pos,
            });
        }
        cases.push(Node::Case {
            value: None,
            is_default: true,
            body: vec![Node::SendCall {
                target: Box::new(token_node("super", pos)),
                params: vec![Node::SendParam {
                    selector: "doVerb".to_string(),
                    args: vec![token_node("theVerb", pos), Node::Rest {
                        parameter: None,
                        pos,
                    }],
                    is_property_read: false,
                    pos,
                }],
                pos,
            }],
            pos,
        });
        class.methods.push(Function {
            name: "doVerb".to_string(),
            params: vec!["theVerb".to_string()],
            temps: Vec::new(),
            code: vec![Node::Switch {
                value: Box::new(token_node("theVerb", pos)),
                cases,
                auto_number: false,
                pos,
            }],
            pos,
        });
    }

    // ---- per-function lowering -------------------------------------

    fn lower_function(&mut self, function: &mut Function) {
        let mut scope = FnScope {
            declared: self
                .script_vars
                .iter()
                .cloned()
                .chain(function.temps.iter().map(|t| t.name.clone()))
                .collect(),
            new_temps: Vec::new(),
        };
        let mut code = std::mem::take(&mut function.code);
        for node in &mut code {
            self.transform(node, &mut scope);
        }
        function.code = code;
        function.temps.extend(scope.new_temps);
    }

    /// Post-order: children first, so nested transient constructs are
    /// gone before their parent is lowered.
    fn transform(&mut self, node: &mut Node, scope: &mut FnScope) {
        match node {
            Node::CodeBlock { body, .. }
            | Node::Asm { body, .. }
            | Node::VerbClause { body, .. } => {
                for child in body {
                    self.transform(child, scope);
                }
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.transform(condition, scope);
                for child in then_branch {
                    self.transform(child, scope);
                }
                if let Some(els) = else_branch {
                    for child in els {
                        self.transform(child, scope);
                    }
                }
            }
            Node::While {
                condition, body, ..
            } => {
                self.transform(condition, scope);
                for child in body {
                    self.transform(child, scope);
                }
            }
            Node::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                for child in init {
                    self.transform(child, scope);
                }
                self.transform(condition, scope);
                for child in step {
                    self.transform(child, scope);
                }
                for child in body {
                    self.transform(child, scope);
                }
            }
            Node::ForEach {
                collection, body, ..
            } => {
                self.transform(collection, scope);
                for child in body {
                    self.transform(child, scope);
                }
            }
            Node::Switch { value, cases, .. } => {
                self.transform(value, scope);
                for case in cases {
                    self.transform(case, scope);
                }
            }
            Node::Cond { clauses, .. } => {
                for clause in clauses {
                    self.transform(clause, scope);
                }
            }
            Node::Case { value, body, .. } => {
                if let Some(value) = value {
                    self.transform(value, scope);
                }
                for child in body {
                    self.transform(child, scope);
                }
            }
            Node::Return { value, .. } => {
                if let Some(value) = value {
                    self.transform(value, scope);
                }
            }
            Node::AsmStatement { operands, .. } => {
                for child in operands {
                    self.transform(child, scope);
                }
            }
            Node::Assignment { target, value, .. } => {
                if let Some(index) = &mut target.indexer {
                    self.transform(index, scope);
                }
                self.transform(value, scope);
            }
            Node::BinaryOp { left, right, .. } => {
                self.transform(left, scope);
                self.transform(right, scope);
            }
            Node::UnaryOp { operand, .. } => self.transform(operand, scope),
            Node::NaryOp { operands, .. } => {
                for child in operands {
                    self.transform(child, scope);
                }
            }
            Node::SendCall { target, params, .. } => {
                self.transform(target, scope);
                for param in params {
                    self.transform(param, scope);
                }
            }
            Node::SendParam { args, .. } | Node::ProcedureCall { args, .. } => {
                for child in args {
                    self.transform(child, scope);
                }
            }
            Node::Value(value) => {
                if let Some(index) = &mut value.indexer {
                    self.transform(index, scope);
                }
            }
            Node::LValue(lvalue) => {
                if let Some(index) = &mut lvalue.indexer {
                    self.transform(index, scope);
                }
            }
            Node::Break { .. } | Node::Continue { .. } | Node::Rest { .. } => {}
        }

        match node {
            Node::ForEach { .. } => {
                let pos = node.position();
                let taken = std::mem::replace(node, Node::CodeBlock {
                    body: Vec::new(),
                    pos,
                });
                *node = self.lower_foreach(taken, scope);
            }
            Node::Cond { .. } => {
                let pos = node.position();
                let taken = std::mem::replace(node, Node::CodeBlock {
                    body: Vec::new(),
                    pos,
                });
                *node = self.fold_cond(taken);
            }
            Node::Switch {
                cases, auto_number, ..
            } => {
                if *auto_number {
                    number_switchto(cases);
                    *auto_number = false;
                }
            }
            Node::NaryOp { operands, .. } if operands.len() > 2 => {
                let pos = node.position();
                let taken = std::mem::replace(node, Node::CodeBlock {
                    body: Vec::new(),
                    pos,
                });
                *node = lower_comparison(taken);
            }
            _ => {}
        }
    }

    // ---- foreach ---------------------------------------------------

    fn lower_foreach(&mut self, node: Node, scope: &mut FnScope) -> Node {
        let Node::ForEach {
            variable,
            by_reference,
            collection,
            mut body,
            pos,
        } = node
        else {
            return node;
        };
        let collection_name = match collection.as_ref() {
            Node::Value(value) if value.indexer.is_none() && !value.is_pointer => {
                value.token_name().map(str::to_string)
            }
            _ => None,
        };
        let Some(collection_name) = collection_name else {
            self.error("The collection must be a temp or local array.", pos);
            return Node::CodeBlock {
                body: Vec::new(),
                pos,
            };
        };
        if let Some(jump_pos) = find_level_jump(&body) {
            self.warn(
                "A break or continue level inside a foreach also counts the generated loop.",
                jump_pos,
            );
        }
        let suffix = self.next_suffix();
        if scope.declared.contains(&collection_name) {
            self.lower_array_foreach(
                &variable,
                by_reference,
                &collection_name,
                &suffix,
                &mut body,
                pos,
                scope,
            );
            let index = format!("i_{suffix}");
            Node::For {
                init: vec![assign_node(&index, Node::Value(Value::number(0, pos)), pos)],
                condition: Box::new(Node::BinaryOp {
                    operator: BinaryOperator::LessThan,
                    left: Box::new(token_node(&index, pos)),
                    right: Box::new(Node::Value(Value::new(
                        ValueKind::ArraySize(collection_name),
                        pos,
                    ))),
                    pos,
                }),
                step: vec![Node::UnaryOp {
                    operator: UnaryOperator::Increment,
                    operand: Box::new(token_node(&index, pos)),
                    pos,
                }],
                body,
                pos,
            }
        } else {
            self.lower_list_foreach(&variable, &collection_name, &suffix, body, pos, scope)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn lower_array_foreach(
        &mut self,
        variable: &str,
        by_reference: bool,
        collection: &str,
        suffix: &str,
        body: &mut Vec<Node>,
        pos: Position,
        scope: &mut FnScope,
    ) {
        let index = format!("i_{suffix}");
        scope.add_temp(&index, pos);
        if by_reference {
            let rewrite = Rewrite::Index {
                from: variable,
                collection,
                index: &index,
            };
            for node in body.iter_mut() {
                self.rewrite(node, &rewrite);
            }
        } else {
            let shadow = format!("{variable}__{suffix}");
            scope.add_temp(&shadow, pos);
            let rewrite = Rewrite::Rename {
                from: variable,
                to: &shadow,
            };
            for node in body.iter_mut() {
                self.rewrite(node, &rewrite);
            }
            let mut element = Value::token(collection, pos);
            element.indexer = Some(Box::new(token_node(&index, pos)));
            body.insert(0, assign_node(&shadow, Node::Value(element), pos));
        }
    }

    /// An undeclared collection is assumed to be a list object: walk
    /// it with FirstNode/NextNode/NodeValue. The next pointer is
    /// fetched before the body runs, so removing the current node from
    /// the list mid-iteration stays safe.
    fn lower_list_foreach(
        &mut self,
        variable: &str,
        collection: &str,
        suffix: &str,
        body: Vec<Node>,
        pos: Position,
        scope: &mut FnScope,
    ) -> Node {
        let cur = format!("curNode_{suffix}");
        let next = format!("nextNode_{suffix}");
        let shadow = format!("{variable}__{suffix}");
        scope.add_temp(&cur, pos);
        scope.add_temp(&next, pos);
        scope.add_temp(&shadow, pos);

        let mut loop_body = vec![
            assign_node(
                &next,
                Node::ProcedureCall {
                    name: "NextNode".to_string(),
                    args: vec![token_node(&cur, pos)],
                    pos,
                },
                pos,
            ),
            assign_node(
                &shadow,
                Node::ProcedureCall {
                    name: "NodeValue".to_string(),
                    args: vec![token_node(&cur, pos)],
                    pos,
                },
                pos,
            ),
            assign_node(&cur, token_node(&next, pos), pos),
        ];
        let rewrite = Rewrite::Rename {
            from: variable,
            to: &shadow,
        };
        let mut body = body;
        for node in &mut body {
            self.rewrite(node, &rewrite);
        }
        loop_body.extend(body);

        let seed = assign_node(
            &cur,
            Node::ProcedureCall {
                name: "FirstNode".to_string(),
                args: vec![Node::SendCall {
                    target: Box::new(token_node(collection, pos)),
                    params: vec![Node::SendParam {
                        selector: "elements".to_string(),
                        args: Vec::new(),
                        is_property_read: true,
                        pos,
                    }],
                    pos,
                }],
                pos,
            },
            pos,
        );
        Node::CodeBlock {
            body: vec![
                seed,
                Node::While {
                    condition: Box::new(token_node(&cur, pos)),
                    body: loop_body,
                    pos,
                },
            ],
            pos,
        }
    }

    /// Rewrites free occurrences of the iteration variable throughout
    /// a lowered foreach body: lvalues, value tokens, and send targets
    /// alike.
    fn rewrite(&mut self, node: &mut Node, rewrite: &Rewrite<'_>) {
        match node {
            Node::CodeBlock { body, .. }
            | Node::Asm { body, .. }
            | Node::VerbClause { body, .. } => {
                for child in body {
                    self.rewrite(child, rewrite);
                }
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.rewrite(condition, rewrite);
                for child in then_branch {
                    self.rewrite(child, rewrite);
                }
                if let Some(els) = else_branch {
                    for child in els {
                        self.rewrite(child, rewrite);
                    }
                }
            }
            Node::While {
                condition, body, ..
            } => {
                self.rewrite(condition, rewrite);
                for child in body {
                    self.rewrite(child, rewrite);
                }
            }
            Node::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                for child in init {
                    self.rewrite(child, rewrite);
                }
                self.rewrite(condition, rewrite);
                for child in step {
                    self.rewrite(child, rewrite);
                }
                for child in body {
                    self.rewrite(child, rewrite);
                }
            }
            Node::ForEach {
                collection, body, ..
            } => {
                self.rewrite(collection, rewrite);
                for child in body {
                    self.rewrite(child, rewrite);
                }
            }
            Node::Switch { value, cases, .. } => {
                self.rewrite(value, rewrite);
                for case in cases {
                    self.rewrite(case, rewrite);
                }
            }
            Node::Cond { clauses, .. } => {
                for clause in clauses {
                    self.rewrite(clause, rewrite);
                }
            }
            Node::Case { value, body, .. } => {
                if let Some(value) = value {
                    self.rewrite(value, rewrite);
                }
                for child in body {
                    self.rewrite(child, rewrite);
                }
            }
            Node::Return { value, .. } => {
                if let Some(value) = value {
                    self.rewrite(value, rewrite);
                }
            }
            Node::AsmStatement { operands, .. } => {
                for child in operands {
                    self.rewrite(child, rewrite);
                }
            }
            Node::Assignment { target, value, .. } => {
                self.rewrite_lvalue(target, rewrite);
                self.rewrite(value, rewrite);
            }
            Node::BinaryOp { left, right, .. } => {
                self.rewrite(left, rewrite);
                self.rewrite(right, rewrite);
            }
            Node::UnaryOp { operand, .. } => self.rewrite(operand, rewrite),
            Node::NaryOp { operands, .. } => {
                for child in operands {
                    self.rewrite(child, rewrite);
                }
            }
            Node::SendCall { target, params, .. } => {
                self.rewrite(target, rewrite);
                for param in params {
                    self.rewrite(param, rewrite);
                }
            }
            Node::SendParam { args, .. } | Node::ProcedureCall { args, .. } => {
                for child in args {
                    self.rewrite(child, rewrite);
                }
            }
            Node::Value(value) => {
                if let Some(index) = &mut value.indexer {
                    self.rewrite(index, rewrite);
                }
                self.rewrite_value(value, rewrite);
            }
            Node::LValue(lvalue) => self.rewrite_lvalue(lvalue, rewrite),
            Node::Break { .. } | Node::Continue { .. } | Node::Rest { .. } => {}
        }
    }

    fn rewrite_value(&mut self, value: &mut Value, rewrite: &Rewrite<'_>) {
        let (from, pos) = match (&value.kind, rewrite) {
            (ValueKind::Token(name), Rewrite::Rename { from, .. } | Rewrite::Index { from, .. })
                if name == from =>
            {
                (*from, value.pos)
            }
            _ => return,
        };
        if value.indexer.is_some() {
            self.error("An iteration variable can not be indexed.", pos);
            return;
        }
        let _ = from;
        match rewrite {
            Rewrite::Rename { to, .. } => value.kind = ValueKind::Token((*to).to_string()),
            Rewrite::Index {
                collection, index, ..
            } => {
                value.kind = ValueKind::Token((*collection).to_string());
                value.indexer = Some(Box::new(token_node(index, pos)));
            }
        }
    }

    fn rewrite_lvalue(&mut self, lvalue: &mut LValue, rewrite: &Rewrite<'_>) {
        if let Some(index) = &mut lvalue.indexer {
            self.rewrite(index, rewrite);
        }
        let matches = match rewrite {
            Rewrite::Rename { from, .. } | Rewrite::Index { from, .. } => lvalue.name == *from,
        };
        if !matches {
            return;
        }
        if lvalue.indexer.is_some() {
            self.error("An iteration variable can not be indexed.", lvalue.pos);
            return;
        }
        match rewrite {
            Rewrite::Rename { to, .. } => lvalue.name = (*to).to_string(),
            Rewrite::Index {
                collection, index, ..
            } => {
                lvalue.name = (*collection).to_string();
                lvalue.indexer = Some(Box::new(token_node(index, lvalue.pos)));
            }
        }
    }

    // ---- cond ------------------------------------------------------

    /// Right-to-left fold into an if-chain. A trailing default seeds
    /// the innermost else; a default anywhere else is diagnosed and
    /// that clause and everything before it is discarded.
    fn fold_cond(&mut self, node: Node) -> Node {
        let Node::Cond { clauses, pos } = node else {
            return node;
        };
        let last = clauses.len().saturating_sub(1);
        let mut acc: Option<Vec<Node>> = None;
        for (i, clause) in clauses.into_iter().enumerate().rev() {
            let Node::Case {
                value,
                is_default,
                body,
                pos: clause_pos,
            } = clause
            else {
                continue;
            };
            if is_default {
                if i == last {
                    acc = Some(body);
                    continue;
                }
                self.error("The else clause must be the last clause in a cond.", clause_pos);
                break;
            }
            let condition = value.unwrap_or_else(|| {
                Box::new(Node::Value(Value::number(1, clause_pos)))
            });
            acc = Some(vec![Node::If {
                condition,
                then_branch: body,
                else_branch: acc,
                pos: clause_pos,
            }]);
        }
        match acc {
            Some(mut nodes) if nodes.len() == 1 => nodes.pop().unwrap_or(Node::CodeBlock {
                body: Vec::new(),
                pos,
            }),
            Some(nodes) => Node::CodeBlock { body: nodes, pos },
            None => Node::CodeBlock {
                body: Vec::new(),
                pos,
            },
        }
    }

    // ---- compatibility warnings ------------------------------------

    fn compatibility_warnings(&mut self, script: &Script) {
        if let Some(first) = script.externs.first() {
            self.warn("extern ignored - not implemented", first.pos);
        }
        if let Some(first) = script.globals.first() {
            self.warn("global ignored - not implemented", first.decl.pos);
        }
        if let Some(first) = script.class_defs.first() {
            self.warn("classdef ignored - not implemented", first.pos);
        }
        if let Some(first) = script.selectors.first() {
            self.warn("selectors ignored - not implemented", first.pos);
        }
        if !script.procedure_forwards.is_empty() {
            self.warn(
                "procedure forward declaration ignored - not implemented",
                Position::at_start(),
            );
        }
        for class in &script.classes {
            if !class.method_forwards.is_empty() {
                self.warn("methods forward declaration ignored - not implemented", class.pos);
            }
        }
    }
}

/// Numbers switchto cases 0, 1, 2, … in source order, but only when
/// every case is unvalued and non-default.
fn number_switchto(cases: &mut [Node]) {
    let eligible = cases.iter().all(|case| {
        matches!(
            case,
            Node::Case {
                value: None,
                is_default: false,
                ..
            }
        )
    });
    if !eligible {
        return;
    }
    for (i, case) in cases.iter_mut().enumerate() {
        if let Node::Case { value, pos, .. } = case {
            *value = Some(Box::new(Node::Value(Value::number(
                u16::try_from(i).unwrap_or(u16::MAX),
                *pos,
            ))));
        }
    }
}

/// Lowers `(< a b c)` to `(and (< a b) (< b c))`; middle operands are
/// duplicated, so side-effecting middles evaluate twice.
fn lower_comparison(node: Node) -> Node {
    let Node::NaryOp {
        operator,
        operands,
        pos,
    } = node
    else {
        return node;
    };
    let mut pairs = operands
        .windows(2)
        .map(|pair| Node::BinaryOp {
            operator,
            left: Box::new(pair[0].clone()),
            right: Box::new(pair[1].clone()),
            pos,
        })
        .collect::<Vec<_>>();
    let mut iter = pairs.drain(..);
    let Some(mut acc) = iter.next() else {
        return Node::Value(Value::number(1, pos));
    };
    for next in iter {
        acc = Node::BinaryOp {
            operator: BinaryOperator::LogicalAnd,
            left: Box::new(acc),
            right: Box::new(next),
            pos,
        };
    }
    acc
}

/// First `break`/`continue` with an explicit level count, if any.
/// Level counts written against the source nesting can land on the
/// wrong loop once foreach inserts a loop of its own.
fn find_level_jump(nodes: &[Node]) -> Option<Position> {
    for node in nodes {
        let found = match node {
            Node::Break { levels, pos } | Node::Continue { levels, pos } => {
                if *levels > 1 {
                    Some(*pos)
                } else {
                    None
                }
            }
            Node::CodeBlock { body, .. }
            | Node::Asm { body, .. }
            | Node::VerbClause { body, .. }
            | Node::ForEach { body, .. } => find_level_jump(body),
            Node::If {
                then_branch,
                else_branch,
                ..
            } => find_level_jump(then_branch)
                .or_else(|| else_branch.as_deref().and_then(find_level_jump)),
            Node::While { body, .. } => find_level_jump(body),
            Node::For { body, .. } => find_level_jump(body),
            Node::Switch { cases, .. } => find_level_jump(cases),
            Node::Cond { clauses, .. } => find_level_jump(clauses),
            Node::Case { body, .. } => find_level_jump(body),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn token_node(name: &str, pos: Position) -> Node {
    Node::Value(Value::token(name, pos))
}

fn assign_node(target: &str, value: Node, pos: Position) -> Node {
    Node::Assignment {
        operator: AssignmentOperator::Assign,
        target: LValue::new(target, pos),
        value: Box::new(value),
        pos,
    }
}
