//! Abstract syntax tree for game scripts.
//!
//! Everything is a closed tagged sum and every node exclusively owns
//! its children, so a whole `Script` can be moved, cloned, or rewritten
//! without aliasing concerns. A few variants are transient: the grammar
//! produces them but [`desugar`](crate::desugar::desugar) lowers them
//! away, so later stages never see a `ForEach`, `Cond`, `NaryOp`, or
//! `VerbClause`.

use crate::operators::{AssignmentOperator, BinaryOperator, UnaryOperator};
use crate::span::Position;

/// A complex property value: the atoms of the language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    /// What kind of atom this is.
    pub kind: ValueKind,
    /// True if prefixed with `@` (address-of).
    pub is_pointer: bool,
    /// Optional `[expr]` index applied to a token.
    pub indexer: Option<Box<Node>>,
    /// Where the value began.
    pub pos: Position,
}

impl Value {
    /// Creates a plain (non-pointer, non-indexed) value.
    #[must_use]
    pub fn new(kind: ValueKind, pos: Position) -> Self {
        Self {
            kind,
            is_pointer: false,
            indexer: None,
            pos,
        }
    }

    /// Creates a plain number value.
    #[must_use]
    pub fn number(n: u16, pos: Position) -> Self {
        Self::new(ValueKind::Number(n), pos)
    }

    /// Creates a plain token (variable/class/define name) value.
    #[must_use]
    pub fn token(name: impl Into<String>, pos: Position) -> Self {
        Self::new(ValueKind::Token(name.into()), pos)
    }

    /// The token name, if this value is a plain token.
    #[must_use]
    pub fn token_name(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Token(name) => Some(name),
            _ => None,
        }
    }
}

/// The payload of a [`Value`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// A 16-bit machine word.
    Number(u16),
    /// A quoted or brace string.
    String(String),
    /// A word-pattern (Said) string.
    Said(String),
    /// A variable, define, or class name, resolved later.
    Token(String),
    /// A `#selector` literal.
    Selector(String),
    /// `&sizeof name`, the declared element count of an array.
    ArraySize(String),
    /// `argc`, the number of parameters the caller passed.
    ParamTotal,
}

/// An assignment target: a variable, optionally indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LValue {
    /// Variable name.
    pub name: String,
    /// Optional `[expr]` index.
    pub indexer: Option<Box<Node>>,
    /// Where the lvalue began.
    pub pos: Position,
}

impl LValue {
    /// Creates an un-indexed lvalue.
    #[must_use]
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            indexer: None,
            pos,
        }
    }
}

/// A statement or expression. The language does not distinguish the
/// two; any node may appear where a value is expected and yields the
/// accumulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// A parenthesized group of statements; yields the last one.
    CodeBlock {
        /// Statements in order.
        body: Vec<Node>,
        /// Where the block began.
        pos: Position,
    },
    /// `(if cond then… else else…)`.
    If {
        /// Controlling condition.
        condition: Box<Node>,
        /// Statements when the condition holds.
        then_branch: Vec<Node>,
        /// Statements for the `else` clause, when present.
        else_branch: Option<Vec<Node>>,
        /// Where the statement began.
        pos: Position,
    },
    /// `(while cond body…)`.
    While {
        /// Loop condition.
        condition: Box<Node>,
        /// Loop body.
        body: Vec<Node>,
        /// Where the statement began.
        pos: Position,
    },
    /// `(for (init…) cond (step…) body…)`.
    For {
        /// Initializer statements.
        init: Vec<Node>,
        /// Loop condition.
        condition: Box<Node>,
        /// Per-iteration step statements.
        step: Vec<Node>,
        /// Loop body.
        body: Vec<Node>,
        /// Where the statement began.
        pos: Position,
    },
    /// `(foreach var collection body…)`. Transient; lowered to `For` or
    /// `While` before the tree leaves the parser.
    ForEach {
        /// Iteration variable name.
        variable: String,
        /// True for `foreach &var`, which rewrites uses in place
        /// instead of copying each element.
        by_reference: bool,
        /// The collection expression.
        collection: Box<Node>,
        /// Loop body.
        body: Vec<Node>,
        /// Where the statement began.
        pos: Position,
    },
    /// `(switch value cases…)`.
    Switch {
        /// The switched-on value.
        value: Box<Node>,
        /// Case clauses, in source order. Each is a [`Node::Case`].
        cases: Vec<Node>,
        /// True if written `switchto`, which numbers the cases.
        auto_number: bool,
        /// Where the statement began.
        pos: Position,
    },
    /// `(cond clauses…)`. Transient; lowered to an if-chain.
    Cond {
        /// Condition clauses, in source order. Each is a [`Node::Case`].
        clauses: Vec<Node>,
        /// Where the statement began.
        pos: Position,
    },
    /// One clause of a `switch`, `switchto`, or `cond`.
    Case {
        /// The case guard. None for a `switchto` case (numbered later)
        /// or a default clause.
        value: Option<Box<Node>>,
        /// True for an `(else …)` clause.
        is_default: bool,
        /// Clause body.
        body: Vec<Node>,
        /// Where the clause began.
        pos: Position,
    },
    /// `(break)` / `(break n)`.
    Break {
        /// How many enclosing loops to exit. 1 is the innermost.
        levels: u16,
        /// Where the statement began.
        pos: Position,
    },
    /// `(continue)` / `(continue n)`.
    Continue {
        /// How many enclosing loops to skip out through.
        levels: u16,
        /// Where the statement began.
        pos: Position,
    },
    /// `(return)` / `(return value)`.
    Return {
        /// The returned value, when present.
        value: Option<Box<Node>>,
        /// Where the statement began.
        pos: Position,
    },
    /// `(asm instructions…)`.
    Asm {
        /// Instructions in order. Each is a [`Node::AsmStatement`].
        body: Vec<Node>,
        /// Where the block began.
        pos: Position,
    },
    /// One raw VM instruction inside an `asm` block.
    AsmStatement {
        /// Optional jump-target label declared on this line.
        label: Option<String>,
        /// Opcode mnemonic, e.g. `lag` or `le?`.
        opcode: String,
        /// Comma-separated operands.
        operands: Vec<Node>,
        /// Where the instruction began.
        pos: Position,
    },
    /// `(= target value)` and compound forms.
    Assignment {
        /// Which assignment operator.
        operator: AssignmentOperator,
        /// The assigned-to variable.
        target: LValue,
        /// The assigned value.
        value: Box<Node>,
        /// Where the statement began.
        pos: Position,
    },
    /// A two-operand operation.
    BinaryOp {
        /// Which operator.
        operator: BinaryOperator,
        /// Left operand.
        left: Box<Node>,
        /// Right operand.
        right: Box<Node>,
        /// Where the expression began.
        pos: Position,
    },
    /// A one-operand operation.
    UnaryOp {
        /// Which operator.
        operator: UnaryOperator,
        /// The operand.
        operand: Box<Node>,
        /// Where the expression began.
        pos: Position,
    },
    /// An n-ary comparison such as `(< a b c)`. Transient; lowered to
    /// an `and` chain of binary comparisons.
    NaryOp {
        /// Which comparison operator.
        operator: BinaryOperator,
        /// Three or more operands.
        operands: Vec<Node>,
        /// Where the expression began.
        pos: Position,
    },
    /// `(target sel: args… sel2: args…)` or `(target prop?)`.
    SendCall {
        /// The receiving object. A token value for named targets
        /// (including `self` and `super`), or any expression.
        target: Box<Node>,
        /// Selector clauses in order. Each is a [`Node::SendParam`].
        params: Vec<Node>,
        /// Where the send began.
        pos: Position,
    },
    /// One `sel: args…` clause of a send.
    SendParam {
        /// Selector name, without the `:` or `?`.
        selector: String,
        /// Arguments to the selector.
        args: Vec<Node>,
        /// True for a `prop?` property read.
        is_property_read: bool,
        /// Where the clause began.
        pos: Position,
    },
    /// `(Name args…)` where `Name` is not followed by a selector.
    ProcedureCall {
        /// Procedure (or kernel) name.
        name: String,
        /// Arguments in order.
        args: Vec<Node>,
        /// Where the call began.
        pos: Position,
    },
    /// `&rest` / `&rest param`: forward the caller's remaining
    /// arguments, optionally starting at a named parameter.
    Rest {
        /// Starting parameter name, when given.
        parameter: Option<String>,
        /// Where the expression began.
        pos: Position,
    },
    /// An atom.
    Value(Value),
    /// An assignment target used as an expression position marker.
    LValue(LValue),
    /// One clause of a `verbs` block. Transient; collected into the
    /// owning class's verb handlers.
    VerbClause {
        /// Verb names this clause responds to.
        verbs: Vec<String>,
        /// Handler body.
        body: Vec<Node>,
        /// Where the clause began.
        pos: Position,
    },
}

impl Node {
    /// Where this node began in source.
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::CodeBlock { pos, .. }
            | Self::If { pos, .. }
            | Self::While { pos, .. }
            | Self::For { pos, .. }
            | Self::ForEach { pos, .. }
            | Self::Switch { pos, .. }
            | Self::Cond { pos, .. }
            | Self::Case { pos, .. }
            | Self::Break { pos, .. }
            | Self::Continue { pos, .. }
            | Self::Return { pos, .. }
            | Self::Asm { pos, .. }
            | Self::AsmStatement { pos, .. }
            | Self::Assignment { pos, .. }
            | Self::BinaryOp { pos, .. }
            | Self::UnaryOp { pos, .. }
            | Self::NaryOp { pos, .. }
            | Self::SendCall { pos, .. }
            | Self::SendParam { pos, .. }
            | Self::ProcedureCall { pos, .. }
            | Self::Rest { pos, .. }
            | Self::VerbClause { pos, .. } => *pos,
            Self::Value(value) => value.pos,
            Self::LValue(lvalue) => lvalue.pos,
        }
    }

    /// The token name, if this node is a plain token value.
    #[must_use]
    pub fn token_name(&self) -> Option<&str> {
        match self {
            Self::Value(value) => value.token_name(),
            _ => None,
        }
    }
}

/// A function body: shared shape of procedures and methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Parameter names in order.
    pub params: Vec<String>,
    /// `&tmp` declarations.
    pub temps: Vec<VariableDecl>,
    /// Body statements.
    pub code: Vec<Node>,
    /// Where the declaration began.
    pub pos: Position,
}

impl Function {
    /// Adds a temporary, keeping declaration order.
    pub fn add_temp(&mut self, temp: VariableDecl) {
        self.temps.push(temp);
    }
}

/// A top-level or in-class procedure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Procedure {
    /// The shared function shape.
    pub function: Function,
    /// True when exported (set by the `public` section).
    pub is_public: bool,
    /// Set when declared inside a class body; such procedures may read
    /// the class's properties.
    pub owner_class: Option<String>,
}

/// A property assignment in a class's `properties` block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    /// Property (selector) name.
    pub name: String,
    /// Initial value.
    pub value: Value,
    /// Where the property began.
    pub pos: Position,
}

/// One clause of a class's `verbs` block, before expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerbHandler {
    /// Verb names this clause responds to.
    pub verbs: Vec<String>,
    /// Handler body.
    pub code: Vec<Node>,
    /// Where the clause began.
    pub pos: Position,
}

/// A class or instance declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassDecl {
    /// Class or instance name.
    pub name: String,
    /// The `of`/`kindof` superclass, when given.
    pub superclass: Option<String>,
    /// True for `instance`, false for `class`.
    pub is_instance: bool,
    /// True when exported (set by the `public` section).
    pub is_public: bool,
    /// `properties` block entries.
    pub properties: Vec<Property>,
    /// Method definitions.
    pub methods: Vec<Function>,
    /// Names in a `methods` forward-declaration block.
    pub method_forwards: Vec<String>,
    /// In-class procedures.
    pub procedures: Vec<Procedure>,
    /// `verbs` block clauses, expanded into a `doVerb` method later.
    pub verb_handlers: Vec<VerbHandler>,
    /// Where the declaration began.
    pub pos: Position,
}

/// A script variable or `&tmp` declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableDecl {
    /// Variable name.
    pub name: String,
    /// Declared element count; 1 for a scalar.
    pub size: u16,
    /// Initial values, at most `size` of them.
    pub initializers: Vec<Value>,
    /// Where the declaration began.
    pub pos: Position,
}

impl VariableDecl {
    /// Creates a scalar declaration.
    #[must_use]
    pub fn scalar(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            size: 1,
            initializers: Vec::new(),
            pos,
        }
    }

    /// True when declared with an explicit `[size]`.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.size > 1
    }
}

/// A `define` (or one auto-numbered `enum` entry).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Define {
    /// Defined name.
    pub name: String,
    /// The 16-bit value.
    pub value: u16,
    /// Where the definition began.
    pub pos: Position,
}

/// One `synonyms` entry: a main word and its synonyms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Synonym {
    /// The word the synonyms map to.
    pub main_word: String,
    /// Words treated as the main word.
    pub synonyms: Vec<String>,
    /// Where the entry began.
    pub pos: Position,
}

/// One `public` export: a name and its dispatch slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportEntry {
    /// Exported procedure or instance name.
    pub name: String,
    /// Export table slot.
    pub slot: u16,
    /// Where the entry began.
    pub pos: Position,
}

/// An `extern` entry. Parses for compatibility; not implemented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternDecl {
    /// Procedure name.
    pub name: String,
    /// Script number or name holding the procedure.
    pub script: Option<Value>,
    /// Export slot within that script.
    pub index: u16,
    /// Where the entry began.
    pub pos: Position,
}

/// A `global` entry. Parses for compatibility; not implemented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalDecl {
    /// Variable declaration, index held in `decl`.
    pub decl: VariableDecl,
    /// Global variable index.
    pub index: u16,
}

/// A `classdef` block. Parses for compatibility; not implemented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassDefDecl {
    /// Class name.
    pub name: String,
    /// Where the block began.
    pub pos: Position,
}

/// One `selectors` entry. Parses for compatibility; not implemented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorDecl {
    /// Selector name.
    pub name: String,
    /// Selector number.
    pub number: u16,
    /// Where the entry began.
    pub pos: Position,
}

/// The root of a parsed script or header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    /// `script#` metadata, when given.
    pub script_number: Option<u16>,
    /// `text#` metadata, when given.
    pub text_number: Option<u16>,
    /// `include` file names.
    pub includes: Vec<String>,
    /// `use` script names.
    pub uses: Vec<String>,
    /// Defines and expanded enum entries, in order.
    pub defines: Vec<Define>,
    /// `local` script variables.
    pub variables: Vec<VariableDecl>,
    /// `synonyms` entries.
    pub synonyms: Vec<Synonym>,
    /// `public` exports.
    pub exports: Vec<ExportEntry>,
    /// Top-level procedures.
    pub procedures: Vec<Procedure>,
    /// Classes and instances, in source order.
    pub classes: Vec<ClassDecl>,
    /// `extern` entries (compatibility only).
    pub externs: Vec<ExternDecl>,
    /// `global` entries (compatibility only).
    pub globals: Vec<GlobalDecl>,
    /// `classdef` blocks (compatibility only).
    pub class_defs: Vec<ClassDefDecl>,
    /// `selectors` entries (compatibility only).
    pub selectors: Vec<SelectorDecl>,
    /// `procedure` forward declarations (compatibility only).
    pub procedure_forwards: Vec<String>,
}

impl Script {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a define by name.
    #[must_use]
    pub fn define_value(&self, name: &str) -> Option<u16> {
        self.defines
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value)
    }

    /// Looks up a `local` variable declaration by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|v| v.name == name)
    }
}
