//! Operator kinds and their spellings.
//!
//! The grammar groups operators by arity and shape: binary-only,
//! n-ary associative, n-ary comparison, unary, and assignment. Each
//! group is compiled into an [`OperatorTable`](crate::optrie::OperatorTable)
//! for longest-match scanning; the enums here are what the matched
//! spellings resolve to.

/// A binary (or n-ary, before restructuring) operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `mod`
    Modulo,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `and`
    LogicalAnd,
    /// `or`
    LogicalOr,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterEqual,
    /// `u<` (unsigned)
    UnsignedLess,
    /// `u<=` (unsigned)
    UnsignedLessEqual,
    /// `u>` (unsigned)
    UnsignedGreater,
    /// `u>=` (unsigned)
    UnsignedGreaterEqual,
}

impl BinaryOperator {
    /// Resolves an operator spelling, or None if it is not binary.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "mod" => Self::Modulo,
            "<<" => Self::ShiftLeft,
            ">>" => Self::ShiftRight,
            "&" => Self::BitwiseAnd,
            "|" => Self::BitwiseOr,
            "^" => Self::BitwiseXor,
            "and" => Self::LogicalAnd,
            "or" => Self::LogicalOr,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessEqual,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterEqual,
            "u<" => Self::UnsignedLess,
            "u<=" => Self::UnsignedLessEqual,
            "u>" => Self::UnsignedGreater,
            "u>=" => Self::UnsignedGreaterEqual,
            _ => return None,
        })
    }

    /// The canonical spelling of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "mod",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::LogicalAnd => "and",
            Self::LogicalOr => "or",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterEqual => ">=",
            Self::UnsignedLess => "u<",
            Self::UnsignedLessEqual => "u<=",
            Self::UnsignedGreater => "u>",
            Self::UnsignedGreaterEqual => "u>=",
        }
    }
}

/// A unary operator. The operand follows the operator inside parentheses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `-`
    Negate,
    /// `~`
    BitwiseNot,
    /// `not`
    LogicalNot,
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

impl UnaryOperator {
    /// Resolves an operator spelling, or None if it is not unary.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "-" => Self::Negate,
            "~" => Self::BitwiseNot,
            "not" => Self::LogicalNot,
            "++" => Self::Increment,
            "--" => Self::Decrement,
            _ => return None,
        })
    }

    /// The canonical spelling of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::BitwiseNot => "~",
            Self::LogicalNot => "not",
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }
}

/// An assignment operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubtractAssign,
    /// `*=`
    MultiplyAssign,
    /// `/=`
    DivideAssign,
    /// `mod=`
    ModuloAssign,
    /// `&=`
    AndAssign,
    /// `|=`
    OrAssign,
    /// `^=`
    XorAssign,
    /// `<<=`
    ShiftLeftAssign,
    /// `>>=`
    ShiftRightAssign,
}

impl AssignmentOperator {
    /// Resolves an operator spelling, or None if it is not assignment.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubtractAssign,
            "*=" => Self::MultiplyAssign,
            "/=" => Self::DivideAssign,
            "mod=" => Self::ModuloAssign,
            "&=" => Self::AndAssign,
            "|=" => Self::OrAssign,
            "^=" => Self::XorAssign,
            "<<=" => Self::ShiftLeftAssign,
            ">>=" => Self::ShiftRightAssign,
            _ => return None,
        })
    }

    /// The canonical spelling of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::ModuloAssign => "mod=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
        }
    }
}

/// Spellings accepted by the binary-only operator rule.
pub const BINARY_OPS: &[&str] = &[">>", "<<", "-", "/", "mod"];

/// Spellings accepted by the n-ary associative operator rule.
pub const NARY_ASSOC_OPS: &[&str] = &["*", "+", "&", "|", "^", "and", "or"];

/// Spellings accepted by the n-ary comparison operator rule.
pub const NARY_COMPARE_OPS: &[&str] = &[
    "u>=", ">=", "u>", ">", "u<=", "<=", "u<", "!=", "<", "==",
];

/// Spellings accepted by the unary operator rule.
pub const UNARY_OPS: &[&str] = &["~", "not", "-", "++", "--"];

/// Spellings accepted by the assignment operator rule.
pub const ASSIGNMENT_OPS: &[&str] = &[
    "+=", "-=", "*=", "/=", "mod=", "&=", "|=", "^=", ">>=", "<<=", "=",
];

/// Returns true if `word` spells any operator in any group.
///
/// Used for error decoration: a bare operator at the failure point
/// usually means a missing opening parenthesis.
#[must_use]
pub fn is_operator_name(word: &str) -> bool {
    BinaryOperator::from_name(word).is_some()
        || UnaryOperator::from_name(word).is_some()
        || AssignmentOperator::from_name(word).is_some()
}
