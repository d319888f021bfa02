use std::fmt::Display;

use crate::Position;

use super::types::StoredType;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl LiteralValue {
    /// The intrinsic type of a literal.
    pub fn stored_type(&self) -> StoredType {
        match self {
            LiteralValue::Int(_) => StoredType::Int,
            LiteralValue::Float(_) => StoredType::Float,
            LiteralValue::Double(_) => StoredType::Double,
            LiteralValue::String(_) => StoredType::String,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Times,
    Divide,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Equals,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Times => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Mod => "%",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::Equals => "==",
            LogicalOperator::NotEqual => "!=",
            LogicalOperator::LessThan => "<",
            LogicalOperator::LessThanOrEqual => "<=",
            LogicalOperator::GreaterThan => ">",
            LogicalOperator::GreaterThanOrEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

/// A `name: Type` pair, used for parameters, properties and `var` declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub name: String,
    pub type_: StoredType,
}

impl VariableDefinition {
    pub fn new(name: &str, type_: StoredType) -> Self {
        VariableDefinition {
            name: name.to_string(),
            type_,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<FunctionArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionArg {
    pub label: Option<String>,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(LiteralValue),
    Variable(String),
    VariableDefinition(VariableDefinition),
    MemberProperty(Box<Expr>, String),
    MemberCall(Box<Expr>, FunctionCall),
    Assignment(Box<Expr>, Box<Expr>),
    Binary(Box<Expr>, BinaryOperator, Box<Expr>),
    Logical(Box<Expr>, LogicalOperator, Box<Expr>),
    If(Box<Expr>, Vec<Expr>, Vec<Expr>),
    /// `for (init; condition; increment) { body }`, with the increment
    /// already appended to the body.
    For(Box<Expr>, Box<Expr>, Vec<Expr>),
    While(Box<Expr>, Vec<Expr>),
    Call(FunctionCall),
    Return(Option<Box<Expr>>),
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Expr { kind, position }
    }
}
