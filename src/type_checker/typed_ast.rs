//! The typed AST produced by type resolution.
//!
//! Mirrors `ast::expressions::Expr` node for node, with every node carrying
//! the `StoredType` it resolved to.

use crate::{
    ast::{
        expressions::{BinaryOperator, LiteralValue, LogicalOperator, VariableDefinition},
        types::StoredType,
    },
    Position,
};

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunctionCall {
    pub name: String,
    pub args: Vec<TypedFunctionArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunctionArg {
    pub label: Option<String>,
    pub expr: TypedExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub type_: StoredType,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Literal(LiteralValue),
    Variable(String),
    VariableDefinition(VariableDefinition),
    MemberProperty(Box<TypedExpr>, String),
    MemberCall(Box<TypedExpr>, TypedFunctionCall),
    Assignment(Box<TypedExpr>, Box<TypedExpr>),
    Binary(Box<TypedExpr>, BinaryOperator, Box<TypedExpr>),
    Logical(Box<TypedExpr>, LogicalOperator, Box<TypedExpr>),
    If(Box<TypedExpr>, Vec<TypedExpr>, Vec<TypedExpr>),
    For(Box<TypedExpr>, Box<TypedExpr>, Vec<TypedExpr>),
    While(Box<TypedExpr>, Vec<TypedExpr>),
    Call(TypedFunctionCall),
    Return(Option<Box<TypedExpr>>),
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, type_: StoredType, position: Position) -> Self {
        TypedExpr {
            kind,
            type_,
            position,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self.kind, TypedExprKind::Logical(..))
    }

    /// Counts this node and all of its descendants.
    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        let children: usize = match &self.kind {
            TypedExprKind::Literal(_)
            | TypedExprKind::Variable(_)
            | TypedExprKind::VariableDefinition(_) => 0,
            TypedExprKind::MemberProperty(instance, _) => instance.node_count(),
            TypedExprKind::MemberCall(instance, call) => {
                instance.node_count() + call.args.iter().map(|a| a.expr.node_count()).sum::<usize>()
            }
            TypedExprKind::Call(call) => call.args.iter().map(|a| a.expr.node_count()).sum(),
            TypedExprKind::Assignment(lhs, rhs)
            | TypedExprKind::Binary(lhs, _, rhs)
            | TypedExprKind::Logical(lhs, _, rhs) => lhs.node_count() + rhs.node_count(),
            TypedExprKind::If(condition, thens, elses) => {
                condition.node_count()
                    + thens.iter().map(TypedExpr::node_count).sum::<usize>()
                    + elses.iter().map(TypedExpr::node_count).sum::<usize>()
            }
            TypedExprKind::For(init, condition, body) => {
                init.node_count()
                    + condition.node_count()
                    + body.iter().map(TypedExpr::node_count).sum::<usize>()
            }
            TypedExprKind::While(condition, body) => {
                condition.node_count() + body.iter().map(TypedExpr::node_count).sum::<usize>()
            }
            TypedExprKind::Return(value) => value.as_ref().map_or(0, |v| v.node_count()),
        };

        children + 1
    }
}
