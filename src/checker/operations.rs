use crate::{
    ast::{
        ast::File,
        expressions::{BinaryOperator, LogicalOperator},
        types::StoredType,
    },
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        registry::Registry,
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

use super::walker::walk_file;

fn invalid_operation(lhs: &TypedExpr, rhs: &TypedExpr, expr: &TypedExpr) -> Error {
    Error::new(
        ErrorImpl::InvalidOperation {
            left: lhs.type_.to_string(),
            right: rhs.type_.to_string(),
        },
        expr.position.clone(),
    )
}

fn is_valid_binary(operator: BinaryOperator, lhs: &StoredType, rhs: &StoredType) -> bool {
    if lhs != rhs {
        return false;
    }

    match operator {
        BinaryOperator::Mod => *lhs == StoredType::Int,
        _ => lhs.is_numeric(),
    }
}

fn is_valid_logical(operator: LogicalOperator, lhs: &StoredType, rhs: &StoredType) -> bool {
    if lhs != rhs {
        return false;
    }

    match operator {
        LogicalOperator::And | LogicalOperator::Or => *lhs == StoredType::Int,
        _ => lhs.is_numeric(),
    }
}

/// Arithmetic works on matching `Int` or `Double` operands, `%` and the
/// boolean operators only on `Int`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_operations(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, _| match &expr.kind {
        TypedExprKind::Binary(lhs, operator, rhs)
            if !is_valid_binary(*operator, &lhs.type_, &rhs.type_) =>
        {
            Err(invalid_operation(lhs, rhs, expr))
        }
        TypedExprKind::Logical(lhs, operator, rhs)
            if !is_valid_logical(*operator, &lhs.type_, &rhs.type_) =>
        {
            Err(invalid_operation(lhs, rhs, expr))
        }
        _ => Ok(()),
    })
}
