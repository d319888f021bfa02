use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        registry::Registry,
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

use super::walker::walk_file;

fn ensure_comparison(condition: &TypedExpr) -> Result<(), Error> {
    if condition.is_logical() {
        return Ok(());
    }

    Err(Error::new(
        ErrorImpl::LoopConditionMustBeComparison,
        condition.position.clone(),
    ))
}

/// Conditions must be comparisons, and loop bodies must not `return`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_conditions(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, context| match &expr.kind {
        TypedExprKind::If(condition, ..)
        | TypedExprKind::For(_, condition, _)
        | TypedExprKind::While(condition, _) => ensure_comparison(condition),
        TypedExprKind::Return(_) if context.in_loop => Err(Error::new(
            ErrorImpl::ReturnInsideLoop,
            expr.position.clone(),
        )),
        _ => Ok(()),
    })
}
