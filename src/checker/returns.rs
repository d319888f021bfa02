use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        registry::Registry,
        type_checker::RETURN_BINDING,
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

use super::walker::{bodies, walk_file};

/// Whether every path through `exprs` ends in a `return`.
///
/// An `if` counts only when both branches return. Loops never count.
pub fn always_returns(exprs: &[TypedExpr]) -> bool {
    exprs.iter().any(|expr| match &expr.kind {
        TypedExprKind::Return(_) => true,
        TypedExprKind::If(_, thens, elses) => always_returns(thens) && always_returns(elses),
        _ => false,
    })
}

/// Fails on the first expression that follows, in the same block, an
/// expression that always returns.
fn check_unreachable(exprs: &[TypedExpr]) -> Result<(), Error> {
    if let Some(index) = exprs
        .iter()
        .position(|expr| always_returns(std::slice::from_ref(expr)))
    {
        if let Some(unreachable) = exprs.get(index + 1) {
            return Err(Error::new(
                ErrorImpl::UnreachableCode,
                unreachable.position.clone(),
            ));
        }
    }

    exprs.iter().try_for_each(|expr| match &expr.kind {
        TypedExprKind::If(_, thens, elses) => {
            check_unreachable(thens)?;
            check_unreachable(elses)
        }
        TypedExprKind::For(_, _, body) | TypedExprKind::While(_, body) => check_unreachable(body),
        _ => Ok(()),
    })
}

/// Returns must appear inside a body with a return slot and carry a value
/// of an acceptable type. Non-void bodies must return on every path, and
/// nothing may follow a `return` in the same block.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_returns(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, scope, _| {
        let TypedExprKind::Return(_) = &expr.kind else {
            return Ok(());
        };

        let Some(expected) = scope.lookup(RETURN_BINDING) else {
            return Err(Error::new(ErrorImpl::UnexpectedReturn, expr.position.clone()));
        };

        if !registry.accepts(expected, &expr.type_) {
            return Err(Error::new(
                ErrorImpl::ReturnTypeMismatch {
                    expected: expected.to_string(),
                    received: expr.type_.to_string(),
                },
                expr.position.clone(),
            ));
        }

        Ok(())
    })?;

    for body in bodies(file) {
        check_unreachable(body.exprs)?;

        let Some(prototype) = body.prototype else {
            continue;
        };

        if !prototype.return_type.is_void() && !always_returns(body.exprs) {
            return Err(Error::new(
                ErrorImpl::NoReturnInFunction {
                    function: prototype.name.clone(),
                },
                prototype.position.clone(),
            ));
        }
    }

    Ok(())
}
