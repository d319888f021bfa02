use crate::{
    ast::{ast::File, types::StoredType},
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        registry::Registry,
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

use super::walker::walk_file;

/// The declared type of an assignable expression, `None` if it cannot be
/// assigned to.
fn target_type(target: &TypedExpr) -> Option<&StoredType> {
    match &target.kind {
        TypedExprKind::VariableDefinition(definition) => Some(&definition.type_),
        TypedExprKind::Variable(_) | TypedExprKind::MemberProperty(..) => Some(&target.type_),
        _ => None,
    }
}

fn describe(target: &TypedExpr) -> String {
    match &target.kind {
        TypedExprKind::Literal(_) => String::from("a literal"),
        TypedExprKind::Call(call) | TypedExprKind::MemberCall(_, call) => {
            format!("the result of `{}`", call.name)
        }
        TypedExprKind::Binary(..) | TypedExprKind::Logical(..) => String::from("an operation"),
        _ => String::from("this expression"),
    }
}

/// Assignments need a variable, definition or property on the left and a
/// value of an acceptable type on the right.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_assignments(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, _| {
        let TypedExprKind::Assignment(target, value) = &expr.kind else {
            return Ok(());
        };

        let Some(expected) = target_type(target) else {
            return Err(Error::new(
                ErrorImpl::UnableToAssign {
                    target: describe(target),
                },
                target.position.clone(),
            ));
        };

        if !registry.accepts(expected, &value.type_) {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: expected.to_string(),
                    received: value.type_.to_string(),
                },
                value.position.clone(),
            ));
        }

        Ok(())
    })
}
