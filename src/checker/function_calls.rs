use crate::{
    ast::ast::{File, Prototype},
    errors::errors::{Error, ErrorImpl},
    type_checker::{
        registry::Registry,
        typed_ast::{TypedExprKind, TypedFunctionArg},
    },
    Position,
};

use super::walker::walk_file;

fn check_arguments(
    prototype: &Prototype,
    args: &[TypedFunctionArg],
    registry: &Registry,
    position: &Position,
) -> Result<(), Error> {
    let expected = prototype.params.len();
    let received = args.len();

    if received > expected {
        return Err(Error::new(
            ErrorImpl::UnexpectedArguments { expected, received },
            position.clone(),
        ));
    }
    if received < expected {
        return Err(Error::new(
            ErrorImpl::MissingArguments { expected, received },
            position.clone(),
        ));
    }

    for (param, arg) in prototype.params.iter().zip(args) {
        if arg.label.as_deref() != Some(param.name.as_str()) {
            return Err(Error::new(
                ErrorImpl::UnexpectedArgumentInCall {
                    expected: param.name.clone(),
                    received: arg.label.clone().unwrap_or_default(),
                },
                arg.expr.position.clone(),
            ));
        }

        if !registry.accepts(&param.type_, &arg.expr.type_) {
            return Err(Error::new(
                ErrorImpl::WrongArgumentType {
                    argument: param.name.clone(),
                    expected: param.type_.to_string(),
                    received: arg.expr.type_.to_string(),
                },
                arg.expr.position.clone(),
            ));
        }
    }

    Ok(())
}

fn unknown_function(name: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::UnknownFunction {
            function: name.to_string(),
        },
        position.clone(),
    )
}

/// Every call must name a known function or method and pass one labelled
/// argument of an acceptable type per parameter, in order.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_function_calls(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, _| match &expr.kind {
        TypedExprKind::Call(call) => {
            let prototype = file
                .prototype(&call.name)
                .ok_or_else(|| unknown_function(&call.name, &expr.position))?;
            check_arguments(prototype, &call.args, registry, &expr.position)
        }
        TypedExprKind::MemberCall(instance, call) => {
            let type_name = instance.type_.name();
            if registry.get(type_name).is_none() {
                return Err(Error::new(
                    ErrorImpl::TypeDoesNotContainMembers {
                        type_: instance.type_.to_string(),
                    },
                    expr.position.clone(),
                ));
            }

            let prototype = registry
                .find_prototype(type_name, &call.name)
                .ok_or_else(|| unknown_function(&call.name, &expr.position))?;
            check_arguments(prototype, &call.args, registry, &expr.position)
        }
        _ => Ok(()),
    })
}
