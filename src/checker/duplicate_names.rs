use std::collections::HashSet;

use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
    type_checker::{registry::Registry, typed_ast::TypedExprKind},
    Position,
};

use super::walker::walk_file;

fn duplicate(name: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::DuplicateDefinition {
            name: name.to_string(),
        },
        position.clone(),
    )
}

/// Fails on the first name that was already seen.
fn ensure_unique<'a>(
    names: impl IntoIterator<Item = &'a str>,
    position: &Position,
) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(duplicate(name, position));
        }
    }
    Ok(())
}

/// Rejects names declared twice in the same namespace: type and protocol
/// members, file-scope functions, and locals.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_duplicate_names(file: &File, registry: &Registry) -> Result<(), Error> {
    for type_ in &file.custom_types {
        ensure_unique(
            type_
                .properties
                .iter()
                .map(|property| property.name.as_str())
                .chain(type_.functions.iter().map(|f| f.prototype.name.as_str())),
            &type_.position,
        )?;
    }

    for protocol in &file.protocols {
        ensure_unique(
            protocol
                .properties
                .iter()
                .map(|property| property.name.as_str())
                .chain(protocol.prototypes.iter().map(|p| p.name.as_str())),
            &protocol.position,
        )?;
    }

    let mut seen = HashSet::new();
    for (name, position) in &file.declared_names {
        if !seen.insert(name.as_str()) {
            return Err(duplicate(name, position));
        }
    }
    for protocol in &file.protocols {
        if !seen.insert(protocol.name.as_str()) {
            return Err(duplicate(&protocol.name, &protocol.position));
        }
    }

    walk_file(file, registry, |expr, scope, context| {
        let TypedExprKind::VariableDefinition(definition) = &expr.kind else {
            return Ok(());
        };
        let name = definition.name.as_str();

        let is_member = context
            .self_type
            .and_then(|self_type| context.registry.get(self_type))
            .is_some_and(|callable| {
                callable.find_property(name).is_some()
                    || context.registry.find_prototype(callable.name(), name).is_some()
            });

        if scope.contains_in_current_frame(name) || file.prototype(name).is_some() || is_member {
            return Err(duplicate(name, &expr.position));
        }

        Ok(())
    })
}
