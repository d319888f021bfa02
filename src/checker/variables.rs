use crate::{
    ast::ast::File,
    errors::errors::Error,
    type_checker::{registry::Registry, typed_ast::TypedExprKind},
};

use super::{prototypes::ensure_known, walker::walk_file};

/// `var name: Type` must name an existing type.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_variable_definitions(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, _| match &expr.kind {
        TypedExprKind::VariableDefinition(definition) => {
            ensure_known(registry, &definition.type_, &expr.position)
        }
        _ => Ok(()),
    })
}
