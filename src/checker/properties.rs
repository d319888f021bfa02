use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
    type_checker::{registry::Registry, typed_ast::TypedExprKind},
};

use super::{prototypes::ensure_known, walker::walk_file};

/// Every `instance.property` must name a property the instance's type has.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_property_references(file: &File, registry: &Registry) -> Result<(), Error> {
    walk_file(file, registry, |expr, _, _| {
        let TypedExprKind::MemberProperty(instance, name) = &expr.kind else {
            return Ok(());
        };

        let Some(callable) = registry.get(instance.type_.name()) else {
            return Err(Error::new(
                ErrorImpl::TypeDoesNotContainMembers {
                    type_: instance.type_.to_string(),
                },
                expr.position.clone(),
            ));
        };

        if callable.find_property(name).is_none() {
            return Err(Error::new(
                ErrorImpl::UnknownMember {
                    type_: callable.name().to_string(),
                    member: name.clone(),
                },
                expr.position.clone(),
            ));
        }

        Ok(())
    })
}

/// Declared property types of record types and protocols must exist.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_property_types(file: &File, registry: &Registry) -> Result<(), Error> {
    for type_ in &file.custom_types {
        for property in &type_.properties {
            ensure_known(registry, &property.type_, &type_.position)?;
        }
    }

    for protocol in &file.protocols {
        for property in &protocol.properties {
            ensure_known(registry, &property.type_, &protocol.position)?;
        }
    }

    Ok(())
}
