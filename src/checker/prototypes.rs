use crate::{
    ast::{ast::{File, Prototype}, types::StoredType},
    errors::errors::{Error, ErrorImpl},
    type_checker::registry::Registry,
    Position,
};

pub(super) fn ensure_known(
    registry: &Registry,
    type_: &StoredType,
    position: &Position,
) -> Result<(), Error> {
    if registry.is_known(type_) {
        return Ok(());
    }

    Err(Error::new(
        ErrorImpl::UndefinedType {
            type_: type_.to_string(),
        },
        position.clone(),
    ))
}

fn check_prototype(prototype: &Prototype, registry: &Registry) -> Result<(), Error> {
    for param in &prototype.params {
        ensure_known(registry, &param.type_, &prototype.position)?;
    }
    ensure_known(registry, &prototype.return_type, &prototype.position)
}

/// Parameter and return types of every signature must exist.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_prototypes(file: &File, registry: &Registry) -> Result<(), Error> {
    let functions = file
        .functions
        .iter()
        .chain(file.custom_types.iter().flat_map(|type_| type_.functions.iter()))
        .chain(
            file.protocols
                .iter()
                .flat_map(|protocol| protocol.defaults.values()),
        )
        .map(|function| &function.prototype);

    let requirements = file
        .protocols
        .iter()
        .flat_map(|protocol| protocol.prototypes.iter());

    for prototype in file.externs.iter().chain(functions).chain(requirements) {
        check_prototype(prototype, registry)?;
    }

    Ok(())
}
