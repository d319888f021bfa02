use crate::{
    ast::ast::{File, Prototype},
    errors::errors::{Error, ErrorImpl},
    type_checker::registry::Registry,
};

/// Verifies that every record type implements what its protocols require,
/// and records a conformance stub for each requirement it leaves to a
/// protocol default.
///
/// A conforming type must also declare every protocol property with the
/// same type, since protocol code reads them through `self`.
///
/// A requirement with no default must be implemented with the exact
/// prototype, otherwise the protocol is unimplemented. Two protocols that
/// both provide a default for the same method name conflict.
///
/// Stubs that are already recorded are not added again.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_protocol_conformance(file: &mut File, registry: &Registry) -> Result<(), Error> {
    for type_ in file.custom_types.iter_mut() {
        let mut stubs: Vec<(String, Prototype)> = vec![];

        for protocol_name in &type_.protocols {
            let Some(protocol) = registry.get_protocol(protocol_name) else {
                return Err(Error::new(
                    ErrorImpl::UnknownProtocol {
                        protocol: protocol_name.clone(),
                        type_: type_.name.clone(),
                    },
                    type_.position.clone(),
                ));
            };

            for property in &protocol.properties {
                let declared = type_.properties.iter().any(|candidate| {
                    candidate.name == property.name && candidate.type_ == property.type_
                });
                if !declared {
                    return Err(Error::new(
                        ErrorImpl::UnimplementedProtocol {
                            protocol: protocol.name.clone(),
                            type_: type_.name.clone(),
                            missing: property.name.clone(),
                        },
                        type_.position.clone(),
                    ));
                }
            }

            for required in &protocol.prototypes {
                let implemented = type_
                    .functions
                    .iter()
                    .any(|function| function.prototype == *required);
                if implemented {
                    continue;
                }

                if !protocol.defaults.contains_key(&required.name) {
                    return Err(Error::new(
                        ErrorImpl::UnimplementedProtocol {
                            protocol: protocol.name.clone(),
                            type_: type_.name.clone(),
                            missing: required.name.clone(),
                        },
                        type_.position.clone(),
                    ));
                }

                if let Some(mismatched) = type_
                    .functions
                    .iter()
                    .find(|function| function.prototype.name == required.name)
                {
                    return Err(Error::new(
                        ErrorImpl::FunctionDoesNotMatchDeclaration {
                            function: required.name.clone(),
                            type_: protocol.name.clone(),
                        },
                        mismatched.prototype.position.clone(),
                    ));
                }

                let existing = type_
                    .protocol_conformance_stubs
                    .iter()
                    .chain(stubs.iter())
                    .find(|(_, stub)| stub.name == required.name);
                match existing {
                    // Two defaults would both claim `T.m`
                    Some((owner, _)) if *owner != protocol.name => {
                        return Err(Error::new(
                            ErrorImpl::DuplicateDefinition {
                                name: format!("{}.{}", type_.name, required.name),
                            },
                            type_.position.clone(),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        tracing::debug!(type_ = %type_.name, method = %required.name, "adding conformance stub");
                        stubs.push((protocol.name.clone(), required.clone()));
                    }
                }
            }
        }

        type_.protocol_conformance_stubs.extend(stubs);
    }

    Ok(())
}
