use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
};

/// Moves `extension` functions into their record types and `default`
/// bodies into their protocols.
///
/// Merged blocks are consumed, so merging an already merged module is a
/// no-op.
#[tracing::instrument(level = "debug", skip_all)]
pub fn merge_extensions(file: &mut File) -> Result<(), Error> {
    for extension in std::mem::take(&mut file.extensions) {
        let Some(type_) = file
            .custom_types
            .iter_mut()
            .find(|type_| type_.name == extension.name)
        else {
            return Err(Error::new(
                ErrorImpl::CouldNotFindTypeForExtension {
                    type_: extension.name,
                },
                extension.position,
            ));
        };

        tracing::debug!(type_ = %type_.name, functions = extension.functions.len(), "merging extension");
        type_.functions.extend(extension.functions);
    }

    for default in std::mem::take(&mut file.defaults) {
        let Some(protocol) = file
            .protocols
            .iter_mut()
            .find(|protocol| protocol.name == default.name)
        else {
            return Err(Error::new(
                ErrorImpl::CouldNotFindTypeForExtension {
                    type_: default.name,
                },
                default.position,
            ));
        };

        for function in default.functions {
            let Some(declared) = protocol.find_prototype(&function.prototype.name) else {
                return Err(Error::new(
                    ErrorImpl::UnknownFunction {
                        function: function.prototype.name.clone(),
                    },
                    function.prototype.position.clone(),
                ));
            };

            if *declared != function.prototype {
                return Err(Error::new(
                    ErrorImpl::FunctionDoesNotMatchDeclaration {
                        function: function.prototype.name.clone(),
                        type_: protocol.name.clone(),
                    },
                    function.prototype.position.clone(),
                ));
            }

            protocol
                .defaults
                .insert(function.prototype.name.clone(), function);
        }
    }

    Ok(())
}
