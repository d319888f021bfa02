use crate::{
    ast::ast::File,
    errors::errors::Error,
    type_checker::{
        registry::{finalize_type_tags, Registry},
        type_checker::resolve_types,
    },
};

use super::{
    assignments::check_assignments, conditions::check_conditions,
    conformance::check_protocol_conformance, duplicate_names::check_duplicate_names,
    extensions::merge_extensions, function_calls::check_function_calls,
    operations::check_operations,
    properties::{check_property_references, check_property_types},
    prototypes::check_prototypes, returns::check_returns,
    variables::check_variable_definitions,
};

/// Resolves types and runs every semantic check on `file`.
///
/// Extensions and defaults are merged first so that resolution sees the
/// complete member lists. Conformance runs before call validation because
/// it records the stubs later stages rely on. The first failing check
/// aborts the pipeline.
///
/// A module that passes gets its runtime type tags and is ready for code
/// generation. Checking it again is a no-op apart from redoing the work.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_file(file: &mut File) -> Result<(), Error> {
    merge_extensions(file)?;
    resolve_types(file)?;

    let registry = Registry::new(file);
    check_duplicate_names(file, &registry)?;
    check_prototypes(file, &registry)?;
    check_property_types(file, &registry)?;
    check_variable_definitions(file, &registry)?;
    check_protocol_conformance(file, &registry)?;

    // Stubs are part of the member lists from here on
    let registry = Registry::new(file);
    check_function_calls(file, &registry)?;
    check_property_references(file, &registry)?;
    check_operations(file, &registry)?;
    check_conditions(file, &registry)?;
    check_returns(file, &registry)?;
    check_assignments(file, &registry)?;

    finalize_type_tags(file);

    tracing::debug!("module passed all checks");
    Ok(())
}
