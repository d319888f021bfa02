//! Memory layout of record types.
//!
//! Every record starts with a two-field header, the runtime type tag and a
//! reference count slot, followed by its properties in declaration order.
//! Protocol values all share the header-only `proto` struct, so any record
//! pointer can be read as a `proto*` to get at its tag.

use inkwell::types::BasicTypeEnum;

use crate::{ast::ast::File, errors::errors::CodegenError};

use super::compiler::Compiler;

/// Number of header fields in front of the first property.
pub const HEADER_FIELDS: u32 = 2;
pub const TAG_FIELD: u32 = 0;
pub const REFCOUNT_FIELD: u32 = 1;

/// Struct index of the property at `property_index`.
pub fn field_index(property_index: usize) -> u32 {
    property_index as u32 + HEADER_FIELDS
}

/// Creates the LLVM struct behind every custom type name.
///
/// All structs are declared opaque before any body is set, so properties
/// may refer to record types declared later in the file.
pub fn define_types(compiler: &mut Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    for type_ in &file.custom_types {
        let struct_type = compiler.context.opaque_struct_type(&type_.name);
        compiler
            .named_structs
            .insert(type_.name.clone(), struct_type);
    }

    // Record types shadow protocols of the same name
    let proto_type = compiler.proto_type;
    for protocol in &file.protocols {
        compiler
            .named_structs
            .entry(protocol.name.clone())
            .or_insert(proto_type);
    }

    for type_ in &file.custom_types {
        let mut fields: Vec<BasicTypeEnum> = vec![
            compiler.context.i32_type().into(),
            compiler.context.i32_type().into(),
        ];
        for property in &type_.properties {
            fields.push(compiler.convert_type(&property.type_)?);
        }

        compiler.struct_type(&type_.name)?.set_body(&fields, false);
        tracing::trace!(type_ = %type_.name, fields = fields.len(), "laid out record");
    }

    Ok(())
}
