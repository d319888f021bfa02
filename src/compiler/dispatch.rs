//! Protocol witness dispatch.
//!
//! Every protocol requirement `m` of `P` becomes a function `P.m` taking a
//! `proto*`. It reads the runtime tag from the record header and switches
//! to the matching `T.m`. Tags without a case fall through to the default
//! body `P.m.default`, or to `unreachable` when the protocol has none.
//!
//! Protocol properties are reached the same way. `P.p.address` switches on
//! the tag and returns the address of `p` inside the concrete record.

use inkwell::{
    types::{BasicType, BasicTypeEnum},
    values::{BasicValueEnum, FunctionValue, IntValue, PointerValue},
    AddressSpace,
};

use crate::{
    ast::{
        ast::{File, ProtocolDefinition, Prototype},
        expressions::VariableDefinition,
        types::StoredType,
    },
    errors::errors::CodegenError,
    type_checker::type_checker::RETURN_BINDING,
};

use super::{
    compiler::Compiler,
    expr::{build_call, coerce, Lowered},
    functions::{default_name, emit_body, method_name, property_address_name, Receiver},
    layout::{field_index, TAG_FIELD},
};

/// Emits the default bodies and the dispatcher of every protocol
/// requirement, in declaration order.
pub fn emit_protocol_functions(
    compiler: &mut Compiler<'_>,
    file: &File,
) -> Result<(), CodegenError> {
    for protocol in &file.protocols {
        let self_type = StoredType::Custom(protocol.name.clone());

        for property in &protocol.properties {
            emit_property_address(compiler, protocol, property)?;
        }

        for prototype in &protocol.prototypes {
            if let Some(default) = protocol.defaults.get(&prototype.name) {
                let function =
                    compiler.get_function(&default_name(&protocol.name, &prototype.name))?;
                emit_body(
                    compiler,
                    function,
                    &default.prototype,
                    Receiver::Parameter(self_type.clone()),
                    default.typed_body(),
                )?;
            }

            emit_dispatch(compiler, protocol, prototype)?;
        }

        tracing::debug!(protocol = %protocol.name, "emitted protocol dispatch");
    }

    Ok(())
}

fn emit_dispatch(
    compiler: &mut Compiler<'_>,
    protocol: &ProtocolDefinition,
    prototype: &Prototype,
) -> Result<(), CodegenError> {
    let function = compiler.get_function(&method_name(&protocol.name, &prototype.name))?;
    compiler.start_function(function);

    let slot = match &prototype.return_type {
        StoredType::Void => None,
        return_type => {
            let slot_type = compiler.convert_type(return_type)?;
            let slot = compiler.builder.build_alloca(slot_type, RETURN_BINDING)?;
            Some((slot, slot_type))
        }
    };

    let tag = load_tag(compiler, function, protocol)?;
    let conforming = conforming_tags(compiler, protocol)?;

    let return_block = compiler.create_basic_block("return", function);
    let default_block = compiler.create_basic_block("default", function);
    let cases = conforming
        .iter()
        .map(|(tag, name)| {
            (
                compiler.context.i32_type().const_int(u64::from(*tag), false),
                compiler.create_basic_block(name, function),
            )
        })
        .collect::<Vec<_>>();

    compiler.builder.build_switch(tag, default_block, &cases)?;

    let params = function.get_params();
    for ((_, type_name), (_, block)) in conforming.iter().zip(cases.iter()) {
        compiler.builder.position_at_end(*block);

        let target = compiler.get_function(&method_name(type_name, &prototype.name))?;
        let result = build_call(compiler, target, params.clone(), &prototype.return_type)?;
        store_result(compiler, result, slot)?;
        compiler.builder.build_unconditional_branch(return_block)?;
    }

    compiler.builder.position_at_end(default_block);
    if protocol.defaults.contains_key(&prototype.name) {
        let target = compiler.get_function(&default_name(&protocol.name, &prototype.name))?;
        let result = build_call(compiler, target, params, &prototype.return_type)?;
        store_result(compiler, result, slot)?;
        compiler.builder.build_unconditional_branch(return_block)?;
    } else {
        compiler.builder.build_unreachable()?;
    }

    compiler.builder.position_at_end(return_block);
    match slot {
        Some((slot, _)) => {
            let value = compiler.builder.build_load(slot, "")?;
            compiler.builder.build_return(Some(&value))?;
        }
        None => {
            compiler.builder.build_return(None)?;
        }
    }

    Ok(())
}

fn load_tag<'a>(
    compiler: &Compiler<'a>,
    function: FunctionValue<'a>,
    protocol: &ProtocolDefinition,
) -> Result<IntValue<'a>, CodegenError> {
    let self_value = self_param(function, protocol)?;
    let tag_slot = compiler
        .builder
        .build_struct_gep(self_value, TAG_FIELD, "tag")?;
    Ok(compiler.builder.build_load(tag_slot, "tag")?.into_int_value())
}

fn self_param<'a>(
    function: FunctionValue<'a>,
    protocol: &ProtocolDefinition,
) -> Result<PointerValue<'a>, CodegenError> {
    match function.get_first_param() {
        Some(BasicValueEnum::PointerValue(self_value)) => Ok(self_value),
        _ => Err(CodegenError::UnknownType(protocol.name.clone())),
    }
}

/// `(tag, type name)` of every record type conforming to `protocol`.
fn conforming_tags(
    compiler: &Compiler<'_>,
    protocol: &ProtocolDefinition,
) -> Result<Vec<(u32, String)>, CodegenError> {
    compiler
        .registry
        .conforming_types(&protocol.name)
        .into_iter()
        .map(|type_| {
            type_
                .tag
                .map(|tag| (tag, type_.name.clone()))
                .ok_or_else(|| CodegenError::UnknownType(type_.name.clone()))
        })
        .collect()
}

/// Emits `P.p.address`. Each case casts `self` to the concrete record and
/// returns the address of its field named `p`.
fn emit_property_address(
    compiler: &Compiler<'_>,
    protocol: &ProtocolDefinition,
    property: &VariableDefinition,
) -> Result<(), CodegenError> {
    let function = compiler.get_function(&property_address_name(&protocol.name, &property.name))?;
    compiler.start_function(function);

    let tag = load_tag(compiler, function, protocol)?;
    let self_value = self_param(function, protocol)?;
    let address_type = compiler
        .convert_type(&property.type_)?
        .ptr_type(AddressSpace::default());

    let default_block = compiler.create_basic_block("default", function);
    let mut cases = vec![];
    for (tag, type_name) in conforming_tags(compiler, protocol)? {
        let index = compiler
            .registry
            .get_type(&type_name)
            .and_then(|type_| type_.property_index(&property.name))
            .ok_or_else(|| CodegenError::UnknownMember {
                type_: type_name.clone(),
                member: property.name.clone(),
            })?;
        let block = compiler.create_basic_block(&type_name, function);
        cases.push((
            compiler.context.i32_type().const_int(u64::from(tag), false),
            block,
            type_name,
            index,
        ));
    }

    let switch_cases = cases
        .iter()
        .map(|(tag, block, _, _)| (*tag, *block))
        .collect::<Vec<_>>();
    compiler.builder.build_switch(tag, default_block, &switch_cases)?;

    for (_, block, type_name, index) in &cases {
        compiler.builder.position_at_end(*block);

        let record_type = compiler
            .struct_type(type_name)?
            .ptr_type(AddressSpace::default());
        let record = compiler
            .builder
            .build_pointer_cast(self_value, record_type, "record")?;
        let field = compiler
            .builder
            .build_struct_gep(record, field_index(*index), &property.name)?;
        let field = coerce(compiler, field.into(), address_type.into())?;
        compiler.builder.build_return(Some(&field))?;
    }

    compiler.builder.position_at_end(default_block);
    compiler.builder.build_unreachable()?;

    Ok(())
}

fn store_result<'a>(
    compiler: &Compiler<'a>,
    result: Lowered<'a>,
    slot: Option<(PointerValue<'a>, BasicTypeEnum<'a>)>,
) -> Result<(), CodegenError> {
    if let (Lowered::Value(value, _), Some((slot, slot_type))) = (result, slot) {
        let value = coerce(compiler, value, slot_type)?;
        compiler.builder.build_store(slot, value)?;
    }

    Ok(())
}
