use std::collections::HashSet;

use inkwell::{
    module::Linkage,
    types::BasicType,
    values::{FunctionValue, PointerValue},
    AddressSpace,
};

use crate::{
    ast::{
        ast::{File, Prototype, TypeDefinition},
        expressions::VariableDefinition,
        types::StoredType,
    },
    errors::errors::CodegenError,
    type_checker::{
        type_checker::{RETURN_BINDING, SELF_BINDING},
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

use super::{
    compiler::{Compiler, ReturnTarget},
    expr::{build_call, Lowered},
    layout::{REFCOUNT_FIELD, TAG_FIELD},
    stmt::gen_block,
};

/// LLVM name of method `method` on a record type or protocol.
pub fn method_name(owner: &str, method: &str) -> String {
    format!("{}.{}", owner, method)
}

/// LLVM name of the default body of a protocol requirement.
pub fn default_name(protocol: &str, method: &str) -> String {
    format!("{}.{}.default", protocol, method)
}

/// LLVM name of the function returning the address of a protocol property.
pub fn property_address_name(protocol: &str, property: &str) -> String {
    format!("{}.{}.address", protocol, property)
}

/// How a body gets hold of `self`.
pub enum Receiver<'t> {
    /// Free functions have no `self`
    None,
    /// Methods receive `self` as their first parameter
    Parameter(StoredType),
    /// Initializers allocate `self` and fill in the record header
    Allocated(&'t TypeDefinition),
}

/// Declares every function the module defines before any body is emitted,
/// so calls never depend on emission order.
pub fn declare_functions(compiler: &Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    for type_ in &file.custom_types {
        let self_type = StoredType::Custom(type_.name.clone());

        compiler.declare_function(&type_.name, &type_.init_method.prototype, None)?;
        for prototype in type_.prototypes() {
            compiler.declare_function(
                &method_name(&type_.name, &prototype.name),
                prototype,
                Some(&self_type),
            )?;
        }
    }

    for protocol in &file.protocols {
        let self_type = StoredType::Custom(protocol.name.clone());

        for property in &protocol.properties {
            declare_property_address(compiler, &protocol.name, property)?;
        }

        for prototype in &protocol.prototypes {
            compiler.declare_function(
                &method_name(&protocol.name, &prototype.name),
                prototype,
                Some(&self_type),
            )?;

            if let Some(default) = protocol.defaults.get(&prototype.name) {
                compiler.declare_function(
                    &default_name(&protocol.name, &prototype.name),
                    &default.prototype,
                    Some(&self_type),
                )?;
            }
        }
    }

    for function in &file.functions {
        compiler.declare_function(&function.prototype.name, &function.prototype, None)?;
    }

    Ok(())
}

/// Declares `P.p.address`, which takes a `proto*` and returns a pointer to
/// property `p` inside the record behind it.
fn declare_property_address(
    compiler: &Compiler<'_>,
    protocol: &str,
    property: &VariableDefinition,
) -> Result<(), CodegenError> {
    let name = property_address_name(protocol, &property.name);
    if compiler.module.get_function(&name).is_some() {
        return Ok(());
    }

    let self_type = compiler.convert_type(&StoredType::Custom(protocol.to_string()))?;
    let address_type = compiler
        .convert_type(&property.type_)?
        .ptr_type(AddressSpace::default());
    let function = compiler.module.add_function(
        &name,
        address_type.fn_type(&[self_type.into()], false),
        Some(Linkage::External),
    );
    if let Some(param) = function.get_first_param() {
        param.set_name(SELF_BINDING);
    }

    Ok(())
}

/// Emits the initializer, methods and conformance stubs of every record type.
pub fn emit_types(compiler: &mut Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    for type_ in &file.custom_types {
        let self_type = StoredType::Custom(type_.name.clone());

        let init = compiler.get_function(&type_.name)?;
        emit_body(
            compiler,
            init,
            &type_.init_method.prototype,
            Receiver::Allocated(type_),
            type_.init_method.typed_body(),
        )?;

        for function in &type_.functions {
            let llvm_function =
                compiler.get_function(&method_name(&type_.name, &function.prototype.name))?;
            emit_body(
                compiler,
                llvm_function,
                &function.prototype,
                Receiver::Parameter(self_type.clone()),
                function.typed_body(),
            )?;
        }

        for (protocol, prototype) in &type_.protocol_conformance_stubs {
            emit_member_stub(compiler, type_, protocol, prototype)?;
        }

        tracing::debug!(type_ = %type_.name, "emitted record type");
    }

    Ok(())
}

pub fn emit_functions(compiler: &mut Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    for function in &file.functions {
        let llvm_function = compiler.get_function(&function.prototype.name)?;
        emit_body(
            compiler,
            llvm_function,
            &function.prototype,
            Receiver::None,
            function.typed_body(),
        )?;
    }

    Ok(())
}

/// Emits `main`, which runs the top-level expressions and returns 0.
pub fn emit_main(compiler: &mut Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    let i32_type = compiler.context.i32_type();
    let function = compiler
        .module
        .add_function("main", i32_type.fn_type(&[], false), None);
    compiler.start_function(function);

    compiler.variables.start_frame();
    compiler.return_target = None;

    gen_block(compiler, &file.typed_expressions)?;
    if !compiler.block_terminated() {
        compiler
            .builder
            .build_return(Some(&i32_type.const_zero()))?;
    }

    compiler.variables.end_frame();
    Ok(())
}

/// A conformance stub forwards to the protocol's default body, passing
/// `self` as a `proto*`.
fn emit_member_stub(
    compiler: &mut Compiler<'_>,
    type_: &TypeDefinition,
    protocol: &str,
    prototype: &Prototype,
) -> Result<(), CodegenError> {
    let function = compiler.get_function(&method_name(&type_.name, &prototype.name))?;
    let default = compiler.get_function(&default_name(protocol, &prototype.name))?;
    compiler.start_function(function);

    match build_call(
        compiler,
        default,
        function.get_params(),
        &prototype.return_type,
    )? {
        Lowered::Value(value, _) => compiler.builder.build_return(Some(&value))?,
        _ => compiler.builder.build_return(None)?,
    };

    Ok(())
}

/// Emits a function body with a single `return` block.
///
/// A `return` stores into the `.return` slot and branches to that block,
/// which loads the slot and returns it. Parameters are bound as values;
/// those the body assigns to are copied into stack slots first.
///
/// # Arguments
///
/// * `function` - The declared LLVM function to fill in
/// * `prototype` - Its source signature, without `self`
/// * `receiver` - Where `self` comes from
/// * `body` - The typed body
pub fn emit_body<'a>(
    compiler: &mut Compiler<'a>,
    function: FunctionValue<'a>,
    prototype: &Prototype,
    receiver: Receiver<'_>,
    body: &[TypedExpr],
) -> Result<(), CodegenError> {
    compiler.start_function(function);
    let return_block = compiler.create_basic_block("return", function);
    compiler.variables.start_frame();

    let slot = match &prototype.return_type {
        StoredType::Void => None,
        return_type => {
            let slot_type = compiler.convert_type(return_type)?;
            let slot = compiler.builder.build_alloca(slot_type, RETURN_BINDING)?;
            Some((slot, slot_type))
        }
    };
    compiler.return_target = Some(ReturnTarget {
        block: return_block,
        slot,
    });

    let mut params = function.get_param_iter();
    match receiver {
        Receiver::None => {}
        Receiver::Parameter(self_type) => {
            let value = params
                .next()
                .ok_or_else(|| CodegenError::WrongNumberOfArgs {
                    function: prototype.name.clone(),
                    expected: prototype.params.len() + 1,
                    received: 0,
                })?;
            compiler
                .variables
                .add_static(SELF_BINDING, Lowered::Value(value, self_type));
        }
        Receiver::Allocated(type_) => {
            let self_value = allocate_record(compiler, type_)?;
            compiler.variables.add_static(
                SELF_BINDING,
                Lowered::Value(self_value.into(), StoredType::Custom(type_.name.clone())),
            );
        }
    }

    let assigned = assigned_names(body);
    for (value, param) in params.zip(prototype.params.iter()) {
        if !assigned.contains(&param.name) {
            compiler
                .variables
                .add_static(&param.name, Lowered::Value(value, param.type_.clone()));
            continue;
        }

        let param_slot = compiler
            .builder
            .build_alloca(value.get_type(), &param.name)?;
        compiler.builder.build_store(param_slot, value)?;
        compiler.variables.add_variable(
            &param.name,
            Lowered::Address(param_slot, param.type_.clone()),
        );
    }

    gen_block(compiler, body)?;
    if !compiler.block_terminated() {
        if prototype.return_type.is_void() {
            compiler.builder.build_unconditional_branch(return_block)?;
        } else {
            // Every path already returned
            compiler.builder.build_unreachable()?;
        }
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

    compiler.variables.end_frame();
    compiler.return_target = None;

    tracing::trace!(function = %function.get_name().to_string_lossy(), "emitted body");
    Ok(())
}

/// Heap-allocates a record and writes its header: the type tag and a zero
/// reference count.
fn allocate_record<'a>(
    compiler: &Compiler<'a>,
    type_: &TypeDefinition,
) -> Result<PointerValue<'a>, CodegenError> {
    let tag = type_
        .tag
        .ok_or_else(|| CodegenError::UnknownType(type_.name.clone()))?;
    let struct_type = compiler.struct_type(&type_.name)?;
    let i32_type = compiler.context.i32_type();

    let record = compiler.builder.build_malloc(struct_type, SELF_BINDING)?;

    let tag_slot = compiler.builder.build_struct_gep(record, TAG_FIELD, "tag")?;
    compiler
        .builder
        .build_store(tag_slot, i32_type.const_int(u64::from(tag), false))?;

    let refcount_slot = compiler
        .builder
        .build_struct_gep(record, REFCOUNT_FIELD, "refcount")?;
    compiler
        .builder
        .build_store(refcount_slot, i32_type.const_zero())?;

    Ok(record)
}

/// Names of the variables that `body` assigns to.
fn assigned_names(body: &[TypedExpr]) -> HashSet<String> {
    let mut names = HashSet::new();
    collect_all(body, &mut names);
    names
}

fn collect_all(exprs: &[TypedExpr], names: &mut HashSet<String>) {
    for expr in exprs {
        collect_assigned(expr, names);
    }
}

fn collect_assigned(expr: &TypedExpr, names: &mut HashSet<String>) {
    match &expr.kind {
        TypedExprKind::Assignment(target, value) => {
            if let TypedExprKind::Variable(name) = &target.kind {
                names.insert(name.clone());
            }
            collect_assigned(target, names);
            collect_assigned(value, names);
        }
        TypedExprKind::Binary(lhs, _, rhs) | TypedExprKind::Logical(lhs, _, rhs) => {
            collect_assigned(lhs, names);
            collect_assigned(rhs, names);
        }
        TypedExprKind::If(condition, thens, elses) => {
            collect_assigned(condition, names);
            collect_all(thens, names);
            collect_all(elses, names);
        }
        TypedExprKind::For(init, condition, body) => {
            collect_assigned(init, names);
            collect_assigned(condition, names);
            collect_all(body, names);
        }
        TypedExprKind::While(condition, body) => {
            collect_assigned(condition, names);
            collect_all(body, names);
        }
        TypedExprKind::MemberProperty(instance, _) => collect_assigned(instance, names),
        TypedExprKind::MemberCall(instance, call) => {
            collect_assigned(instance, names);
            for arg in &call.args {
                collect_assigned(&arg.expr, names);
            }
        }
        TypedExprKind::Call(call) => {
            for arg in &call.args {
                collect_assigned(&arg.expr, names);
            }
        }
        TypedExprKind::Return(Some(value)) => collect_assigned(value, names),
        TypedExprKind::Return(None)
        | TypedExprKind::Literal(_)
        | TypedExprKind::Variable(_)
        | TypedExprKind::VariableDefinition(_) => {}
    }
}
