use inkwell::{
    types::{AnyType, BasicTypeEnum},
    values::{BasicMetadataValueEnum, BasicValueEnum, FunctionValue, IntValue, PointerValue},
    FloatPredicate, IntPredicate,
};

use crate::{
    ast::{
        ast::Prototype,
        expressions::{BinaryOperator, LiteralValue, LogicalOperator},
        types::StoredType,
    },
    errors::errors::CodegenError,
    type_checker::typed_ast::{TypedExpr, TypedExprKind, TypedFunctionCall},
};

use super::{
    compiler::Compiler,
    functions::{method_name, property_address_name},
    layout::field_index,
    stmt::{gen_for, gen_if, gen_return, gen_while},
};

/// The result of lowering one expression.
///
/// Anything assignable lowers to the address it lives at. `load_value` turns
/// either kind into a plain value.
#[derive(Debug, Clone)]
pub enum Lowered<'a> {
    Address(PointerValue<'a>, StoredType),
    Value(BasicValueEnum<'a>, StoredType),
    Void,
}

/// Reads the value behind a lowered expression.
///
/// An address must point at the LLVM type of its stored type; anything else
/// is an internal error.
pub fn load_value<'a>(
    compiler: &Compiler<'a>,
    lowered: Lowered<'a>,
) -> Result<BasicValueEnum<'a>, CodegenError> {
    match lowered {
        Lowered::Address(pointer, type_) => {
            let expected = compiler.convert_type(&type_)?;
            if pointer.get_type().get_element_type() != expected.as_any_type_enum() {
                return Err(CodegenError::UnknownType(type_.to_string()));
            }

            Ok(compiler.builder.build_load(pointer, "")?)
        }
        Lowered::Value(value, _) => Ok(value),
        Lowered::Void => Err(CodegenError::UnknownType(StoredType::Void.to_string())),
    }
}

/// Casts a record pointer to the pointer type expected at a protocol-typed
/// slot. Every other value passes through unchanged.
pub fn coerce<'a>(
    compiler: &Compiler<'a>,
    value: BasicValueEnum<'a>,
    expected: BasicTypeEnum<'a>,
) -> Result<BasicValueEnum<'a>, CodegenError> {
    match (value, expected) {
        (BasicValueEnum::PointerValue(pointer), BasicTypeEnum::PointerType(pointer_type))
            if pointer.get_type() != pointer_type =>
        {
            Ok(compiler
                .builder
                .build_pointer_cast(pointer, pointer_type, "cast")?
                .into())
        }
        _ => Ok(value),
    }
}

/// Narrows an integer or floating point value to an `i1` that is set when
/// the value is non-zero.
pub fn truthify<'a>(
    compiler: &Compiler<'a>,
    value: BasicValueEnum<'a>,
) -> Result<IntValue<'a>, CodegenError> {
    match value {
        BasicValueEnum::IntValue(int) => Ok(compiler.builder.build_int_compare(
            IntPredicate::NE,
            int,
            int.get_type().const_zero(),
            "truthy",
        )?),
        BasicValueEnum::FloatValue(float) => Ok(compiler.builder.build_float_compare(
            FloatPredicate::ONE,
            float,
            float.get_type().const_zero(),
            "truthy",
        )?),
        other => Err(CodegenError::NonTruthyType(type_name(other))),
    }
}

fn type_name(value: BasicValueEnum) -> String {
    value.get_type().print_to_string().to_string()
}

/// Generates LLVM IR for the given expression.
pub fn gen_expression<'a>(
    compiler: &mut Compiler<'a>,
    expression: &TypedExpr,
) -> Result<Lowered<'a>, CodegenError> {
    match &expression.kind {
        TypedExprKind::Literal(literal) => gen_literal(compiler, literal),
        TypedExprKind::Variable(name) => compiler
            .variables
            .lookup(name)
            .cloned()
            .ok_or_else(|| CodegenError::UnknownVariable(name.clone())),
        TypedExprKind::VariableDefinition(definition) => {
            let slot = compiler.create_entry_block_alloca(
                compiler.convert_type(&definition.type_)?,
                &definition.name,
            )?;

            let lowered = Lowered::Address(slot, definition.type_.clone());
            compiler
                .variables
                .add_variable(&definition.name, lowered.clone());
            Ok(lowered)
        }
        TypedExprKind::MemberProperty(instance, property) => {
            gen_member_property(compiler, instance, property, &expression.type_)
        }
        TypedExprKind::MemberCall(instance, call) => {
            gen_member_call(compiler, instance, call, &expression.type_)
        }
        TypedExprKind::Call(call) => {
            let prototype = compiler
                .globals
                .get(&call.name)
                .cloned()
                .ok_or_else(|| CodegenError::UnknownFunction(call.name.clone()))?;
            validate_call(&prototype, call)?;

            let function = compiler.get_function(&call.name)?;
            let args = gen_args(compiler, call)?;
            build_call(compiler, function, args, &expression.type_)
        }
        TypedExprKind::Assignment(target, value) => gen_assignment(compiler, target, value),
        TypedExprKind::Binary(lhs, operator, rhs) => {
            gen_binary(compiler, lhs, *operator, rhs, &expression.type_)
        }
        TypedExprKind::Logical(lhs, operator, rhs) => gen_logical(compiler, lhs, *operator, rhs),
        TypedExprKind::If(condition, thens, elses) => gen_if(compiler, condition, thens, elses),
        TypedExprKind::For(init, condition, body) => gen_for(compiler, init, condition, body),
        TypedExprKind::While(condition, body) => gen_while(compiler, condition, body),
        TypedExprKind::Return(value) => gen_return(compiler, value.as_deref()),
    }
}

/// Lowers `expression` and loads its value.
pub fn gen_value<'a>(
    compiler: &mut Compiler<'a>,
    expression: &TypedExpr,
) -> Result<BasicValueEnum<'a>, CodegenError> {
    let lowered = gen_expression(compiler, expression)?;
    load_value(compiler, lowered)
}

fn gen_literal<'a>(
    compiler: &Compiler<'a>,
    literal: &LiteralValue,
) -> Result<Lowered<'a>, CodegenError> {
    let value: BasicValueEnum<'a> = match literal {
        LiteralValue::Int(value) => compiler
            .context
            .i64_type()
            .const_int(*value as u64, true)
            .into(),
        LiteralValue::Float(value) => compiler
            .context
            .f32_type()
            .const_float(f64::from(*value))
            .into(),
        LiteralValue::Double(value) => compiler.context.f64_type().const_float(*value).into(),
        LiteralValue::String(value) => compiler
            .builder
            .build_global_string_ptr(value, "str")?
            .as_pointer_value()
            .into(),
    };

    Ok(Lowered::Value(value, literal.stored_type()))
}

fn as_pointer<'a>(
    value: BasicValueEnum<'a>,
    type_: &StoredType,
) -> Result<PointerValue<'a>, CodegenError> {
    match value {
        BasicValueEnum::PointerValue(pointer) => Ok(pointer),
        _ => Err(CodegenError::UnknownType(type_.to_string())),
    }
}

/// Records expose their fields directly. Protocol values go through
/// `P.p.address`, since the field's position depends on the record type.
fn gen_member_property<'a>(
    compiler: &mut Compiler<'a>,
    instance: &TypedExpr,
    property: &str,
    type_: &StoredType,
) -> Result<Lowered<'a>, CodegenError> {
    let receiver = gen_value(compiler, instance)?;
    let receiver = as_pointer(receiver, &instance.type_)?;

    let owner = instance.type_.name();
    if compiler.registry.get_protocol(owner).is_some() {
        let accessor = compiler.get_function(&property_address_name(owner, property))?;
        let call = compiler
            .builder
            .build_call(accessor, &[receiver.into()], property)?;

        return match call.try_as_basic_value().left() {
            Some(BasicValueEnum::PointerValue(slot)) => Ok(Lowered::Address(slot, type_.clone())),
            _ => Err(CodegenError::UnknownMember {
                type_: owner.to_string(),
                member: property.to_string(),
            }),
        };
    }

    let index = compiler
        .registry
        .get_type(owner)
        .and_then(|definition| definition.property_index(property))
        .ok_or_else(|| CodegenError::UnknownMember {
            type_: owner.to_string(),
            member: property.to_string(),
        })?;

    let slot = compiler
        .builder
        .build_struct_gep(receiver, field_index(index), property)?;

    Ok(Lowered::Address(slot, type_.clone()))
}

/// Calls `T.m` on a record or the dispatcher `P.m` on a protocol value.
fn gen_member_call<'a>(
    compiler: &mut Compiler<'a>,
    instance: &TypedExpr,
    call: &TypedFunctionCall,
    type_: &StoredType,
) -> Result<Lowered<'a>, CodegenError> {
    let owner = instance.type_.name().to_string();
    let receiver = gen_value(compiler, instance)?;

    let prototype = compiler
        .registry
        .find_prototype(&owner, &call.name)
        .cloned()
        .ok_or_else(|| CodegenError::UnknownMember {
            type_: owner.clone(),
            member: call.name.clone(),
        })?;
    validate_call(&prototype, call)?;

    let function = compiler.get_function(&method_name(&owner, &call.name))?;

    let mut args = vec![receiver];
    args.extend(gen_args(compiler, call)?);
    build_call(compiler, function, args, type_)
}

/// Arguments must match the parameters in number and label.
fn validate_call(prototype: &Prototype, call: &TypedFunctionCall) -> Result<(), CodegenError> {
    if prototype.params.len() != call.args.len() {
        return Err(CodegenError::WrongNumberOfArgs {
            function: prototype.name.clone(),
            expected: prototype.params.len(),
            received: call.args.len(),
        });
    }

    for (param, arg) in prototype.params.iter().zip(call.args.iter()) {
        if arg.label.as_deref() != Some(param.name.as_str()) {
            return Err(CodegenError::IncorrectFunctionLabel {
                function: prototype.name.clone(),
                expected: param.name.clone(),
                received: arg.label.clone().unwrap_or_default(),
            });
        }
    }

    Ok(())
}

fn gen_args<'a>(
    compiler: &mut Compiler<'a>,
    call: &TypedFunctionCall,
) -> Result<Vec<BasicValueEnum<'a>>, CodegenError> {
    call.args
        .iter()
        .map(|arg| gen_value(compiler, &arg.expr))
        .collect()
}

/// Builds a call, casting record pointers passed for protocol parameters.
/// Variadic arguments are passed as they are.
pub fn build_call<'a>(
    compiler: &Compiler<'a>,
    function: FunctionValue<'a>,
    args: Vec<BasicValueEnum<'a>>,
    return_type: &StoredType,
) -> Result<Lowered<'a>, CodegenError> {
    let params = function.get_params();

    let mut call_args: Vec<BasicMetadataValueEnum<'a>> = vec![];
    for (index, arg) in args.into_iter().enumerate() {
        let arg = match params.get(index) {
            Some(param) => coerce(compiler, arg, param.get_type())?,
            None => arg,
        };
        call_args.push(arg.into());
    }

    let call = compiler.builder.build_call(function, &call_args, "")?;

    Ok(match call.try_as_basic_value().left() {
        Some(value) => Lowered::Value(value, return_type.clone()),
        None => Lowered::Void,
    })
}

fn gen_assignment<'a>(
    compiler: &mut Compiler<'a>,
    target: &TypedExpr,
    value: &TypedExpr,
) -> Result<Lowered<'a>, CodegenError> {
    let Lowered::Address(slot, type_) = gen_expression(compiler, target)? else {
        let name = match &target.kind {
            TypedExprKind::Variable(name) => name.clone(),
            _ => target.type_.to_string(),
        };
        return Err(CodegenError::UnknownVariable(name));
    };

    let value = gen_value(compiler, value)?;
    let value = coerce(compiler, value, compiler.convert_type(&type_)?)?;
    compiler.builder.build_store(slot, value)?;

    Ok(Lowered::Void)
}

fn gen_binary<'a>(
    compiler: &mut Compiler<'a>,
    lhs: &TypedExpr,
    operator: BinaryOperator,
    rhs: &TypedExpr,
    type_: &StoredType,
) -> Result<Lowered<'a>, CodegenError> {
    let lhs = gen_value(compiler, lhs)?;
    let rhs = gen_value(compiler, rhs)?;
    let builder = &compiler.builder;

    let value: BasicValueEnum<'a> = match (lhs, rhs) {
        (BasicValueEnum::IntValue(lhs), BasicValueEnum::IntValue(rhs)) => match operator {
            BinaryOperator::Plus => builder.build_int_add(lhs, rhs, "addtmp")?,
            BinaryOperator::Minus => builder.build_int_sub(lhs, rhs, "subtmp")?,
            BinaryOperator::Times => builder.build_int_mul(lhs, rhs, "multmp")?,
            BinaryOperator::Divide => builder.build_int_signed_div(lhs, rhs, "divtmp")?,
            BinaryOperator::Mod => builder.build_int_signed_rem(lhs, rhs, "modtmp")?,
        }
        .into(),
        (BasicValueEnum::FloatValue(lhs), BasicValueEnum::FloatValue(rhs)) => match operator {
            BinaryOperator::Plus => builder.build_float_add(lhs, rhs, "addtmp")?,
            BinaryOperator::Minus => builder.build_float_sub(lhs, rhs, "subtmp")?,
            BinaryOperator::Times => builder.build_float_mul(lhs, rhs, "multmp")?,
            BinaryOperator::Divide => builder.build_float_div(lhs, rhs, "divtmp")?,
            BinaryOperator::Mod => builder.build_float_rem(lhs, rhs, "modtmp")?,
        }
        .into(),
        (lhs, rhs) => {
            return Err(CodegenError::UnableToCompare(
                type_name(lhs),
                type_name(rhs),
            ))
        }
    };

    Ok(Lowered::Value(value, type_.clone()))
}

fn predicates(operator: LogicalOperator) -> Option<(IntPredicate, FloatPredicate)> {
    match operator {
        LogicalOperator::And | LogicalOperator::Or => None,
        LogicalOperator::Equals => Some((IntPredicate::EQ, FloatPredicate::OEQ)),
        LogicalOperator::NotEqual => Some((IntPredicate::NE, FloatPredicate::ONE)),
        LogicalOperator::LessThan => Some((IntPredicate::SLT, FloatPredicate::OLT)),
        LogicalOperator::LessThanOrEqual => Some((IntPredicate::SLE, FloatPredicate::OLE)),
        LogicalOperator::GreaterThan => Some((IntPredicate::SGT, FloatPredicate::OGT)),
        LogicalOperator::GreaterThanOrEqual => Some((IntPredicate::SGE, FloatPredicate::OGE)),
    }
}

/// Comparisons and `&&`/`||` produce an `i1` that is widened to `Int`.
fn gen_logical<'a>(
    compiler: &mut Compiler<'a>,
    lhs: &TypedExpr,
    operator: LogicalOperator,
    rhs: &TypedExpr,
) -> Result<Lowered<'a>, CodegenError> {
    let lhs = gen_value(compiler, lhs)?;
    let rhs = gen_value(compiler, rhs)?;
    let builder = &compiler.builder;

    let result = match (predicates(operator), lhs, rhs) {
        (None, lhs, rhs) => {
            let lhs = truthify(compiler, lhs)?;
            let rhs = truthify(compiler, rhs)?;
            if operator == LogicalOperator::And {
                builder.build_and(lhs, rhs, "andtmp")?
            } else {
                builder.build_or(lhs, rhs, "ortmp")?
            }
        }
        (
            Some((predicate, _)),
            BasicValueEnum::IntValue(lhs),
            BasicValueEnum::IntValue(rhs),
        ) => builder.build_int_compare(predicate, lhs, rhs, "cmptmp")?,
        (
            Some((_, predicate)),
            BasicValueEnum::FloatValue(lhs),
            BasicValueEnum::FloatValue(rhs),
        ) => builder.build_float_compare(predicate, lhs, rhs, "cmptmp")?,
        (Some(_), lhs, rhs) => {
            return Err(CodegenError::UnableToCompare(
                type_name(lhs),
                type_name(rhs),
            ))
        }
    };

    let widened = builder.build_int_z_extend(result, compiler.context.i64_type(), "booltmp")?;
    Ok(Lowered::Value(widened.into(), StoredType::Int))
}
