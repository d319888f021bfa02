//! Control flow lowering: blocks, `if`, loops and `return`.

use crate::{errors::errors::CodegenError, type_checker::typed_ast::TypedExpr};

use super::{
    compiler::Compiler,
    expr::{coerce, gen_expression, gen_value, truthify, Lowered},
};

/// Emits `exprs` in order, stopping after the first one that terminates the
/// current block.
pub fn gen_block<'a>(compiler: &mut Compiler<'a>, exprs: &[TypedExpr]) -> Result<(), CodegenError> {
    for expr in exprs {
        gen_expression(compiler, expr)?;

        if compiler.block_terminated() {
            break;
        }
    }

    Ok(())
}

pub fn gen_if<'a>(
    compiler: &mut Compiler<'a>,
    condition: &TypedExpr,
    thens: &[TypedExpr],
    elses: &[TypedExpr],
) -> Result<Lowered<'a>, CodegenError> {
    let condition = gen_value(compiler, condition)?;
    let condition = truthify(compiler, condition)?;

    let function = compiler.current_function()?;
    let then_block = compiler.create_basic_block("then", function);
    let else_block = compiler.create_basic_block("else", function);
    let merge_block = compiler.create_basic_block("merge", function);

    compiler
        .builder
        .build_conditional_branch(condition, then_block, else_block)?;

    for (block, body) in [(then_block, thens), (else_block, elses)] {
        compiler.builder.position_at_end(block);
        gen_block(compiler, body)?;

        // A branch that returned has already left the function
        if !compiler.block_terminated() {
            compiler.builder.build_unconditional_branch(merge_block)?;
        }
    }

    compiler.builder.position_at_end(merge_block);
    Ok(Lowered::Void)
}

pub fn gen_for<'a>(
    compiler: &mut Compiler<'a>,
    init: &TypedExpr,
    condition: &TypedExpr,
    body: &[TypedExpr],
) -> Result<Lowered<'a>, CodegenError> {
    gen_expression(compiler, init)?;
    gen_loop(compiler, condition, body)
}

pub fn gen_while<'a>(
    compiler: &mut Compiler<'a>,
    condition: &TypedExpr,
    body: &[TypedExpr],
) -> Result<Lowered<'a>, CodegenError> {
    gen_loop(compiler, condition, body)
}

/// Both loop forms share one shape: `cond` tests the condition and enters
/// either `body` or `cleanup`, and `body` jumps back to `cond`.
fn gen_loop<'a>(
    compiler: &mut Compiler<'a>,
    condition: &TypedExpr,
    body: &[TypedExpr],
) -> Result<Lowered<'a>, CodegenError> {
    let function = compiler.current_function()?;
    let cond_block = compiler.create_basic_block("cond", function);
    let body_block = compiler.create_basic_block("body", function);
    let cleanup_block = compiler.create_basic_block("cleanup", function);

    compiler.builder.build_unconditional_branch(cond_block)?;

    compiler.builder.position_at_end(cond_block);
    let check = gen_value(compiler, condition)?;
    let check = truthify(compiler, check)?;
    compiler
        .builder
        .build_conditional_branch(check, body_block, cleanup_block)?;

    compiler.builder.position_at_end(body_block);
    gen_block(compiler, body)?;
    if !compiler.block_terminated() {
        compiler.builder.build_unconditional_branch(cond_block)?;
    }

    compiler.builder.position_at_end(cleanup_block);
    Ok(Lowered::Void)
}

/// Stores the returned value in `.return` and jumps to the return block.
pub fn gen_return<'a>(
    compiler: &mut Compiler<'a>,
    value: Option<&TypedExpr>,
) -> Result<Lowered<'a>, CodegenError> {
    let target = compiler
        .return_target
        .ok_or(CodegenError::ReturnOutsideFunction)?;

    if let Some(value) = value {
        let value = gen_value(compiler, value)?;

        if let Some((slot, slot_type)) = target.slot {
            let value = coerce(compiler, value, slot_type)?;
            compiler.builder.build_store(slot, value)?;
        }
    }

    compiler.builder.build_unconditional_branch(target.block)?;
    Ok(Lowered::Void)
}
