//! Runtime support emitted into every module.
//!
//! This module declares the C functions generated code relies on and emits
//! the two helpers written directly in IR:
//!
//! - `.copyStr(from, to, n)` copies `n` bytes between buffers
//! - `scanLine()` reads a whitespace-delimited word of any length from stdin

use inkwell::{
    module::Linkage,
    values::{BasicValueEnum, IntValue, PointerValue},
    AddressSpace, IntPredicate,
};

use crate::{ast::ast::File, errors::errors::CodegenError};

use super::compiler::Compiler;

/// Name of the byte copy helper. The leading dot keeps it out of the
/// source namespace.
pub const COPY_STR: &str = ".copyStr";
pub const SCAN_LINE: &str = "scanLine";

/// Bytes read by a single `scanf` call, excluding the terminator.
const SCAN_CHUNK: u64 = 19;

/// Declares the variadic `printf` and `scanf`: `i32 (i8*, ...)`.
pub fn declare_io_functions(compiler: &Compiler<'_>) {
    let i8_ptr_type = compiler.context.i8_type().ptr_type(AddressSpace::default());
    let io_type = compiler
        .context
        .i32_type()
        .fn_type(&[i8_ptr_type.into()], true);

    for name in ["printf", "scanf"] {
        if compiler.module.get_function(name).is_none() {
            compiler
                .module
                .add_function(name, io_type, Some(Linkage::External));
        }
    }
}

/// Declares every `extern` of the module that is not already present.
pub fn declare_externs(compiler: &Compiler<'_>, file: &File) -> Result<(), CodegenError> {
    for prototype in &file.externs {
        compiler.declare_function(&prototype.name, prototype, None)?;
    }

    Ok(())
}

fn byte_at<'a>(
    compiler: &Compiler<'a>,
    buffer: PointerValue<'a>,
    index: IntValue<'a>,
    name: &str,
) -> Result<PointerValue<'a>, CodegenError> {
    // SAFETY: the index stays within the buffer the caller allocated
    Ok(unsafe { compiler.builder.build_gep(buffer, &[index], name)? })
}

type CopyParams<'a> = (PointerValue<'a>, PointerValue<'a>, IntValue<'a>);

fn copy_params(values: Vec<BasicValueEnum<'_>>) -> Option<CopyParams<'_>> {
    match values.as_slice() {
        [BasicValueEnum::PointerValue(from), BasicValueEnum::PointerValue(to), BasicValueEnum::IntValue(count)] => {
            Some((*from, *to, *count))
        }
        _ => None,
    }
}

/// Emits `void .copyStr(i8* from, i8* to, i32 n)`.
///
/// Copies exactly `n` bytes, so a copy of zero bytes touches nothing.
pub fn emit_copy_str(compiler: &Compiler<'_>) -> Result<(), CodegenError> {
    let context = compiler.context;
    let i8_ptr_type = context.i8_type().ptr_type(AddressSpace::default());
    let i32_type = context.i32_type();

    let function = compiler.module.add_function(
        COPY_STR,
        context.void_type().fn_type(
            &[i8_ptr_type.into(), i8_ptr_type.into(), i32_type.into()],
            false,
        ),
        None,
    );
    compiler.start_function(function);

    let (from, to, count) =
        copy_params(function.get_params()).ok_or_else(|| CodegenError::WrongNumberOfArgs {
            function: COPY_STR.to_string(),
            expected: 3,
            received: function.count_params() as usize,
        })?;
    from.set_name("from");
    to.set_name("to");
    count.set_name("n");

    let cond_block = compiler.create_basic_block("cond", function);
    let copy_block = compiler.create_basic_block("copy", function);
    let return_block = compiler.create_basic_block("return", function);

    let index = compiler.builder.build_alloca(i32_type, "index")?;
    compiler.builder.build_store(index, i32_type.const_zero())?;
    compiler.builder.build_unconditional_branch(cond_block)?;

    compiler.builder.position_at_end(cond_block);
    let current = compiler.builder.build_load(index, "current")?.into_int_value();
    let more = compiler
        .builder
        .build_int_compare(IntPredicate::SLT, current, count, "more")?;
    compiler
        .builder
        .build_conditional_branch(more, copy_block, return_block)?;

    compiler.builder.position_at_end(copy_block);
    let source = byte_at(compiler, from, current, "source")?;
    let target = byte_at(compiler, to, current, "target")?;
    let byte = compiler.builder.build_load(source, "byte")?;
    compiler.builder.build_store(target, byte)?;
    let next = compiler
        .builder
        .build_int_add(current, i32_type.const_int(1, false), "next")?;
    compiler.builder.build_store(index, next)?;
    compiler.builder.build_unconditional_branch(cond_block)?;

    compiler.builder.position_at_end(return_block);
    compiler.builder.build_return(None)?;

    Ok(())
}

/// Emits `i8* scanLine()`.
///
/// Reads the next whitespace-delimited word from stdin in chunks of up to 19
/// bytes, growing a heap buffer by doubling until a chunk comes back short.
/// The result is NUL-terminated.
///
/// The first `scanf` uses `" %n%19s%n"`, which skips leading whitespace
/// before the first `%n`, so the stored length is the difference of the two
/// counters rather than the count of consumed characters. Later chunks use
/// `%[^ \t\n\r]`, which stops at whitespace instead of skipping it, so a
/// word that fills the last chunk exactly does not run into the next word.
pub fn emit_scan_line(compiler: &Compiler<'_>) -> Result<(), CodegenError> {
    let context = compiler.context;
    let builder = &compiler.builder;
    let i8_type = context.i8_type();
    let i8_ptr_type = i8_type.ptr_type(AddressSpace::default());
    let i32_type = context.i32_type();

    let function = compiler
        .module
        .add_function(SCAN_LINE, i8_ptr_type.fn_type(&[], false), None);
    compiler.start_function(function);

    let scanf = compiler.get_function("scanf")?;
    let copy_str = compiler.get_function(COPY_STR)?;

    let scan_block = compiler.create_basic_block("scan", function);
    let grow_block = compiler.create_basic_block("grow", function);
    let save_block = compiler.create_basic_block("save", function);
    let end_scan_block = compiler.create_basic_block("end_scan", function);
    let return_block = compiler.create_basic_block("return", function);

    let chunk_size = i32_type.const_int(SCAN_CHUNK + 1, false);
    let section = builder.build_alloca(i8_type.array_type((SCAN_CHUNK + 1) as u32), "section")?;
    let first_format = builder.build_global_string_ptr(" %n%19s%n", "scan_format")?;
    let next_format = builder.build_global_string_ptr("%n%19[^ \t\n\r]%n", "scan_next_format")?;
    let format = builder.build_alloca(i8_ptr_type, "format")?;
    let start = builder.build_alloca(i32_type, "start")?;
    let stop = builder.build_alloca(i32_type, "stop")?;
    let length = builder.build_alloca(i32_type, "length")?;
    let capacity = builder.build_alloca(i32_type, "capacity")?;
    let result = builder.build_alloca(i8_ptr_type, "result")?;

    let initial = builder.build_array_malloc(i8_type, chunk_size, "initial")?;
    builder.build_store(format, first_format.as_pointer_value())?;
    builder.build_store(length, i32_type.const_zero())?;
    builder.build_store(capacity, chunk_size)?;
    builder.build_store(result, initial)?;
    builder.build_unconditional_branch(scan_block)?;

    // scan: read one chunk and work out whether the buffer needs to grow
    builder.position_at_end(scan_block);
    builder.build_store(start, i32_type.const_zero())?;
    builder.build_store(stop, i32_type.const_zero())?;
    let section_start = builder.build_pointer_cast(section, i8_ptr_type, "section_start")?;
    let current_format = builder.build_load(format, "current_format")?;
    builder.build_call(
        scanf,
        &[
            current_format.into(),
            start.into(),
            section_start.into(),
            stop.into(),
        ],
        "",
    )?;
    let start_count = builder.build_load(start, "start_count")?.into_int_value();
    let stop_count = builder.build_load(stop, "stop_count")?.into_int_value();
    let raw_count = builder.build_int_sub(stop_count, start_count, "raw_count")?;
    // A failed conversion leaves the second counter unset
    let stored_any = builder.build_int_compare(
        IntPredicate::SGT,
        raw_count,
        i32_type.const_zero(),
        "stored_any",
    )?;
    let stored = builder
        .build_select(stored_any, raw_count, i32_type.const_zero(), "stored")?
        .into_int_value();
    let old_length = builder.build_load(length, "old_length")?.into_int_value();
    let new_length = builder.build_int_add(old_length, stored, "new_length")?;
    builder.build_store(length, new_length)?;
    let needed = builder.build_int_add(new_length, i32_type.const_int(1, false), "needed")?;
    let current_capacity = builder.build_load(capacity, "current_capacity")?.into_int_value();
    let needs_space =
        builder.build_int_compare(IntPredicate::SGT, needed, current_capacity, "needs_space")?;
    builder.build_conditional_branch(needs_space, grow_block, save_block)?;

    // grow: double the buffer and move the bytes read so far
    builder.position_at_end(grow_block);
    let old_buffer = builder.build_load(result, "old_buffer")?.into_pointer_value();
    let new_capacity = builder.build_int_mul(
        current_capacity,
        i32_type.const_int(2, false),
        "new_capacity",
    )?;
    let new_buffer = builder.build_array_malloc(i8_type, new_capacity, "new_buffer")?;
    builder.build_call(
        copy_str,
        &[old_buffer.into(), new_buffer.into(), old_length.into()],
        "",
    )?;
    builder.build_store(capacity, new_capacity)?;
    builder.build_store(result, new_buffer)?;
    builder.build_free(old_buffer)?;
    builder.build_unconditional_branch(save_block)?;

    // save: append the chunk and terminate the string
    builder.position_at_end(save_block);
    let buffer = builder.build_load(result, "buffer")?.into_pointer_value();
    let append_at = byte_at(compiler, buffer, old_length, "append_at")?;
    builder.build_call(
        copy_str,
        &[section_start.into(), append_at.into(), stored.into()],
        "",
    )?;
    let end = byte_at(compiler, buffer, new_length, "end")?;
    builder.build_store(end, i8_type.const_zero())?;
    builder.build_store(format, next_format.as_pointer_value())?;
    builder.build_unconditional_branch(end_scan_block)?;

    // end_scan: a full chunk means the word may continue
    builder.position_at_end(end_scan_block);
    let full = builder.build_int_compare(
        IntPredicate::EQ,
        stored,
        i32_type.const_int(SCAN_CHUNK, false),
        "full",
    )?;
    builder.build_conditional_branch(full, scan_block, return_block)?;

    builder.position_at_end(return_block);
    let line = builder.build_load(result, "line")?;
    builder.build_return(Some(&line))?;

    Ok(())
}
