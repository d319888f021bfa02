//! Main compiler module.
//!
//! This module contains the core Compiler structure and drives the
//! compilation pipeline from a checked module to LLVM IR. It owns the LLVM
//! context handles, maps stored types onto LLVM types, and runs the target
//! setup and verification at the end.

use std::collections::HashMap;

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple},
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType},
    values::{FunctionValue, PointerValue},
    AddressSpace, OptimizationLevel,
};

use crate::{
    ast::{
        ast::{File, Prototype},
        types::StoredType,
    },
    errors::errors::CodegenError,
    scope::symbol_table::SymbolTable,
    type_checker::registry::Registry,
};

use super::{
    dispatch::emit_protocol_functions,
    expr::Lowered,
    functions::{declare_functions, emit_functions, emit_main, emit_types},
    layout::define_types,
    stdlib::{declare_externs, declare_io_functions, emit_copy_str, emit_scan_line},
};

/// Settings for a single compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name given to the LLVM module
    pub module_name: String,
    /// Target triple to compile for, the host triple when `None`
    pub target_triple: Option<String>,
    /// Whether to verify the module once it is emitted
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            module_name: String::from("main"),
            target_triple: None,
            verify: true,
        }
    }
}

/// Where `return` stores its value and where it branches to.
#[derive(Debug, Clone, Copy)]
pub struct ReturnTarget<'a> {
    pub block: BasicBlock<'a>,
    /// The `.return` slot and its type, absent for `Void` functions
    pub slot: Option<(PointerValue<'a>, BasicTypeEnum<'a>)>,
}

/// The main compiler structure that holds the state of the compilation process.
///
/// This structure manages all aspects of LLVM code generation, including:
/// - The LLVM context, module, and builder
/// - The registry of record types and protocols
/// - The LLVM struct type behind every custom type name
/// - The values and addresses bound to names in the current function
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the LLVM context
pub struct Compiler<'a> {
    /// Record types and protocols of the module being compiled
    pub registry: Registry,
    /// Every file-scope prototype by name
    pub globals: HashMap<String, Prototype>,

    /// Map of custom type names to their LLVM struct types. Every protocol
    /// maps to `proto_type`.
    pub named_structs: HashMap<String, StructType<'a>>,
    /// The header-only struct shared by all protocols
    pub proto_type: StructType<'a>,
    /// Parameters (as values) and locals (as addresses) in scope
    pub variables: SymbolTable<Lowered<'a>>,
    /// Return block of the function being emitted, `None` in `main`
    pub return_target: Option<ReturnTarget<'a>>,

    /// Reference to the LLVM context
    pub context: &'a Context,
    /// The LLVM module being built
    pub module: Module<'a>,
    /// The LLVM IR builder
    pub builder: Builder<'a>,
}

impl<'a> Compiler<'a> {
    /// Creates a new Compiler instance.
    ///
    /// # Arguments
    ///
    /// * `file` - The checked module. It only seeds the type registry and the
    ///   global prototype map; no code is emitted for it here
    /// * `context` - Reference to the LLVM context that owns the module
    /// * `module_name` - Name of the LLVM module
    ///
    /// # Returns
    ///
    /// A new Compiler with an empty module, ready to generate code.
    pub fn new(file: &File, context: &'a Context, module_name: &str) -> Self {
        let proto_type = context.opaque_struct_type("proto");
        proto_type.set_body(
            &[context.i32_type().into(), context.i32_type().into()],
            false,
        );

        Compiler {
            registry: Registry::new(file),
            globals: file.prototype_map.clone(),
            named_structs: HashMap::new(),
            proto_type,
            variables: SymbolTable::new(),
            return_target: None,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            context,
        }
    }

    /// Runs the verifier pass over the module.
    ///
    /// No optimization passes are added; the backend tools handle that.
    fn run_passes(&self) {
        let fpm = PassManager::create(());

        fpm.add_verifier_pass();

        fpm.run_on(&self.module);
    }

    /// Sets the module triple and data layout for the configured target.
    ///
    /// # Arguments
    ///
    /// * `target_triple` - Triple to compile for, or the host's default
    ///
    /// # Returns
    ///
    /// An error if LLVM does not know the target.
    fn set_target(&self, target_triple: Option<&str>) -> Result<(), CodegenError> {
        Target::initialize_all(&InitializationConfig::default());

        let target_triple = match target_triple {
            Some(triple) => TargetTriple::create(triple),
            None => TargetMachine::get_default_triple(),
        };
        let target = Target::from_triple(&target_triple)
            .map_err(|error| CodegenError::Target(error.to_string()))?;
        let target_machine = target
            .create_target_machine(
                &target_triple,
                "generic",
                "",
                OptimizationLevel::Aggressive,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| {
                CodegenError::Target(format!(
                    "unable to create a target machine for {}",
                    target_triple.as_str().to_string_lossy()
                ))
            })?;

        self.module.set_triple(&target_triple);
        self.module
            .set_data_layout(&target_machine.get_target_data().get_data_layout());

        Ok(())
    }

    /// Emits every part of `file` into the module.
    ///
    /// The runtime helpers come first, then the record types, every
    /// function signature, the bodies, and finally `main`.
    fn emit(&mut self, file: &File) -> Result<(), CodegenError> {
        declare_io_functions(self);
        emit_copy_str(self)?;
        if file.prototype("scanLine").is_some() {
            emit_scan_line(self)?;
        }
        declare_externs(self, file)?;

        define_types(self, file)?;
        declare_functions(self, file)?;

        emit_types(self, file)?;
        emit_protocol_functions(self, file)?;
        emit_functions(self, file)?;
        emit_main(self, file)
    }

    /// Converts a stored type to an LLVM basic type.
    ///
    /// # Arguments
    ///
    /// * `type_` - The type to convert
    ///
    /// # Returns
    ///
    /// The corresponding LLVM BasicTypeEnum. `Void` has no basic type and
    /// is reported as an unknown type.
    pub fn convert_type(&self, type_: &StoredType) -> Result<BasicTypeEnum<'a>, CodegenError> {
        match type_ {
            StoredType::Int => Ok(self.context.i64_type().into()),
            StoredType::Float => Ok(self.context.f32_type().into()),
            StoredType::Double => Ok(self.context.f64_type().into()),
            StoredType::String => Ok(self
                .context
                .i8_type()
                .ptr_type(AddressSpace::default())
                .into()),
            StoredType::Custom(name) => Ok(self
                .struct_type(name)?
                .ptr_type(AddressSpace::default())
                .into()),
            StoredType::Void => Err(CodegenError::UnknownType(type_.to_string())),
        }
    }

    pub fn struct_type(&self, name: &str) -> Result<StructType<'a>, CodegenError> {
        self.named_structs
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::UnknownType(name.to_string()))
    }

    /// Builds the LLVM signature of `prototype`.
    ///
    /// # Arguments
    ///
    /// * `prototype` - The signature to convert
    /// * `self_type` - Type of the leading `self` parameter, for members
    pub fn function_type(
        &self,
        prototype: &Prototype,
        self_type: Option<&StoredType>,
    ) -> Result<FunctionType<'a>, CodegenError> {
        let mut params: Vec<BasicMetadataTypeEnum<'a>> = vec![];
        if let Some(self_type) = self_type {
            params.push(self.convert_type(self_type)?.into());
        }
        for param in &prototype.params {
            params.push(self.convert_type(&param.type_)?.into());
        }

        match &prototype.return_type {
            StoredType::Void => Ok(self.context.void_type().fn_type(&params, false)),
            return_type => Ok(self.convert_type(return_type)?.fn_type(&params, false)),
        }
    }

    /// Declares a function, reusing an existing declaration of the same name.
    ///
    /// Parameters are named after the prototype, with `self` first for members.
    pub fn declare_function(
        &self,
        name: &str,
        prototype: &Prototype,
        self_type: Option<&StoredType>,
    ) -> Result<FunctionValue<'a>, CodegenError> {
        if let Some(function) = self.module.get_function(name) {
            return Ok(function);
        }

        let function_type = self.function_type(prototype, self_type)?;
        let function = self
            .module
            .add_function(name, function_type, Some(Linkage::External));

        let names = self_type
            .map(|_| "self")
            .into_iter()
            .chain(prototype.params.iter().map(|param| param.name.as_str()));
        for (param, name) in function.get_param_iter().zip(names) {
            param.set_name(name);
        }

        Ok(function)
    }

    /// Looks up a function that must already be declared.
    pub fn get_function(&self, name: &str) -> Result<FunctionValue<'a>, CodegenError> {
        self.module
            .get_function(name)
            .ok_or_else(|| CodegenError::UnknownFunction(name.to_string()))
    }

    /// Starts the body of a declared function.
    ///
    /// Adds function attributes like 'uwtable' and 'nounwind', appends the
    /// entry block, and positions the builder at its end.
    ///
    /// # Arguments
    ///
    /// * `function` - The function to start
    ///
    /// # Returns
    ///
    /// The entry block
    pub fn start_function(&self, function: FunctionValue<'a>) -> BasicBlock<'a> {
        let attributes = [
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("uwtable"), 0),
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        ];

        for attribute in attributes.iter() {
            function.add_attribute(AttributeLoc::Function, *attribute);
        }

        let entry = self.create_basic_block("entry", function);
        self.builder.position_at_end(entry);
        entry
    }

    /// Creates a new basic block in the given function.
    ///
    /// # Arguments
    ///
    /// * `name` - Label name for the basic block
    /// * `function` - The function to append the block to
    ///
    /// # Returns
    ///
    /// The created basic block
    pub fn create_basic_block(&self, name: &str, function: FunctionValue<'a>) -> BasicBlock<'a> {
        self.context.append_basic_block(function, name)
    }

    /// The function the builder is currently emitting into.
    pub fn current_function(&self) -> Result<FunctionValue<'a>, CodegenError> {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_parent())
            .ok_or(CodegenError::ReturnOutsideFunction)
    }

    /// Whether the block being emitted into already ends in a terminator.
    pub fn block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }

    /// Allocates a stack slot at the start of the current function's entry
    /// block, so slots declared inside loops are allocated once.
    pub fn create_entry_block_alloca(
        &self,
        type_: BasicTypeEnum<'a>,
        name: &str,
    ) -> Result<PointerValue<'a>, CodegenError> {
        let function = self.current_function()?;
        let entry = function
            .get_first_basic_block()
            .ok_or(CodegenError::ReturnOutsideFunction)?;

        let builder = self.context.create_builder();
        match entry.get_first_instruction() {
            Some(instruction) => builder.position_before(&instruction),
            None => builder.position_at_end(entry),
        }

        Ok(builder.build_alloca(type_, name)?)
    }
}

/// The main compile function that turns a checked module into LLVM IR.
///
/// This is the primary entry point for code generation. It:
/// 1. Creates a new Compiler instance
/// 2. Sets the target triple and data layout
/// 3. Emits the runtime helpers, types, functions and `main`
/// 4. Verifies the module when asked to
///
/// # Arguments
///
/// * `file` - A module that passed `check_file`
/// * `context` - Reference to the LLVM context
/// * `options` - Module name, target and verification settings
///
/// # Returns
///
/// Returns the finished module, or the first internal error hit on the way.
#[tracing::instrument(level = "debug", skip_all, fields(module = %options.module_name))]
pub fn compile<'a>(
    file: &File,
    context: &'a Context,
    options: &CompileOptions,
) -> Result<Module<'a>, CodegenError> {
    let mut compiler = Compiler::new(file, context, &options.module_name);

    compiler.set_target(options.target_triple.as_deref())?;
    compiler.emit(file)?;

    if options.verify {
        compiler
            .module
            .verify()
            .map_err(|error| CodegenError::Verification(error.to_string()))?;
        compiler.run_passes();
    }

    tracing::debug!(
        functions = compiler.module.get_functions().count(),
        "emitted module"
    );

    Ok(compiler.module)
}
