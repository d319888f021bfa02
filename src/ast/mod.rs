/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the untyped AST
///
/// Submodules:
/// - ast: Declarations (prototypes, functions, types, protocols) and the File
/// - expressions: The untyped expression tree
/// - types: Stored types every expression resolves to
pub mod ast;
pub mod expressions;
pub mod types;
