//! Type resolution module.
//!
//! This module infers the type of every expression and transforms the
//! untyped AST into the typed AST. It contains:
//!
//! - The type registry, which looks up record types and protocols by name
//! - The resolver, which walks every body with a scoped symbol table
//! - The typed AST the resolver produces
//!
//! Most diagnostics are deferred to the checker pipeline. The resolver only
//! fails when it cannot assign a type at all: unknown variables, mismatched
//! operands and member access on a type without members.

pub mod registry;
pub mod type_checker;
pub mod typed_ast;

#[cfg(test)]
mod tests;
