//! Lexical scopes shared by type resolution, checking and code generation.
//!
//! This module contains a generic stack of name scopes:
//!
//! - Frames pushed and popped in strict LIFO order following AST nesting
//! - Variables and statics bound in the innermost frame
//! - Lookup from the innermost frame outward
//! - Same-frame lookup for duplicate detection

pub mod symbol_table;

#[cfg(test)]
mod tests;
