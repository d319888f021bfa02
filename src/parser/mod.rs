//! Parser module for building the Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a `File`. It uses a Pratt parser for expressions with proper
//! operator precedence and handles:
//!
//! - Definitions (functions, externs, types, protocols, extensions, defaults)
//! - Expressions (binary and logical ops, calls, member access, literals)
//! - Control flow (`if`, `for`, `while`, `return`), which are expressions
//! - Type annotations
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod definitions;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod types;

#[cfg(test)]
mod tests;
