//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Diagnostics with source position information
//! - Specific error variants for lexing, parsing and semantic checking
//! - Internal code generation failures
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
