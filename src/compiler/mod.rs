//! Code generation module for the compiler.
//!
//! This module contains the LLVM-based code generator that turns a checked
//! module into LLVM IR. It handles:
//!
//! - Record layout and the shared protocol struct
//! - Initializers, methods, conformance stubs and free functions
//! - Protocol dispatch on the runtime type tag
//! - Expressions and control flow
//! - The runtime helpers every module carries

pub mod compiler;
pub mod dispatch;
pub mod expr;
pub mod functions;
pub mod layout;
pub mod stdlib;
pub mod stmt;

#[cfg(test)]
mod tests;
