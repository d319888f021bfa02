//! Semantic checks run after type resolution.
//!
//! Each pass lives in its own module and fails on the first violation it
//! finds. `checker::check_file` runs them in their fixed order. Passes that
//! look inside bodies share the traversal in `walker`.

pub mod assignments;
pub mod checker;
pub mod conditions;
pub mod conformance;
pub mod duplicate_names;
pub mod extensions;
pub mod function_calls;
pub mod operations;
pub mod properties;
pub mod prototypes;
pub mod returns;
pub mod variables;
pub mod walker;

#[cfg(test)]
mod tests;
