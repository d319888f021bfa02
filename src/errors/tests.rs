//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{CodegenError, Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn position(offset: u32) -> Position {
    Position(offset, Rc::new("test.prance".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(42),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_position().1.as_str(), "test.prance");
}

#[test]
fn test_unit_variant_names() {
    let names: Vec<String> = [
        ErrorImpl::LoopConditionMustBeComparison,
        ErrorImpl::ReturnInsideLoop,
        ErrorImpl::UnexpectedReturn,
        ErrorImpl::UnreachableCode,
    ]
    .into_iter()
    .map(|variant| Error::new(variant, position(0)).get_error_name().to_string())
    .collect();

    assert_eq!(
        names,
        vec![
            "LoopConditionMustBeComparison",
            "ReturnInsideLoop",
            "UnexpectedReturn",
            "UnreachableCode"
        ]
    );
}

#[test]
fn test_duplicate_definition_tip() {
    let error = Error::new(
        ErrorImpl::DuplicateDefinition {
            name: "x".to_string(),
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "DuplicateDefinition");
    assert_eq!(
        error.get_tip().to_string(),
        "`x` is already defined in this scope"
    );
}

#[test]
fn test_unimplemented_protocol_tip() {
    let error = Error::new(
        ErrorImpl::UnimplementedProtocol {
            protocol: "Animal".to_string(),
            type_: "Dog".to_string(),
            missing: "speak".to_string(),
        },
        position(0),
    );

    assert_eq!(
        error.get_tip().to_string(),
        "Type `Dog` must implement `speak` to conform to `Animal`"
    );
}

#[test]
fn test_argument_count_errors() {
    let error = Error::new(
        ErrorImpl::MissingArguments {
            expected: 2,
            received: 1,
        },
        position(0),
    );

    assert_eq!(error.get_error_name(), "MissingArguments");
    assert_eq!(error.get_tip().to_string(), "Expected 2 arguments, received 1");
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "Int".to_string(),
            received: "String".to_string(),
        },
        position(0),
    );

    assert_eq!(
        error.to_string(),
        "TypeMismatch: Type mismatch, expected \"Int\", received \"String\""
    );
}

#[test]
fn test_errors_compare_by_variant_and_position() {
    let first = Error::new(ErrorImpl::UnreachableCode, position(3));
    let second = Error::new(ErrorImpl::UnreachableCode, position(3));
    let third = Error::new(ErrorImpl::UnreachableCode, position(4));

    assert_eq!(first, second);
    assert_ne!(first, third);
}

#[test]
fn test_codegen_error_messages() {
    let error = CodegenError::WrongNumberOfArgs {
        function: "foo".to_string(),
        expected: 2,
        received: 3,
    };

    assert_eq!(
        error.to_string(),
        "call to function 'foo' with 3 arguments (expected 2)"
    );
    assert_eq!(
        CodegenError::UnknownType("Ghost".to_string()).to_string(),
        "no type defined called Ghost"
    );
}
