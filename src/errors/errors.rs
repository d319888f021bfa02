use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::DuplicateDefinition { .. } => "DuplicateDefinition",
            ErrorImpl::UndefinedType { .. } => "UndefinedType",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::UnknownProtocol { .. } => "UnknownProtocol",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::TypeDoesNotContainMembers { .. } => "TypeDoesNotContainMembers",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::InvalidOperation { .. } => "InvalidOperation",
            ErrorImpl::UnableToAssign { .. } => "UnableToAssign",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::UnimplementedProtocol { .. } => "UnimplementedProtocol",
            ErrorImpl::LoopConditionMustBeComparison => "LoopConditionMustBeComparison",
            ErrorImpl::ReturnInsideLoop => "ReturnInsideLoop",
            ErrorImpl::UnexpectedReturn => "UnexpectedReturn",
            ErrorImpl::NoReturnInFunction { .. } => "NoReturnInFunction",
            ErrorImpl::UnreachableCode => "UnreachableCode",
            ErrorImpl::UnexpectedArgumentInCall { .. } => "UnexpectedArgumentInCall",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::WrongArgumentType { .. } => "WrongArgumentType",
            ErrorImpl::CouldNotFindTypeForExtension { .. } => "CouldNotFindTypeForExtension",
            ErrorImpl::FunctionDoesNotMatchDeclaration { .. } => {
                "FunctionDoesNotMatchDeclaration"
            }
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::DuplicateDefinition { name } => {
                ErrorTip::Suggestion(format!("`{}` is already defined in this scope", name))
            }
            ErrorImpl::UndefinedType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::UnknownVariable { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::UnknownFunction { function } => {
                ErrorTip::Suggestion(format!("Function `{}` is not declared", function))
            }
            ErrorImpl::UnknownProtocol { protocol, type_ } => ErrorTip::Suggestion(format!(
                "Type `{}` conforms to unknown protocol `{}`",
                type_, protocol
            )),
            ErrorImpl::UnknownMember { type_, member } => {
                ErrorTip::Suggestion(format!("Type `{}` has no member `{}`", type_, member))
            }
            ErrorImpl::TypeDoesNotContainMembers { type_ } => ErrorTip::Suggestion(format!(
                "Type `{}` does not have properties or methods",
                type_
            )),
            ErrorImpl::ReturnTypeMismatch { expected, received } => ErrorTip::Suggestion(
                format!("Expected return type `{}`, received `{}`", expected, received),
            ),
            ErrorImpl::InvalidOperation { left, right } => ErrorTip::Suggestion(format!(
                "Operation is not defined between `{}` and `{}`",
                left, right
            )),
            ErrorImpl::UnableToAssign { target } => {
                ErrorTip::Suggestion(format!("`{}` cannot be assigned to", target))
            }
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::UnimplementedProtocol {
                protocol,
                type_,
                missing,
            } => ErrorTip::Suggestion(format!(
                "Type `{}` must implement `{}` to conform to `{}`",
                type_, missing, protocol
            )),
            ErrorImpl::LoopConditionMustBeComparison => ErrorTip::Suggestion(String::from(
                "Conditions of `if`, `for` and `while` must be a comparison",
            )),
            ErrorImpl::ReturnInsideLoop => {
                ErrorTip::Suggestion(String::from("`return` is not allowed inside a loop body"))
            }
            ErrorImpl::UnexpectedReturn => ErrorTip::Suggestion(String::from(
                "`return` can only be used inside a function body",
            )),
            ErrorImpl::NoReturnInFunction { function } => ErrorTip::Suggestion(format!(
                "Function `{}` does not return a value on every path",
                function
            )),
            ErrorImpl::UnreachableCode => {
                ErrorTip::Suggestion(String::from("Code after `return` will never run"))
            }
            ErrorImpl::UnexpectedArgumentInCall { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument label `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::MissingArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::WrongArgumentType {
                argument,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "Expected argument `{}` to be `{}`, received `{}`",
                argument, expected, received
            )),
            ErrorImpl::CouldNotFindTypeForExtension { type_ } => ErrorTip::Suggestion(format!(
                "Cannot extend `{}` because it is not declared",
                type_
            )),
            ErrorImpl::FunctionDoesNotMatchDeclaration { function, type_ } => {
                ErrorTip::Suggestion(format!(
                    "`{}` does not match its declaration in `{}`",
                    function, type_
                ))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.get_error_name(), self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("Unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("Unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("Unexpected token: {token:?}, {message}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("Failed to parse number: {token:?}")]
    NumberParseError { token: String },

    #[error("Duplicate definition of {name:?}")]
    DuplicateDefinition { name: String },
    #[error("Undefined type {type_:?}")]
    UndefinedType { type_: String },
    #[error("Unknown variable {variable:?}")]
    UnknownVariable { variable: String },
    #[error("Unknown function {function:?}")]
    UnknownFunction { function: String },
    #[error("Unknown protocol {protocol:?} in {type_:?}")]
    UnknownProtocol { protocol: String, type_: String },
    #[error("Type {type_:?} does not contain member {member:?}")]
    UnknownMember { type_: String, member: String },
    #[error("Type {type_:?} does not contain members")]
    TypeDoesNotContainMembers { type_: String },
    #[error("Return type mismatch, expected {expected:?}, received {received:?}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("Invalid operation between {left:?} and {right:?}")]
    InvalidOperation { left: String, right: String },
    #[error("Unable to assign to {target}")]
    UnableToAssign { target: String },
    #[error("Type mismatch, expected {expected:?}, received {received:?}")]
    TypeMismatch { expected: String, received: String },
    #[error("Type {type_:?} does not implement {missing:?} required by {protocol:?}")]
    UnimplementedProtocol {
        protocol: String,
        type_: String,
        missing: String,
    },
    #[error("Condition must be a comparison")]
    LoopConditionMustBeComparison,
    #[error("Return inside of loop")]
    ReturnInsideLoop,
    #[error("Unexpected return")]
    UnexpectedReturn,
    #[error("No return in function {function:?}")]
    NoReturnInFunction { function: String },
    #[error("Unreachable code")]
    UnreachableCode,
    #[error("Unexpected argument label {received:?}, expected {expected:?}")]
    UnexpectedArgumentInCall { expected: String, received: String },
    #[error("Unexpected arguments, expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("Missing arguments, expected {expected}, received {received}")]
    MissingArguments { expected: usize, received: usize },
    #[error("Wrong type for argument {argument:?}, expected {expected:?}, received {received:?}")]
    WrongArgumentType {
        argument: String,
        expected: String,
        received: String,
    },
    #[error("Could not find type {type_:?} to extend")]
    CouldNotFindTypeForExtension { type_: String },
    #[error("Function {function:?} does not match declaration in {type_:?}")]
    FunctionDoesNotMatchDeclaration { function: String, type_: String },
}

/// Failures raised while lowering to LLVM IR.
///
/// A program that passed every checker pass never produces one of these, so
/// they are reported as internal compiler errors rather than diagnostics.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("no type defined called {0}")]
    UnknownType(String),
    #[error("no member {member} in type {type_}")]
    UnknownMember { type_: String, member: String },
    #[error("call to function '{function}' with {received} arguments (expected {expected})")]
    WrongNumberOfArgs {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("call to function '{function}' expected parameter {expected} received {received}")]
    IncorrectFunctionLabel {
        function: String,
        expected: String,
        received: String,
    },
    #[error("unable to compare {0} with {1}")]
    UnableToCompare(String, String),
    #[error("logical operation found non-truthy type: {0}")]
    NonTruthyType(String),
    #[error("return statement emitted outside of function body")]
    ReturnOutsideFunction,
    #[error("builder error: {0}")]
    Builder(#[from] inkwell::builder::BuilderError),
    #[error("module failed verification: {0}")]
    Verification(String),
    #[error("target error: {0}")]
    Target(String),
}
