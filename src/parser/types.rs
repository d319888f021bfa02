//! Type annotation parsing.
//!
//! Types are single identifiers. The primitive names map onto their
//! `StoredType` variants and every other name is a custom type, checked
//! for existence later by the semantic passes.

use crate::{ast::types::StoredType, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

/// Parses a type name.
///
/// # Arguments
///
/// * `parser` - Mutable reference to the parser
///
/// # Returns
///
/// Returns Ok(StoredType) if the current token is an identifier.
pub fn parse_type(parser: &mut Parser) -> Result<StoredType, Error> {
    let error = parser.unexpected("expected a type name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    Ok(StoredType::from_name(&name))
}

/// Parses the return type that may follow a parameter list.
///
/// Bodiless prototypes (externs and protocol requirements) have nothing
/// after them that marks the end, so an identifier only counts as a return
/// type when it does not start an expression such as `x = 1` or `f()`.
pub fn parse_return_type(parser: &mut Parser) -> Result<StoredType, Error> {
    if parser.current_token_kind() != TokenKind::Identifier {
        return Ok(StoredType::Void);
    }

    match parser.peek_kind(1) {
        TokenKind::Assignment | TokenKind::OpenParen | TokenKind::Dot | TokenKind::Colon => {
            Ok(StoredType::Void)
        }
        _ => parse_type(parser),
    }
}
