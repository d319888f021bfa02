use crate::{
    ast::{
        ast::{
            Definition, ExtensionDefinition, FunctionDefinition, ProtocolDefinition, Prototype,
            TypeDefinition,
        },
        expressions::VariableDefinition,
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{
    expr::{parse_block, parse_variable_definition},
    parser::Parser,
    types::parse_return_type,
};

/// Parses `name(param: Type, ...) ReturnType?`.
pub fn parse_prototype(parser: &mut Parser) -> Result<Prototype, Error> {
    let position = parser.get_position();
    let error = parser.unexpected("expected a function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.skip(TokenKind::Comma) {
            continue;
        }
        params.push(parse_variable_definition(parser)?);
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = parse_return_type(parser)?;

    Ok(Prototype {
        name,
        params,
        return_type,
        position,
    })
}

/// Parses a function after its `fun` keyword.
fn parse_function(parser: &mut Parser) -> Result<FunctionDefinition, Error> {
    let prototype = parse_prototype(parser)?;
    let body = parse_block(parser)?;

    Ok(FunctionDefinition::new(prototype, body))
}

pub fn parse_fn_definition(parser: &mut Parser) -> Result<Definition, Error> {
    parser.advance();
    Ok(Definition::Function(parse_function(parser)?))
}

pub fn parse_extern_definition(parser: &mut Parser) -> Result<Definition, Error> {
    parser.advance();
    Ok(Definition::Extern(parse_prototype(parser)?))
}

/// Parses the name of a type-like declaration.
fn parse_declaration_header(parser: &mut Parser, what: &str) -> Result<String, Error> {
    let error = parser.unexpected(&format!("expected a {} name", what));
    Ok(parser.expect_error(TokenKind::Identifier, Some(error))?.value)
}

fn parse_property(parser: &mut Parser) -> Result<VariableDefinition, Error> {
    parser.advance();
    parse_variable_definition(parser)
}

/// `type Name: Protocol, Other { var prop: Type  fun method() {} }`
pub fn parse_type_definition(parser: &mut Parser) -> Result<Definition, Error> {
    let position = parser.advance().span.start;
    let name = parse_declaration_header(parser, "type")?;

    let mut protocols = vec![];
    if parser.skip(TokenKind::Colon) {
        loop {
            let error = parser.unexpected("expected a protocol name");
            protocols.push(parser.expect_error(TokenKind::Identifier, Some(error))?.value);
            if !parser.skip(TokenKind::Comma) {
                break;
            }
        }
    }

    parser.expect(TokenKind::OpenCurly)?;

    let mut properties = vec![];
    let mut functions = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::Semicolon => {
                parser.advance();
            }
            TokenKind::Var => properties.push(parse_property(parser)?),
            TokenKind::Fun => {
                parser.advance();
                functions.push(parse_function(parser)?);
            }
            _ => return Err(parser.unexpected("expected `var` or `fun` inside a type")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Definition::Type(TypeDefinition::new(
        &name, properties, functions, protocols, position,
    )))
}

/// `protocol Name { var prop: Type  fun required(a: Int) String }`
pub fn parse_protocol_definition(parser: &mut Parser) -> Result<Definition, Error> {
    let position = parser.advance().span.start;
    let name = parse_declaration_header(parser, "protocol")?;

    parser.expect(TokenKind::OpenCurly)?;

    let mut properties = vec![];
    let mut prototypes = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::Semicolon => {
                parser.advance();
            }
            TokenKind::Var => properties.push(parse_property(parser)?),
            TokenKind::Fun => {
                parser.advance();
                prototypes.push(parse_prototype(parser)?);
            }
            _ => return Err(parser.unexpected("expected `var` or `fun` inside a protocol")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Definition::Protocol(ProtocolDefinition::new(
        &name, properties, prototypes, position,
    )))
}

/// Shared body of `extension Name { ... }` and `default Name { ... }`.
fn parse_function_block(parser: &mut Parser) -> Result<ExtensionDefinition, Error> {
    let position = parser.advance().span.start;
    let name = parse_declaration_header(parser, "type or protocol")?;

    parser.expect(TokenKind::OpenCurly)?;

    let mut functions = vec![];
    loop {
        match parser.current_token_kind() {
            TokenKind::CloseCurly => break,
            TokenKind::Semicolon => {
                parser.advance();
            }
            TokenKind::Fun => {
                parser.advance();
                functions.push(parse_function(parser)?);
            }
            _ => return Err(parser.unexpected("expected `fun`")),
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(ExtensionDefinition {
        name,
        position,
        functions,
    })
}

pub fn parse_extension_definition(parser: &mut Parser) -> Result<Definition, Error> {
    Ok(Definition::Extension(parse_function_block(parser)?))
}

pub fn parse_default_definition(parser: &mut Parser) -> Result<Definition, Error> {
    Ok(Definition::Default(parse_function_block(parser)?))
}
