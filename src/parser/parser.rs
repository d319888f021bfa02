//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the `parse` entry point.
//! The parser uses a Pratt parser approach with NUD/LED handlers for
//! expression parsing and a separate table of definition handlers for
//! top-level declarations (`fun`, `extern`, `type`, `protocol`,
//! `extension` and `default`).
//!
//! It maintains lookup tables for:
//! - Definition handlers
//! - NUD (null denotation) handlers for prefix expressions
//! - LED (left denotation) handlers for infix expressions
//! - Binding powers for operator precedence

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::ast::File,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position,
};

use super::{
    expr::parse_expr,
    lookups::{
        create_token_lookups, BPLookup, BindingPower, DefinitionHandler, DefinitionLookup,
        LEDHandler, LEDLookup, NUDHandler, NUDLookup,
    },
};

/// The main parser structure that maintains parsing state.
///
/// This struct holds the token stream and the lookup tables used to parse
/// definitions and expressions. It tracks the current position in the token
/// stream and provides methods for token consumption.
pub struct Parser {
    /// The list of tokens to parse, always terminated by `EOF`
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for top-level definition handlers
    definition_lookup: DefinitionLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
}

impl Parser {
    /// Creates a new Parser instance.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Vector of tokens to parse
    /// * `file` - Reference-counted string containing the source file name
    ///
    /// # Returns
    ///
    /// A new Parser instance ready to parse the token stream.
    pub fn new(tokens: Vec<Token>, file: Rc<String>) -> Self {
        Parser {
            tokens,
            pos: 0,
            file,
            definition_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    ///
    /// Past the end of the stream this keeps returning the final `EOF`.
    pub fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        if self.tokens.is_empty() {
            return TokenKind::EOF;
        }
        self.current_token().kind
    }

    /// Returns the kind of the token `offset` places after the current one.
    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::EOF, |token| token.kind)
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Expects a token of the specified kind, with optional custom error.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    /// * `error` - Optional custom error to return if expectation fails
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns an Error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        if self.current_token_kind() == expected_kind {
            return Ok(self.advance());
        }

        Err(error.unwrap_or_else(|| {
            Error::new(
                ErrorImpl::UnexpectedToken {
                    token: self.current_token().value.clone(),
                },
                self.get_position(),
            )
        }))
    }

    /// Expects a token of the specified kind with default error message.
    ///
    /// # Arguments
    ///
    /// * `expected_kind` - The expected TokenKind
    ///
    /// # Returns
    ///
    /// Returns Ok(Token) if the current token matches, otherwise returns a default Error.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Consumes the current token if it is of the given kind.
    ///
    /// # Returns
    ///
    /// Returns true if a token was consumed.
    pub fn skip(&mut self, kind: TokenKind) -> bool {
        if self.current_token_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Builds an `UnexpectedTokenDetailed` error for the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: self.current_token().value.clone(),
                message: message.to_string(),
            },
            self.get_position(),
        )
    }

    /// Checks if there are more tokens to parse.
    ///
    /// # Returns
    ///
    /// Returns true if the current token is not EOF.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    /// Returns a reference to the definition lookup table.
    pub fn get_definition_lookup(&self) -> &DefinitionLookup {
        &self.definition_lookup
    }

    /// Returns a reference to the NUD (null denotation) lookup table.
    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    /// Returns a reference to the LED (left denotation) lookup table.
    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    /// Returns a reference to the binding power lookup table.
    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `binding_power` - The precedence/binding power for this operator
    /// * `led_fn` - The handler function for this infix operator
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Tokens that also have an infix meaning keep their infix binding power.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `nud_fn` - The handler function for this prefix operator
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.binding_power_lookup
            .entry(kind)
            .or_insert(BindingPower::Primary);
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a top-level definition handler for a token.
    ///
    /// # Arguments
    ///
    /// * `kind` - The token kind to register
    /// * `definition_fn` - The handler function for this definition
    pub fn definition(&mut self, kind: TokenKind, definition_fn: DefinitionHandler) {
        self.binding_power_lookup
            .insert(kind, BindingPower::Default);
        self.definition_lookup.insert(kind, definition_fn);
    }

    /// Returns the source position of the current token.
    pub fn get_position(&self) -> Position {
        if self.tokens.is_empty() {
            return Position(0, Rc::clone(&self.file));
        }
        Position(self.current_token().span.start.0, Rc::clone(&self.file))
    }
}

/// Parses a stream of tokens into a module.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses definitions and top-level
/// expressions until EOF. The returned module already carries the prelude.
///
/// # Arguments
///
/// * `tokens` - Vector of tokens to parse
/// * `file` - Reference-counted string containing the source file name
///
/// # Returns
///
/// A tuple containing:
/// - The Parser instance (with state after parsing)
/// - Result containing either the parsed File or an Error
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> (Parser, Result<File, Error>) {
    let mut parser = Parser::new(tokens, file);
    create_token_lookups(&mut parser);

    let result = parse_file(&mut parser);
    (parser, result)
}

fn parse_file(parser: &mut Parser) -> Result<File, Error> {
    let mut file = File::new();

    while parser.has_tokens() {
        if parser.skip(TokenKind::Semicolon) {
            continue;
        }

        let kind = parser.current_token_kind();
        if let Some(handler) = parser.get_definition_lookup().get(&kind).copied() {
            let definition = handler(parser)?;
            file.add_definition(definition);
        } else {
            let expression = parse_expr(parser, BindingPower::Default)?;
            file.add_expression(expression);
        }
    }

    tracing::debug!(
        functions = file.functions.len(),
        types = file.custom_types.len(),
        protocols = file.protocols.len(),
        expressions = file.expressions.len(),
        "parsed file"
    );

    Ok(file)
}
