use std::collections::HashMap;

use crate::{
    ast::{ast::Definition, expressions::Expr},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{definitions::*, expr::*, parser::Parser};

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug)]
pub enum BindingPower {
    Default,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Call,
    Member,
    Primary,
}

pub type DefinitionHandler = fn(&mut Parser) -> Result<Definition, Error>;
pub type NUDHandler = fn(&mut Parser) -> Result<Expr, Error>;
pub type LEDHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, Error>;

pub fn create_token_lookups(parser: &mut Parser) {
    parser.led(TokenKind::Assignment, BindingPower::Assignment, parse_assignment_expr);

    // Logical
    parser.led(TokenKind::And, BindingPower::Logical, parse_logical_expr);
    parser.led(TokenKind::Or, BindingPower::Logical, parse_logical_expr);

    // Relational
    parser.led(TokenKind::Less, BindingPower::Relational, parse_logical_expr);
    parser.led(TokenKind::LessEquals, BindingPower::Relational, parse_logical_expr);
    parser.led(TokenKind::Greater, BindingPower::Relational, parse_logical_expr);
    parser.led(TokenKind::GreaterEquals, BindingPower::Relational, parse_logical_expr);
    parser.led(TokenKind::Equals, BindingPower::Relational, parse_logical_expr);
    parser.led(TokenKind::NotEquals, BindingPower::Relational, parse_logical_expr);

    // Additive and multiplicative
    parser.led(TokenKind::Plus, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Dash, BindingPower::Additive, parse_binary_expr);
    parser.led(TokenKind::Star, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Slash, BindingPower::Multiplicative, parse_binary_expr);
    parser.led(TokenKind::Percent, BindingPower::Multiplicative, parse_binary_expr);

    parser.led(TokenKind::OpenParen, BindingPower::Call, parse_call_expr);

    // Member
    parser.led(TokenKind::Dot, BindingPower::Member, parse_member_expr);

    // Literals and symbols
    parser.nud(TokenKind::Number, parse_primary_expr);
    parser.nud(TokenKind::Identifier, parse_primary_expr);
    parser.nud(TokenKind::String, parse_primary_expr);
    parser.nud(TokenKind::Dash, parse_negative_number_expr);
    parser.nud(TokenKind::OpenParen, parse_grouping_expr);

    // Control flow and declarations are expressions too
    parser.nud(TokenKind::Var, parse_var_decl_expr);
    parser.nud(TokenKind::If, parse_if_expr);
    parser.nud(TokenKind::For, parse_for_expr);
    parser.nud(TokenKind::While, parse_while_expr);
    parser.nud(TokenKind::Return, parse_return_expr);

    // Definitions
    parser.definition(TokenKind::Fun, parse_fn_definition);
    parser.definition(TokenKind::Extern, parse_extern_definition);
    parser.definition(TokenKind::Type, parse_type_definition);
    parser.definition(TokenKind::Protocol, parse_protocol_definition);
    parser.definition(TokenKind::Extension, parse_extension_definition);
    parser.definition(TokenKind::Default, parse_default_definition);
}

// Lookup tables inside parser struct, so it's easier
pub type DefinitionLookup = HashMap<TokenKind, DefinitionHandler>;
pub type NUDLookup = HashMap<TokenKind, NUDHandler>;
pub type LEDLookup = HashMap<TokenKind, LEDHandler>;
pub type BPLookup = HashMap<TokenKind, BindingPower>;
