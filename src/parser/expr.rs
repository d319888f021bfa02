use crate::{
    ast::expressions::{
        BinaryOperator, Expr, ExprKind, FunctionArg, FunctionCall, LiteralValue, LogicalOperator,
        VariableDefinition,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser, types::parse_type};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud(parser)?;

    // While the next token continues this expression and binds tighter, fold it into lhs
    loop {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if token_bp <= bp {
            break;
        }

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.get_position();

    match parser.current_token_kind() {
        TokenKind::Number => {
            let literal = parse_number(&parser.current_token().value).ok_or_else(|| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: parser.current_token().value.clone(),
                    },
                    position.clone(),
                )
            })?;
            parser.advance();
            Ok(Expr::new(ExprKind::Literal(literal), position))
        }
        TokenKind::Identifier => {
            let name = parser.advance().value;
            Ok(Expr::new(ExprKind::Variable(name), position))
        }
        TokenKind::String => {
            let value = parser.advance().value;
            Ok(Expr::new(ExprKind::Literal(LiteralValue::String(value)), position))
        }
        _ => Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            position,
        )),
    }
}

/// `42` is an Int, `4.2` a Double and `4.2f` a Float.
fn parse_number(text: &str) -> Option<LiteralValue> {
    if let Some(float) = text.strip_suffix('f') {
        return float.parse().ok().map(LiteralValue::Float);
    }
    if text.contains('.') {
        return text.parse().ok().map(LiteralValue::Double);
    }
    text.parse().ok().map(LiteralValue::Int)
}

pub fn parse_negative_number_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    let error = parser.unexpected("expected a number after `-`");
    if parser.current_token_kind() != TokenKind::Number {
        return Err(error);
    }

    let literal = match parse_primary_expr(parser)?.kind {
        ExprKind::Literal(LiteralValue::Int(value)) => LiteralValue::Int(-value),
        ExprKind::Literal(LiteralValue::Float(value)) => LiteralValue::Float(-value),
        ExprKind::Literal(LiteralValue::Double(value)) => LiteralValue::Double(-value),
        _ => return Err(error),
    };

    Ok(Expr::new(ExprKind::Literal(literal), position))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operator = match operator_token.kind {
        TokenKind::Plus => BinaryOperator::Plus,
        TokenKind::Dash => BinaryOperator::Minus,
        TokenKind::Star => BinaryOperator::Times,
        TokenKind::Slash => BinaryOperator::Divide,
        TokenKind::Percent => BinaryOperator::Mod,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let position = left.position.clone();

    Ok(Expr::new(
        ExprKind::Binary(Box::new(left), operator, Box::new(right)),
        position,
    ))
}

pub fn parse_logical_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operator = match operator_token.kind {
        TokenKind::And => LogicalOperator::And,
        TokenKind::Or => LogicalOperator::Or,
        TokenKind::Equals => LogicalOperator::Equals,
        TokenKind::NotEquals => LogicalOperator::NotEqual,
        TokenKind::Less => LogicalOperator::LessThan,
        TokenKind::LessEquals => LogicalOperator::LessThanOrEqual,
        TokenKind::Greater => LogicalOperator::GreaterThan,
        TokenKind::GreaterEquals => LogicalOperator::GreaterThanOrEqual,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let position = left.position.clone();

    Ok(Expr::new(
        ExprKind::Logical(Box::new(left), operator, Box::new(right)),
        position,
    ))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.advance();
    // Right associative
    let rhs = parse_expr(parser, BindingPower::Default)?;
    let position = left.position.clone();

    Ok(Expr::new(
        ExprKind::Assignment(Box::new(left), Box::new(rhs)),
        position,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        if parser.skip(TokenKind::Comma) {
            continue;
        }

        let label = if parser.current_token_kind() == TokenKind::Identifier
            && parser.peek_kind(1) == TokenKind::Colon
        {
            let label = parser.advance().value;
            parser.advance();
            Some(label)
        } else {
            None
        };

        args.push(FunctionArg {
            label,
            expr: parse_expr(parser, BindingPower::Default)?,
        });

        if !parser.has_tokens() {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let position = left.position.clone();
    match left.kind {
        ExprKind::Variable(name) => Ok(Expr::new(
            ExprKind::Call(FunctionCall { name, args }),
            position,
        )),
        ExprKind::MemberProperty(instance, name) => Ok(Expr::new(
            ExprKind::MemberCall(instance, FunctionCall { name, args }),
            position,
        )),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: String::from("("),
                message: String::from("only functions and methods can be called"),
            },
            position,
        )),
    }
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected("expected a member name after `.`");
    let member = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    let position = left.position.clone();

    Ok(Expr::new(
        ExprKind::MemberProperty(Box::new(left), member),
        position,
    ))
}

/// `var name: Type`. A trailing `= value` is picked up by the assignment
/// handler, which wraps this definition.
pub fn parse_var_decl_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;
    let definition = parse_variable_definition(parser)?;

    Ok(Expr::new(ExprKind::VariableDefinition(definition), position))
}

/// `name: Type`, shared by `var`, parameters and properties.
pub fn parse_variable_definition(parser: &mut Parser) -> Result<VariableDefinition, Error> {
    let error = parser.unexpected("expected identifier during variable declaration");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let error = parser.unexpected("expected `:` followed by a type");
    parser.expect_error(TokenKind::Colon, Some(error))?;

    let type_ = parse_type(parser)?;
    Ok(VariableDefinition { name, type_ })
}

/// Parses `{ expr* }`, allowing optional semicolons between expressions.
pub fn parse_block(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    let error = parser.unexpected("expected `{`");
    parser.expect_error(TokenKind::OpenCurly, Some(error))?;

    let mut body = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}`"));
        }
        if parser.skip(TokenKind::Semicolon) {
            continue;
        }
        body.push(parse_expr(parser, BindingPower::Default)?);
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(body)
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let thens = parse_block(parser)?;

    let elses = if parser.skip(TokenKind::Else) {
        if parser.current_token_kind() == TokenKind::If {
            vec![parse_if_expr(parser)?]
        } else {
            parse_block(parser)?
        }
    } else {
        vec![]
    };

    Ok(Expr::new(
        ExprKind::If(Box::new(condition), thens, elses),
        position,
    ))
}

/// `for (init; condition; increment) { body }` becomes
/// `For(init, condition, body + [increment])`.
pub fn parse_for_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    parser.expect(TokenKind::OpenParen)?;
    let init = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;
    let condition = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;
    let increment = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    let mut body = parse_block(parser)?;
    body.push(increment);

    Ok(Expr::new(
        ExprKind::For(Box::new(init), Box::new(condition), body),
        position,
    ))
}

pub fn parse_while_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Expr::new(ExprKind::While(Box::new(condition), body), position))
}

pub fn parse_return_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let position = parser.advance().span.start;

    if parser
        .current_token()
        .is_one_of_many(&[TokenKind::CloseCurly, TokenKind::Semicolon, TokenKind::EOF])
    {
        return Ok(Expr::new(ExprKind::Return(None), position));
    }

    let value = parse_expr(parser, BindingPower::Default)?;
    Ok(Expr::new(ExprKind::Return(Some(Box::new(value))), position))
}
