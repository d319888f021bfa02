//! Unit tests for the lexer module.
//!
//! Covers keywords, identifiers, numeric and string literals, operators,
//! comments, and error cases.

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.prance".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    assert_eq!(
        kinds("fun extern var type protocol extension default if else return for while"),
        vec![
            TokenKind::Fun,
            TokenKind::Extern,
            TokenKind::Var,
            TokenKind::Type,
            TokenKind::Protocol,
            TokenKind::Extension,
            TokenKind::Default,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Return,
            TokenKind::For,
            TokenKind::While,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar_1 _under CamelCase funny".to_string();
    let tokens = tokenize(source, Some("test.prance".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[1].value, "bar_1");
    assert_eq!(tokens[2].value, "_under");
    assert_eq!(tokens[3].value, "CamelCase");
    // Keyword prefixes stay identifiers
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "funny");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 2.5f 0".to_string();
    let tokens = tokenize(source, Some("test.prance".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "2.5f");
    assert_eq!(tokens[3].value, "0");
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "line\n" "tab\there" "quote\"d""#.to_string();
    let tokens = tokenize(source, Some("test.prance".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "line\n");
    assert_eq!(tokens[2].value, "tab\there");
    assert_eq!(tokens[3].value, "quote\"d");
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("= == != < <= > >= && || + - * / % . : ; ,"),
        vec![
            TokenKind::Assignment,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Dot,
            TokenKind::Colon,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments_are_skipped() {
    assert_eq!(
        kinds("var x // trailing comment\n// full line\nx"),
        vec![
            TokenKind::Var,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_tracks_positions() {
    let tokens = tokenize("var  x".to_string(), Some("pos.prance".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 3);
    assert_eq!(tokens[1].span.start.0, 5);
    assert_eq!(tokens[1].span.start.1.as_str(), "pos.prance");
}

#[test]
fn test_tokenize_member_call() {
    assert_eq!(
        kinds("dog.speak(times: 2)"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::OpenParen,
            TokenKind::Identifier,
            TokenKind::Colon,
            TokenKind::Number,
            TokenKind::CloseParen,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_unrecognised_character() {
    let result = tokenize("var x = 1 @".to_string(), Some("test.prance".to_string()));

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_tokenize_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
}
