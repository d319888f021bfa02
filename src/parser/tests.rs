//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs:
//! - Function, extern, type, protocol, extension and default definitions
//! - Expressions and operator precedence
//! - Control flow
//! - Syntax errors

use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::parser::parse;
use crate::{
    ast::{
        ast::File,
        expressions::{BinaryOperator, ExprKind, LiteralValue, LogicalOperator},
        types::StoredType,
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<File, Error> {
    let tokens = tokenize(source.to_string(), Some("test.prance".to_string())).unwrap();
    let (_, result) = parse(tokens, Rc::new("test.prance".to_string()));
    result
}

/// The prelude contributes `print`, so user functions start at index 1.
fn user_functions(file: &File) -> &[crate::ast::ast::FunctionDefinition] {
    &file.functions[1..]
}

#[test]
fn test_parse_empty_file_has_prelude() {
    let file = parse_source("").unwrap();

    let externs: Vec<&str> = file.externs.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(externs, vec!["printf", "scanf", "scanLine"]);
    assert_eq!(file.functions.len(), 1);
    assert_eq!(file.functions[0].prototype.name, "print");
    assert!(file.expressions.is_empty());
}

#[test]
fn test_parse_function_definition() {
    let file = parse_source("fun add(a: Int, b: Int) Int { return a + b }").unwrap();
    let function = &user_functions(&file)[0];

    assert_eq!(function.prototype.name, "add");
    assert_eq!(function.prototype.params.len(), 2);
    assert_eq!(function.prototype.params[1].name, "b");
    assert_eq!(function.prototype.return_type, StoredType::Int);
    assert_eq!(function.body.len(), 1);
    assert!(matches!(function.body[0].kind, ExprKind::Return(_)));
}

#[test]
fn test_parse_void_function() {
    let file = parse_source("fun greet() { print(line: \"hi\") }").unwrap();
    let function = &user_functions(&file)[0];

    assert_eq!(function.prototype.return_type, StoredType::Void);
    match &function.body[0].kind {
        ExprKind::Call(call) => {
            assert_eq!(call.name, "print");
            assert_eq!(call.args[0].label.as_deref(), Some("line"));
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn test_parse_extern_without_return_type_before_expression() {
    let file = parse_source("extern puts(str: String)\nputs(str: \"a\")").unwrap();

    let puts = file.prototype("puts").unwrap();
    assert_eq!(puts.return_type, StoredType::Void);
    assert_eq!(file.expressions.len(), 1);
}

#[test]
fn test_parse_extern_with_return_type() {
    let file = parse_source("extern getNumber() Int").unwrap();

    assert_eq!(file.prototype("getNumber").unwrap().return_type, StoredType::Int);
}

#[test]
fn test_parse_type_definition() {
    let file = parse_source(
        "type Point: Shape, Named {\n  var x: Int\n  var y: Int\n  fun area() Int { return 0 }\n}",
    )
    .unwrap();
    let point = file.find_type("Point").unwrap();

    assert_eq!(point.protocols, vec!["Shape".to_string(), "Named".to_string()]);
    assert_eq!(point.properties.len(), 2);
    assert_eq!(point.functions.len(), 1);
    assert_eq!(point.init_method.prototype.name, "Point");
    assert_eq!(
        point.init_method.prototype.return_type,
        StoredType::Custom("Point".to_string())
    );
    // Two property assignments and the return of self
    assert_eq!(point.init_method.body.len(), 3);
    assert!(file.prototype("Point").is_some());
}

#[test]
fn test_parse_protocol_definition() {
    let file =
        parse_source("protocol Animal {\n  var legs: Int\n  fun speak() String\n  fun sleep()\n}")
            .unwrap();
    let animal = file.find_protocol("Animal").unwrap();

    assert_eq!(animal.properties.len(), 1);
    assert_eq!(animal.prototypes.len(), 2);
    assert_eq!(animal.prototypes[0].return_type, StoredType::String);
    assert_eq!(animal.prototypes[1].return_type, StoredType::Void);
}

#[test]
fn test_parse_extension_and_default() {
    let file = parse_source(
        "extension Dog { fun bark() {} }\ndefault Animal { fun speak() String { return \"...\" } }",
    )
    .unwrap();

    assert_eq!(file.extensions.len(), 1);
    assert_eq!(file.extensions[0].name, "Dog");
    assert_eq!(file.defaults.len(), 1);
    assert_eq!(file.defaults[0].functions[0].prototype.name, "speak");
}

#[test]
fn test_parse_var_with_initial_value() {
    let file = parse_source("var x: Int = 5").unwrap();

    match &file.expressions[0].kind {
        ExprKind::Assignment(target, value) => {
            assert!(matches!(target.kind, ExprKind::VariableDefinition(_)));
            assert_eq!(value.kind, ExprKind::Literal(LiteralValue::Int(5)));
        }
        other => panic!("expected assignment, got {:?}", other),
    }
}

#[test]
fn test_parse_optional_semicolons() {
    let file = parse_source("var x: Int; x = 1\nx = 2;").unwrap();

    assert_eq!(file.expressions.len(), 3);
}

#[test]
fn test_parse_precedence() {
    let file = parse_source("x = 1 + 2 * 3 < 10").unwrap();

    let ExprKind::Assignment(_, value) = &file.expressions[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Logical(lhs, LogicalOperator::LessThan, _) = &value.kind else {
        panic!("expected comparison, got {:?}", value.kind);
    };
    let ExprKind::Binary(_, BinaryOperator::Plus, product) = &lhs.kind else {
        panic!("expected addition, got {:?}", lhs.kind);
    };
    assert!(matches!(
        product.kind,
        ExprKind::Binary(_, BinaryOperator::Times, _)
    ));
}

#[test]
fn test_parse_number_literals() {
    let file = parse_source("a = 1\nb = 1.5\nc = 2.5f\nd = -3").unwrap();

    let values: Vec<LiteralValue> = file
        .expressions
        .iter()
        .map(|expr| match &expr.kind {
            ExprKind::Assignment(_, value) => match &value.kind {
                ExprKind::Literal(literal) => literal.clone(),
                other => panic!("expected literal, got {:?}", other),
            },
            other => panic!("expected assignment, got {:?}", other),
        })
        .collect();

    assert_eq!(
        values,
        vec![
            LiteralValue::Int(1),
            LiteralValue::Double(1.5),
            LiteralValue::Float(2.5),
            LiteralValue::Int(-3),
        ]
    );
}

#[test]
fn test_parse_member_access_and_call() {
    let file = parse_source("dog.name\ndog.speak(times: 2)").unwrap();

    match &file.expressions[0].kind {
        ExprKind::MemberProperty(instance, name) => {
            assert_eq!(instance.kind, ExprKind::Variable("dog".to_string()));
            assert_eq!(name, "name");
        }
        other => panic!("expected property, got {:?}", other),
    }

    match &file.expressions[1].kind {
        ExprKind::MemberCall(_, call) => {
            assert_eq!(call.name, "speak");
            assert_eq!(call.args.len(), 1);
        }
        other => panic!("expected member call, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else() {
    let file = parse_source("if (x > 1) { x = 1 } else { x = 2\n x = 3 }").unwrap();

    match &file.expressions[0].kind {
        ExprKind::If(condition, thens, elses) => {
            assert!(matches!(condition.kind, ExprKind::Logical(..)));
            assert_eq!(thens.len(), 1);
            assert_eq!(elses.len(), 2);
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_for_appends_increment() {
    let file = parse_source("for (var i: Int = 0; i < 10; i = i + 1) { print(line: \"x\") }")
        .unwrap();

    match &file.expressions[0].kind {
        ExprKind::For(init, condition, body) => {
            assert!(matches!(init.kind, ExprKind::Assignment(..)));
            assert!(matches!(condition.kind, ExprKind::Logical(..)));
            assert_eq!(body.len(), 2);
            assert!(matches!(body[1].kind, ExprKind::Assignment(..)));
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_while_and_bare_return() {
    let file = parse_source("fun f() { while (x < 1) { x = x + 1 }\n return }").unwrap();
    let body = &user_functions(&file)[0].body;

    assert!(matches!(body[0].kind, ExprKind::While(..)));
    assert_eq!(body[1].kind, ExprKind::Return(None));
}

#[test]
fn test_parse_unexpected_token() {
    let error = parse_source("fun (a: Int) {}").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_position().0, 4);
}

#[test]
fn test_parse_unclosed_block() {
    let error = parse_source("fun f() { x = 1").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_call_on_literal_is_rejected() {
    assert!(parse_source("x = 1(2)").is_err());
}
