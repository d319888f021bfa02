//! Unit tests for the registry and the type resolver.

use pretty_assertions::assert_eq;

use super::{
    registry::{finalize_type_tags, CallableType, Registry},
    type_checker::resolve_types,
    typed_ast::TypedExprKind,
};
use crate::{ast::{ast::File, types::StoredType}, parse_source};

fn parse(source: &str) -> File {
    parse_source(source, "test.prance").unwrap()
}

fn resolved(source: &str) -> File {
    let mut file = parse(source);
    resolve_types(&mut file).unwrap();
    file
}

const ANIMALS: &str = "
protocol Animal { fun speak() String }
type Dog: Animal { var name: String  fun speak() String { return self.name } }
type Rock { var weight: Int }
type Cat: Animal { fun speak() String { return \"meow\" } }
";

#[test]
fn test_registry_lookup() {
    let file = parse(ANIMALS);
    let registry = Registry::new(&file);

    assert!(matches!(registry.get("Dog"), Some(CallableType::Concrete(_))));
    assert!(matches!(registry.get("Animal"), Some(CallableType::Protocol(_))));
    assert!(registry.get("Unicorn").is_none());

    let dog = registry.get("Dog").unwrap();
    assert_eq!(dog.name(), "Dog");
    assert_eq!(dog.find_property("name").unwrap().type_, StoredType::String);
    assert!(dog.find_property("age").is_none());
}

#[test]
fn test_registry_is_known() {
    let file = parse(ANIMALS);
    let registry = Registry::new(&file);

    assert!(registry.is_known(&StoredType::Int));
    assert!(registry.is_known(&StoredType::Void));
    assert!(registry.is_known(&StoredType::Custom("Rock".to_string())));
    assert!(!registry.is_known(&StoredType::Custom("Unicorn".to_string())));
}

#[test]
fn test_valid_type_names() {
    let file = parse(ANIMALS);
    let registry = Registry::new(&file);

    assert_eq!(
        registry.valid_type_names(&StoredType::Custom("Animal".to_string())),
        vec!["Dog".to_string(), "Cat".to_string(), "Animal".to_string()]
    );
    assert_eq!(
        registry.valid_type_names(&StoredType::Custom("Dog".to_string())),
        vec!["Dog".to_string()]
    );
    assert_eq!(
        registry.valid_type_names(&StoredType::Int),
        vec!["Int".to_string()]
    );
    assert!(registry.accepts(
        &StoredType::Custom("Animal".to_string()),
        &StoredType::Custom("Cat".to_string())
    ));
    assert!(!registry.accepts(
        &StoredType::Custom("Animal".to_string()),
        &StoredType::Custom("Rock".to_string())
    ));
}

#[test]
fn test_find_prototype_searches_protocol_requirements() {
    let file = parse(
        "protocol Animal { fun speak() String }\ntype Fish: Animal { var fins: Int }",
    );
    let registry = Registry::new(&file);

    let speak = registry.find_prototype("Fish", "speak").unwrap();
    assert_eq!(speak.return_type, StoredType::String);
    assert!(registry.get("Fish").unwrap().find_prototype("speak").is_none());
}

#[test]
fn test_finalize_type_tags() {
    let mut file = parse(ANIMALS);
    finalize_type_tags(&mut file);

    let tags: Vec<Option<u32>> = file.custom_types.iter().map(|type_| type_.tag).collect();
    assert_eq!(tags, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_resolve_literals_and_operations() {
    let file = resolved("var a: Int = 1 + 2\nvar b: Double = 1.5\nvar c: Float = 2.5f\nvar d: Int = a < 3");

    let TypedExprKind::Assignment(_, value) = &file.typed_expressions[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.type_, StoredType::Int);
    assert_eq!(file.typed_expressions[0].type_, StoredType::Void);

    let types: Vec<StoredType> = file
        .typed_expressions
        .iter()
        .map(|expr| match &expr.kind {
            TypedExprKind::Assignment(_, value) => value.type_.clone(),
            _ => StoredType::Void,
        })
        .collect();
    assert_eq!(
        types,
        vec![
            StoredType::Int,
            StoredType::Double,
            StoredType::Float,
            StoredType::Int
        ]
    );
}

#[test]
fn test_resolve_unknown_variable() {
    let mut file = parse("x = 1");
    let error = resolve_types(&mut file).unwrap_err();

    assert_eq!(error.get_error_name(), "UnknownVariable");
}

#[test]
fn test_resolve_mismatched_operands() {
    let mut file = parse("var a: Int\nvar b: Double\na + b");
    let error = resolve_types(&mut file).unwrap_err();

    assert_eq!(error.get_error_name(), "InvalidOperation");
}

#[test]
fn test_resolve_property_on_primitive() {
    let mut file = parse("var a: Int\na.size");
    let error = resolve_types(&mut file).unwrap_err();

    assert_eq!(error.get_error_name(), "TypeDoesNotContainMembers");
}

#[test]
fn test_resolve_member_access() {
    let file = resolved(&format!(
        "{}\nvar d: Dog = Dog(name: \"rex\")\nd.name\nd.speak()\nd.missing",
        ANIMALS
    ));

    let types: Vec<&StoredType> = file.typed_expressions[1..]
        .iter()
        .map(|expr| &expr.type_)
        .collect();
    assert_eq!(
        types,
        vec![&StoredType::String, &StoredType::String, &StoredType::Void]
    );

    let TypedExprKind::Assignment(_, init) = &file.typed_expressions[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(init.type_, StoredType::Custom("Dog".to_string()));
}

#[test]
fn test_resolve_fills_typed_bodies() {
    let file = resolved(ANIMALS);

    let dog = file.find_type("Dog").unwrap();
    let body = dog.functions[0].typed_body();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].type_, StoredType::String);
    assert_eq!(dog.init_method.typed_body().len(), 2);
    assert_eq!(
        dog.init_method.typed_body()[1].type_,
        StoredType::Custom("Dog".to_string())
    );
}

#[test]
fn test_resolve_protocol_defaults_with_self() {
    let mut file = parse("protocol Named { var name: String  fun greet() String }");
    let default = crate::parse_source(
        "fun greet() String { return self.name }",
        "test.prance",
    )
    .unwrap()
    .functions
    .pop()
    .unwrap();
    file.protocols[0]
        .defaults
        .insert("greet".to_string(), default);

    resolve_types(&mut file).unwrap();

    let body = file.protocols[0].defaults["greet"].typed_body();
    assert_eq!(body[0].type_, StoredType::String);
}

#[test]
fn test_resolve_calls_use_global_prototypes() {
    let file = resolved("fun double(x: Int) Int { return x * 2 }\ndouble(x: 2)\nunknown()");

    assert_eq!(file.typed_expressions[0].type_, StoredType::Int);
    assert_eq!(file.typed_expressions[1].type_, StoredType::Void);
}

#[test]
fn test_resolve_typed_node_count() {
    let file = resolved("var a: Int = 1 + 2");

    // Assignment, definition, binary and two literals
    assert_eq!(file.typed_expressions[0].node_count(), 5);
}
