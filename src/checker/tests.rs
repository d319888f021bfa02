//! Unit tests for the checker pipeline.
//!
//! Each test feeds a small program through `check_source` and asserts on the
//! name of the first diagnostic, or on the shape of the checked module.

use pretty_assertions::assert_eq;

use super::{checker::check_file, extensions::merge_extensions, returns::always_returns};
use crate::{ast::types::StoredType, check_source, parse_source};

fn error_name(source: &str) -> String {
    match check_source(source, "test.prance") {
        Ok(_) => String::from("no error"),
        Err(error) => error.get_error_name().to_string(),
    }
}

const ANIMAL: &str = "
protocol Animal { var name: String  fun speak() String  fun legs() Int }
default Animal { fun speak() String { return self.name } }
";

#[test]
fn test_clean_program_passes() {
    let source = "
fun max(a: Int, b: Int) Int {
  if (a > b) { return a } else { return b }
}
var x: Int = max(a: 1, b: 2)
for (var i: Int = 0; i < 10; i = i + 1) {
  x = x + i
}
while (x > 0) { x = x - 1 }
print(line: \"done\")
";
    assert!(check_source(source, "test.prance").is_ok());
}

#[test]
fn test_type_gets_initializer_without_stubs() {
    let file = check_source("type Point { var x: Int  var y: Int }", "test.prance").unwrap();
    let point = file.find_type("Point").unwrap();

    let params: Vec<&str> = point
        .init_method
        .prototype
        .params
        .iter()
        .map(|param| param.name.as_str())
        .collect();
    assert_eq!(params, vec!["x", "y"]);
    assert_eq!(
        point.init_method.prototype.return_type,
        StoredType::Custom("Point".to_string())
    );
    assert!(point.protocol_conformance_stubs.is_empty());
}

#[test]
fn test_missing_return() {
    assert_eq!(error_name("fun f() Int { var x: Int }"), "NoReturnInFunction");
}

#[test]
fn test_loop_does_not_count_as_return() {
    assert_eq!(
        error_name("fun f() Int { while (1 < 2) { var x: Int } }"),
        "NoReturnInFunction"
    );
}

#[test]
fn test_if_without_else_does_not_return() {
    assert_eq!(
        error_name("fun f(a: Int) Int { if (a > 1) { return 1 } }"),
        "NoReturnInFunction"
    );
}

#[test]
fn test_wrong_argument_label() {
    assert_eq!(
        error_name("fun foo(b: Int) {}\nfoo(a: 1)"),
        "UnexpectedArgumentInCall"
    );
}

#[test]
fn test_unlabelled_argument() {
    assert_eq!(error_name("fun foo(b: Int) {}\nfoo(1)"), "UnexpectedArgumentInCall");
}

#[test]
fn test_argument_counts() {
    assert_eq!(error_name("fun foo(b: Int) {}\nfoo()"), "MissingArguments");
    assert_eq!(
        error_name("fun foo(b: Int) {}\nfoo(b: 1, c: 2)"),
        "UnexpectedArguments"
    );
}

#[test]
fn test_wrong_argument_type() {
    assert_eq!(
        error_name("fun foo(b: Int) {}\nfoo(b: \"text\")"),
        "WrongArgumentType"
    );
}

#[test]
fn test_unknown_function() {
    assert_eq!(error_name("missing()"), "UnknownFunction");
}

#[test]
fn test_condition_must_be_comparison() {
    assert_eq!(
        error_name("var x: Int = 1\nwhile (x) {}"),
        "LoopConditionMustBeComparison"
    );
    assert_eq!(
        error_name("var x: Int = 1\nif (x) {}"),
        "LoopConditionMustBeComparison"
    );
}

#[test]
fn test_return_inside_loop() {
    assert_eq!(
        error_name("fun f() { while (1 < 2) { return } }"),
        "ReturnInsideLoop"
    );
}

#[test]
fn test_return_outside_function() {
    assert_eq!(error_name("return 1"), "UnexpectedReturn");
}

#[test]
fn test_return_type_mismatch() {
    assert_eq!(
        error_name("fun f() Int { return \"text\" }"),
        "ReturnTypeMismatch"
    );
    assert_eq!(error_name("fun f() { return 1 }"), "ReturnTypeMismatch");
}

#[test]
fn test_unreachable_code() {
    assert_eq!(
        error_name("fun f() Int { return 1\n var x: Int }"),
        "UnreachableCode"
    );
    assert_eq!(
        error_name(
            "fun f(a: Int) Int {\n  if (a > 0) { return 1 } else { return 2 }\n  print(line: \"x\")\n}"
        ),
        "UnreachableCode"
    );
    assert_eq!(
        error_name("fun f(a: Int) Int {\n  if (a > 0) { return 1 }\n  return 2\n}"),
        "no error"
    );
}

#[test]
fn test_duplicate_definitions() {
    assert_eq!(error_name("fun f() {}\nfun f() {}"), "DuplicateDefinition");
    assert_eq!(error_name("var x: Int\nvar x: Int"), "DuplicateDefinition");
    assert_eq!(error_name("fun print(line: String) {}"), "DuplicateDefinition");
    assert_eq!(
        error_name("type A { var x: Int  var x: Int }"),
        "DuplicateDefinition"
    );
    assert_eq!(
        error_name("fun f(a: Int) { var a: Int }"),
        "DuplicateDefinition"
    );
    assert_eq!(
        error_name("type A { var x: Int  fun f() { var x: Int } }"),
        "DuplicateDefinition"
    );
}

#[test]
fn test_shadowing_outer_frame_is_allowed() {
    assert_eq!(error_name("var a: Int\nfun f() { var a: Int }"), "no error");
}

#[test]
fn test_undefined_types() {
    assert_eq!(error_name("fun f(a: Unicorn) {}"), "UndefinedType");
    assert_eq!(error_name("extern f() Unicorn"), "UndefinedType");
    assert_eq!(error_name("type A { var u: Unicorn }"), "UndefinedType");
    assert_eq!(error_name("var u: Unicorn"), "UndefinedType");
}

#[test]
fn test_invalid_operations() {
    assert_eq!(error_name("var a: String\na + a"), "InvalidOperation");
    assert_eq!(error_name("var a: Double\na % a"), "InvalidOperation");
    assert_eq!(error_name("var a: Double\na && a"), "InvalidOperation");
    assert_eq!(error_name("var a: Int\na < 1.5"), "InvalidOperation");
    assert_eq!(error_name("var a: Double\na * 2.0"), "no error");
}

#[test]
fn test_property_references() {
    assert_eq!(
        error_name("type A { var x: Int }\nvar a: A = A(x: 1)\na.y"),
        "UnknownMember"
    );
    assert_eq!(
        error_name("type A { var x: Int }\nvar a: A = A(x: 1)\na.x = 2"),
        "no error"
    );
}

#[test]
fn test_member_call_on_primitive() {
    assert_eq!(
        error_name("var a: Int\na.run()"),
        "TypeDoesNotContainMembers"
    );
}

#[test]
fn test_assignments() {
    assert_eq!(error_name("var a: Int = \"text\""), "TypeMismatch");
    assert_eq!(error_name("fun f() Int { return 1 }\nf() = 1"), "UnableToAssign");
}

#[test]
fn test_protocol_conformance_adds_stub() {
    let source = format!(
        "{}type Dog: Animal {{ var name: String  fun legs() Int {{ return 4 }} }}",
        ANIMAL
    );
    let file = check_source(&source, "test.prance").unwrap();
    let dog = file.find_type("Dog").unwrap();

    assert_eq!(dog.protocol_conformance_stubs.len(), 1);
    assert_eq!(dog.protocol_conformance_stubs[0].0, "Animal");
    assert_eq!(dog.protocol_conformance_stubs[0].1.name, "speak");
}

#[test]
fn test_protocol_conformance_failures() {
    assert_eq!(
        error_name(&format!("{}type Dog: Animal {{ var name: String }}", ANIMAL)),
        "UnimplementedProtocol"
    );
    assert_eq!(error_name("type Dog: Ghost {}"), "UnknownProtocol");
    assert_eq!(
        error_name(&format!(
            "{}type Dog: Animal {{ fun legs() Int {{ return 4 }} }}",
            ANIMAL
        )),
        "UnimplementedProtocol"
    );
    assert_eq!(
        error_name(&format!(
            "{}type Dog: Animal {{ var name: Int  fun legs() Int {{ return 4 }} }}",
            ANIMAL
        )),
        "UnimplementedProtocol"
    );
    assert_eq!(
        error_name(&format!(
            "{}type Dog: Animal {{ var name: String  fun legs() String {{ return \"4\" }} }}",
            ANIMAL
        )),
        "UnimplementedProtocol"
    );
}

#[test]
fn test_wrong_signature_for_required_method() {
    assert_eq!(
        error_name(
            "protocol Animal { fun speak() String }
type Dog: Animal { var x: Int  fun speak(loud: Int) String { return \"woof\" } }"
        ),
        "UnimplementedProtocol"
    );

    // With a default the mismatch is reported against the declaration
    assert_eq!(
        error_name(&format!(
            "{}type Dog: Animal {{ var name: String  fun legs() Int {{ return 4 }}  fun speak(loud: Int) String {{ return \"woof\" }} }}",
            ANIMAL
        )),
        "FunctionDoesNotMatchDeclaration"
    );
}

#[test]
fn test_conflicting_protocol_defaults() {
    let source = "protocol A { fun speak() String }
protocol B { fun speak() String }
default A { fun speak() String { return \"A\" } }
default B { fun speak() String { return \"B\" } }
type Dog: A, B { var x: Int }";

    let error = check_source(source, "test.prance").unwrap_err();
    assert_eq!(error.get_error_name(), "DuplicateDefinition");
    assert!(error.to_string().contains("Dog.speak"));

    // Implementing the method resolves the conflict
    assert_eq!(
        error_name(
            "protocol A { fun speak() String }
protocol B { fun speak() String }
default A { fun speak() String { return \"A\" } }
default B { fun speak() String { return \"B\" } }
type Dog: A, B { var x: Int  fun speak() String { return \"dog\" } }"
        ),
        "no error"
    );
}

#[test]
fn test_protocol_typed_values() {
    let source = format!(
        "{}type Dog: Animal {{ var name: String  fun legs() Int {{ return 4 }} }}
fun describe(animal: Animal) String {{ return animal.speak() }}
var a: Animal = Dog(name: \"rex\")
describe(animal: a)
describe(animal: Dog(name: \"fido\"))
a.legs()",
        ANIMAL
    );
    assert_eq!(error_name(&source), "no error");
}

#[test]
fn test_defaulted_method_callable_on_concrete_type() {
    let source = format!(
        "{}type Dog: Animal {{ var name: String  fun legs() Int {{ return 4 }} }}
var d: Dog = Dog(name: \"rex\")
print(line: d.speak())",
        ANIMAL
    );
    assert_eq!(error_name(&source), "no error");
}

#[test]
fn test_extensions_and_defaults() {
    assert_eq!(
        error_name("type A { var x: Int }\nextension A { fun double() Int { return self.x * 2 } }\nvar a: A = A(x: 1)\na.double()"),
        "no error"
    );
    assert_eq!(
        error_name("extension Missing { fun f() {} }"),
        "CouldNotFindTypeForExtension"
    );
    assert_eq!(
        error_name("default Missing { fun f() {} }"),
        "CouldNotFindTypeForExtension"
    );
    assert_eq!(
        error_name("protocol P { fun f() }\ndefault P { fun g() {} }"),
        "UnknownFunction"
    );
    assert_eq!(
        error_name("protocol P { fun f() }\ndefault P { fun f() Int { return 1 } }"),
        "FunctionDoesNotMatchDeclaration"
    );
}

#[test]
fn test_merge_consumes_blocks() {
    let mut file = parse_source(
        "type A { var x: Int }\nextension A { fun f() {} }",
        "test.prance",
    )
    .unwrap();

    merge_extensions(&mut file).unwrap();
    merge_extensions(&mut file).unwrap();

    assert!(file.extensions.is_empty());
    assert_eq!(file.find_type("A").unwrap().functions.len(), 1);
}

#[test]
fn test_check_file_is_idempotent() {
    let source = format!(
        "{}type Dog: Animal {{ var name: String  fun legs() Int {{ return 4 }} }}\nextension Dog {{ fun wag() {{}} }}",
        ANIMAL
    );
    let mut file = parse_source(&source, "test.prance").unwrap();

    check_file(&mut file).unwrap();
    let first = file.clone();
    check_file(&mut file).unwrap();

    assert_eq!(file, first);
    assert_eq!(file.find_type("Dog").unwrap().protocol_conformance_stubs.len(), 1);
}

#[test]
fn test_always_returns() {
    let file = check_source(
        "fun f(a: Int) Int { if (a > 1) { return 1 } else { if (a > 0) { return 2 } else { return 3 } } }",
        "test.prance",
    )
    .unwrap();

    let body = file.functions.last().unwrap().typed_body();
    assert!(always_returns(body));
    assert!(!always_returns(&[]));
}

#[test]
fn test_diagnostic_position() {
    let error = check_source("var x: Int = 1\nwhile (x) {}", "test.prance").unwrap_err();

    // Points at the condition inside the parentheses
    assert_eq!(error.get_position().0, 22);
}
