//! Unit tests for LLVM IR generation.

use inkwell::context::Context;

use super::compiler::{compile, CompileOptions};
use crate::{check_source, errors::errors::CodegenError};

fn compile_ir(source: &str) -> String {
    let file = check_source(source, "test.prance").unwrap();
    let context = Context::create();
    let module = compile(&file, &context, &CompileOptions::default()).unwrap();
    module.print_to_string().to_string()
}

const ANIMAL: &str = "
protocol Animal { var name: String  fun speak() String  fun legs() Int }
default Animal { fun speak() String { return self.name } }
type Dog: Animal { var name: String  fun legs() Int { return 4 } }
fun describe(animal: Animal) String { return animal.speak() }
";

#[test]
fn test_record_layout_and_initializer() {
    let ir = compile_ir("type Point { var x: Int  var y: Int }");

    assert!(ir.contains("%Point = type { i32, i32, i64, i64 }"));
    assert!(ir.contains("define %Point* @Point(i64 %x, i64 %y)"));
    assert!(ir.contains("@malloc("));
}

#[test]
fn test_initializers_write_dense_tags() {
    let ir = compile_ir("type A { var x: Int }\ntype B { var y: Double }");

    assert!(ir.contains("%B = type { i32, i32, double }"));
    assert!(ir.contains("store i32 0, i32* %tag"));
    assert!(ir.contains("store i32 1, i32* %tag"));
}

#[test]
fn test_if_else_branches_return() {
    let ir = compile_ir(
        "fun max(a: Int, b: Int) Int {\n  if (a > b) { return a } else { return b }\n}",
    );

    assert!(ir.contains("define i64 @max(i64 %a, i64 %b)"));
    assert!(ir.contains("icmp sgt i64 %a, %b"));
    assert!(ir.contains("then:"));
    assert!(ir.contains("else:"));
    assert!(ir.contains("br label %return"));
}

#[test]
fn test_loops_share_one_condition_block() {
    let ir = compile_ir(
        "var x: Int = 0
while (x < 10) { x = x + 1 }
for (var i: Int = 0; i < 3; i = i + 1) { print(line: \"hi\") }",
    );

    assert!(ir.contains("define i32 @main()"));
    assert!(ir.contains("cond:"));
    assert!(ir.contains("body:"));
    assert!(ir.contains("cleanup:"));
    assert!(ir.contains("ret i32 0"));
}

#[test]
fn test_runtime_helpers_are_emitted() {
    let ir = compile_ir("print(line: \"hello\")");

    assert!(ir.contains("declare i32 @printf(i8*, ...)"));
    assert!(ir.contains("declare i32 @scanf(i8*, ...)"));
    assert!(ir.contains("define void @.copyStr(i8* %from, i8* %to, i32 %n)"));
    assert!(ir.contains("define i8* @scanLine()"));
    assert!(ir.contains("define void @print(i8* %line)"));
}

#[test]
fn test_scan_line_measures_stored_bytes() {
    let ir = compile_ir("var word: String = scanLine()");

    // Leading whitespace is skipped before the first counter
    assert!(ir.contains(r#"c" %n%19s%n\00""#));
    assert!(ir.contains(r#"c"%n%19[^ \09\0A\0D]%n\00""#));
    assert!(ir.contains("%raw_count = sub i32 %stop_count, %start_count"));
    assert!(ir.contains("%stored = select i1 %stored_any, i32 %raw_count, i32 0"));
    assert!(ir.contains("%full = icmp eq i32 %stored, 19"));
}

#[test]
fn test_protocol_dispatch_and_stubs() {
    let source = format!(
        "{}var a: Animal = Dog(name: \"rex\")\nprint(line: describe(animal: a))",
        ANIMAL
    );
    let ir = compile_ir(&source);

    assert!(ir.contains("%proto = type { i32, i32 }"));
    assert!(ir.contains("define i8* @Animal.speak(%proto* %self)"));
    assert!(ir.contains("define i64 @Animal.legs(%proto* %self)"));
    assert!(ir.contains("switch i32"));
    assert!(ir.contains("call i8* @Dog.speak("));

    // Dog has no speak of its own, so its stub forwards to the default
    assert!(ir.contains("define i8* @Dog.speak(%Dog* %self)"));
    assert!(ir.contains("define i8* @Animal.speak.default(%proto* %self)"));
    assert!(ir.contains("call i8* @Animal.speak.default("));

    // legs has no default body
    assert!(ir.contains("unreachable"));
}

#[test]
fn test_protocol_properties_use_address_accessor() {
    let ir = compile_ir(ANIMAL);

    assert!(ir.contains("define i8** @Animal.name.address(%proto* %self)"));
    assert!(ir.contains("call i8** @Animal.name.address("));
}

#[test]
fn test_record_passed_as_protocol_is_cast() {
    let source = format!("{}describe(animal: Dog(name: \"fido\"))", ANIMAL);
    let ir = compile_ir(&source);

    assert!(ir.contains("bitcast %Dog* "));
    assert!(ir.contains("call i8* @describe(%proto* "));
}

#[test]
fn test_assigned_parameter_gets_a_slot() {
    let ir = compile_ir("fun bump(a: Int) Int {\n  a = a + 1\n  return a\n}");

    assert!(ir.contains("define i64 @bump(i64 %a)"));
    assert!(ir.contains("alloca i64"));
}

#[test]
fn test_methods_take_self_first() {
    let ir = compile_ir(
        "type Counter { var count: Int  fun next(step: Int) Int { return self.count + step } }
var c: Counter = Counter(count: 1)
c.next(step: 2)",
    );

    assert!(ir.contains("define i64 @Counter.next(%Counter* %self, i64 %step)"));
    assert!(ir.contains("call i64 @Counter.next("));
}

#[test]
fn test_numeric_kinds() {
    let ir = compile_ir(
        "var f: Float = 1.5f\nvar d: Double = 2.5\nvar n: Int = 7 % 2\nvar s: String = \"text\"",
    );

    assert!(ir.contains("alloca float"));
    assert!(ir.contains("alloca double"));
    assert!(ir.contains("alloca i64"));
    assert!(ir.contains("alloca i8*"));
}

#[test]
fn test_module_name_from_options() {
    let file = check_source("var x: Int = 1", "test.prance").unwrap();
    let context = Context::create();
    let options = CompileOptions {
        module_name: String::from("demo"),
        ..CompileOptions::default()
    };

    let module = compile(&file, &context, &options).unwrap();
    assert_eq!(module.get_name().to_str().unwrap(), "demo");
}

#[test]
fn test_unknown_target_is_rejected() {
    let file = check_source("var x: Int = 1", "test.prance").unwrap();
    let context = Context::create();
    let options = CompileOptions {
        target_triple: Some(String::from("nonsense-unknown-nowhere")),
        ..CompileOptions::default()
    };

    assert!(matches!(
        compile(&file, &context, &options),
        Err(CodegenError::Target(_))
    ));
}
