//! Unit tests for the scoped symbol table.

use std::rc::Rc;

use super::symbol_table::SymbolTable;
use crate::{ast::types::StoredType, Position};

fn position() -> Position {
    Position(0, Rc::new("test.prance".to_string()))
}

#[test]
fn test_find_searches_innermost_first() {
    let mut table = SymbolTable::new();
    table.start_frame();
    table.add_variable("x", StoredType::Int);
    table.start_frame();
    table.add_variable("x", StoredType::Double);

    assert_eq!(table.find_variable("x", &position()).unwrap(), &StoredType::Double);

    table.end_frame();
    assert_eq!(table.find_variable("x", &position()).unwrap(), &StoredType::Int);
}

#[test]
fn test_unknown_variable() {
    let mut table: SymbolTable<StoredType> = SymbolTable::new();
    table.start_frame();

    let error = table.find_variable("missing", &position()).unwrap_err();
    assert_eq!(error.get_error_name(), "UnknownVariable");
}

#[test]
fn test_contains_in_current_frame_ignores_outer_frames() {
    let mut table = SymbolTable::new();
    table.start_frame();
    table.add_variable("outer", StoredType::Int);
    table.start_frame();

    assert!(!table.contains_in_current_frame("outer"));
    assert!(table.lookup("outer").is_some());

    table.add_variable("inner", StoredType::String);
    assert!(table.contains_in_current_frame("inner"));
}

#[test]
fn test_statics_are_visible() {
    let mut table = SymbolTable::new();
    table.start_frame();
    table.add_static("param", 7);
    table.start_frame();

    assert_eq!(table.lookup("param"), Some(&7));
    assert!(!table.contains_in_current_frame("param"));
}

#[test]
fn test_variables_shadow_statics_in_same_frame() {
    let mut table = SymbolTable::new();
    table.start_frame();
    table.add_static("value", 1);
    table.add_variable("value", 2);

    assert_eq!(table.lookup("value"), Some(&2));
}

#[test]
fn test_popped_frame_is_gone() {
    let mut table = SymbolTable::new();
    table.start_frame();
    table.start_frame();
    table.add_variable("temp", StoredType::Int);
    assert_eq!(table.depth(), 2);

    table.end_frame();
    assert_eq!(table.depth(), 1);
    assert!(table.lookup("temp").is_none());
}

#[test]
fn test_add_without_frame_is_ignored() {
    let mut table = SymbolTable::new();
    table.add_variable("x", StoredType::Int);
    assert!(table.lookup("x").is_none());
}
