//! Type system definitions for the AST.
//!
//! This module defines the stored types every expression resolves to:
//!
//! - Primitive types (integers, floats, doubles, strings, void)
//! - Custom types naming a record type or a protocol
//!
//! Types are compared by name. A custom type name is only a reference, the
//! type registry decides whether it names a record type or a protocol.

use std::fmt::Display;

/// A resolved, name-bearing type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoredType {
    Int,
    Float,
    Double,
    String,
    Void,
    Custom(String),
}

impl StoredType {
    /// Maps a source type name onto a stored type.
    ///
    /// Every name that is not a primitive becomes a custom type. Whether it
    /// exists is checked later against the type registry.
    pub fn from_name(name: &str) -> StoredType {
        match name {
            "Int" => StoredType::Int,
            "Float" => StoredType::Float,
            "Double" => StoredType::Double,
            "String" => StoredType::String,
            "Void" | "" => StoredType::Void,
            other => StoredType::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StoredType::Int => "Int",
            StoredType::Float => "Float",
            StoredType::Double => "Double",
            StoredType::String => "String",
            StoredType::Void => "",
            StoredType::Custom(name) => name,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, StoredType::Void)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, StoredType::Int | StoredType::Double)
    }
}

impl Display for StoredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoredType::Void => write!(f, "Void"),
            _ => write!(f, "{}", self.name()),
        }
    }
}
