//! Name lookup for record types and protocols.
//!
//! The registry is built once from a module and answers the questions every
//! later stage asks about custom types: does the name exist, what members
//! does it expose, and which concrete types may stand in for it.

use crate::ast::{
    ast::{File, ProtocolDefinition, Prototype, TypeDefinition},
    expressions::VariableDefinition,
    types::StoredType,
};

/// Anything that can appear before a `.`: a record type or a protocol.
#[derive(Debug, Clone, Copy)]
pub enum CallableType<'a> {
    Concrete(&'a TypeDefinition),
    Protocol(&'a ProtocolDefinition),
}

impl<'a> CallableType<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            CallableType::Concrete(type_) => &type_.name,
            CallableType::Protocol(protocol) => &protocol.name,
        }
    }

    pub fn properties(&self) -> &'a [VariableDefinition] {
        match *self {
            CallableType::Concrete(type_) => &type_.properties,
            CallableType::Protocol(protocol) => &protocol.properties,
        }
    }

    /// Methods followed by conformance stubs for a record type, or the
    /// required prototypes for a protocol.
    pub fn prototypes(&self) -> Vec<&'a Prototype> {
        match *self {
            CallableType::Concrete(type_) => type_.prototypes(),
            CallableType::Protocol(protocol) => protocol.prototypes.iter().collect(),
        }
    }

    pub fn find_property(&self, name: &str) -> Option<&'a VariableDefinition> {
        self.properties()
            .iter()
            .find(|property| property.name == name)
    }

    /// Searches only the members declared on this type.
    pub fn find_prototype(&self, name: &str) -> Option<&'a Prototype> {
        self.prototypes()
            .into_iter()
            .find(|prototype| prototype.name == name)
    }
}

/// Every record type and protocol of a module, by name.
#[derive(Debug, Clone)]
pub struct Registry {
    types: Vec<TypeDefinition>,
    protocols: Vec<ProtocolDefinition>,
}

impl Registry {
    pub fn new(file: &File) -> Self {
        Registry {
            types: file.custom_types.clone(),
            protocols: file.protocols.clone(),
        }
    }

    /// Record types shadow protocols of the same name.
    pub fn get(&self, name: &str) -> Option<CallableType<'_>> {
        if let Some(type_) = self.types.iter().find(|type_| type_.name == name) {
            return Some(CallableType::Concrete(type_));
        }

        self.protocols
            .iter()
            .find(|protocol| protocol.name == name)
            .map(CallableType::Protocol)
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|type_| type_.name == name)
    }

    pub fn get_protocol(&self, name: &str) -> Option<&ProtocolDefinition> {
        self.protocols.iter().find(|protocol| protocol.name == name)
    }

    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    pub fn protocols(&self) -> &[ProtocolDefinition] {
        &self.protocols
    }

    /// Primitives are always known, custom types only if registered.
    pub fn is_known(&self, type_: &StoredType) -> bool {
        match type_ {
            StoredType::Custom(name) => self.get(name).is_some(),
            _ => true,
        }
    }

    /// Looks up a method on a record type or protocol.
    ///
    /// A record type also answers with the requirements of the protocols it
    /// conforms to, so calls to defaulted methods resolve before the
    /// conformance stubs exist.
    pub fn find_prototype(&self, type_name: &str, method: &str) -> Option<&Prototype> {
        match self.get(type_name)? {
            CallableType::Concrete(type_) => CallableType::Concrete(type_)
                .find_prototype(method)
                .or_else(|| {
                    type_
                        .protocols
                        .iter()
                        .filter_map(|protocol| self.get_protocol(protocol))
                        .find_map(|protocol| protocol.find_prototype(method))
                }),
            CallableType::Protocol(protocol) => protocol.find_prototype(method),
        }
    }

    /// Record types declaring conformance to `protocol`, in declaration order.
    pub fn conforming_types(&self, protocol: &str) -> Vec<&TypeDefinition> {
        self.types
            .iter()
            .filter(|type_| type_.protocols.iter().any(|name| name == protocol))
            .collect()
    }

    /// Names of the types whose values are accepted where `type_` is expected.
    pub fn valid_type_names(&self, type_: &StoredType) -> Vec<String> {
        let name = type_.name().to_string();

        match self.get(&name) {
            Some(CallableType::Protocol(_)) => {
                let mut names: Vec<String> = self
                    .conforming_types(&name)
                    .into_iter()
                    .map(|conforming| conforming.name.clone())
                    .collect();
                names.push(name);
                names
            }
            _ => vec![name],
        }
    }

    pub fn accepts(&self, expected: &StoredType, received: &StoredType) -> bool {
        self.valid_type_names(expected)
            .iter()
            .any(|name| name == received.name())
    }
}

/// Assigns every record type its runtime tag, `0..n` in declaration order.
///
/// Runs once, after checking and before emission.
pub fn finalize_type_tags(file: &mut File) {
    for (tag, type_) in file.custom_types.iter_mut().enumerate() {
        type_.tag = Some(tag as u32);
    }
}
