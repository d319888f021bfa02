use std::{collections::HashMap, rc::Rc};

use crate::{type_checker::typed_ast::TypedExpr, Position};

use super::{
    expressions::{Expr, ExprKind, FunctionArg, FunctionCall, LiteralValue, VariableDefinition},
    types::StoredType,
};

/// A function or method signature.
///
/// Parameter names are part of the call contract: every call labels its
/// arguments with them.
#[derive(Debug, Clone)]
pub struct Prototype {
    pub name: String,
    pub params: Vec<VariableDefinition>,
    pub return_type: StoredType,
    pub position: Position,
}

impl PartialEq for Prototype {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.return_type.name() == other.return_type.name()
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(lhs, rhs)| lhs.name == rhs.name && lhs.type_.name() == rhs.type_.name())
    }
}

impl Prototype {
    pub fn new(
        name: &str,
        params: Vec<VariableDefinition>,
        return_type: StoredType,
        position: Position,
    ) -> Self {
        Prototype {
            name: name.to_string(),
            params,
            return_type,
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub prototype: Prototype,
    pub body: Vec<Expr>,
    pub typed_body: Option<Vec<TypedExpr>>,
}

impl FunctionDefinition {
    pub fn new(prototype: Prototype, body: Vec<Expr>) -> Self {
        FunctionDefinition {
            prototype,
            body,
            typed_body: None,
        }
    }

    /// The resolved body, empty until type resolution has run.
    pub fn typed_body(&self) -> &[TypedExpr] {
        self.typed_body.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub position: Position,
    pub properties: Vec<VariableDefinition>,
    pub functions: Vec<FunctionDefinition>,
    pub protocols: Vec<String>,
    /// Methods forwarded to a protocol default, as `(protocol, prototype)`.
    pub protocol_conformance_stubs: Vec<(String, Prototype)>,
    /// Dense runtime tag, assigned by `finalize_type_tags`.
    pub tag: Option<u32>,
    pub init_method: FunctionDefinition,
}

impl TypeDefinition {
    pub fn new(
        name: &str,
        properties: Vec<VariableDefinition>,
        functions: Vec<FunctionDefinition>,
        protocols: Vec<String>,
        position: Position,
    ) -> Self {
        let init_method = synthesize_init_method(name, &properties, &position);

        TypeDefinition {
            name: name.to_string(),
            position,
            properties,
            functions,
            protocols,
            protocol_conformance_stubs: vec![],
            tag: None,
            init_method,
        }
    }

    /// Methods followed by conformance stubs.
    pub fn prototypes(&self) -> Vec<&Prototype> {
        self.functions
            .iter()
            .map(|function| &function.prototype)
            .chain(self.protocol_conformance_stubs.iter().map(|(_, stub)| stub))
            .collect()
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|property| property.name == name)
    }
}

/// Builds `Name(prop: ...) -> Name`, assigning each property from the
/// parameter of the same name and returning `self`.
fn synthesize_init_method(
    name: &str,
    properties: &[VariableDefinition],
    position: &Position,
) -> FunctionDefinition {
    let expr = |kind: ExprKind| Expr::new(kind, position.clone());

    let mut body = properties
        .iter()
        .map(|property| {
            expr(ExprKind::Assignment(
                Box::new(expr(ExprKind::MemberProperty(
                    Box::new(expr(ExprKind::Variable(String::from("self")))),
                    property.name.clone(),
                ))),
                Box::new(expr(ExprKind::Variable(property.name.clone()))),
            ))
        })
        .collect::<Vec<Expr>>();

    body.push(expr(ExprKind::Return(Some(Box::new(expr(
        ExprKind::Variable(String::from("self")),
    ))))));

    FunctionDefinition::new(
        Prototype::new(
            name,
            properties.to_vec(),
            StoredType::Custom(name.to_string()),
            position.clone(),
        ),
        body,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDefinition {
    pub name: String,
    pub position: Position,
    pub properties: Vec<VariableDefinition>,
    pub prototypes: Vec<Prototype>,
    pub defaults: HashMap<String, FunctionDefinition>,
}

impl ProtocolDefinition {
    pub fn new(
        name: &str,
        properties: Vec<VariableDefinition>,
        prototypes: Vec<Prototype>,
        position: Position,
    ) -> Self {
        ProtocolDefinition {
            name: name.to_string(),
            position,
            properties,
            prototypes,
            defaults: HashMap::new(),
        }
    }

    pub fn find_prototype(&self, name: &str) -> Option<&Prototype> {
        self.prototypes
            .iter()
            .find(|prototype| prototype.name == name)
    }
}

/// Functions attached to an existing declaration, from either an
/// `extension` block or a `default` block.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionDefinition {
    pub name: String,
    pub position: Position,
    pub functions: Vec<FunctionDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Function(FunctionDefinition),
    Extern(Prototype),
    Type(TypeDefinition),
    Protocol(ProtocolDefinition),
    Extension(ExtensionDefinition),
    Default(ExtensionDefinition),
}

/// A whole compilation unit.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub externs: Vec<Prototype>,
    pub functions: Vec<FunctionDefinition>,
    pub expressions: Vec<Expr>,
    pub typed_expressions: Vec<TypedExpr>,
    pub prototype_map: HashMap<String, Prototype>,
    /// Every file-scope name in declaration order, duplicates included.
    pub declared_names: Vec<(String, Position)>,
    pub custom_types: Vec<TypeDefinition>,
    pub protocols: Vec<ProtocolDefinition>,
    pub extensions: Vec<ExtensionDefinition>,
    pub defaults: Vec<ExtensionDefinition>,
}

impl Default for File {
    fn default() -> Self {
        Self::new()
    }
}

impl File {
    /// Creates a module pre-seeded with the runtime prelude: `printf`,
    /// `scanf`, `scanLine` and the built-in `print(line:)`.
    pub fn new() -> Self {
        let mut file = File {
            externs: vec![],
            functions: vec![],
            expressions: vec![],
            typed_expressions: vec![],
            prototype_map: HashMap::new(),
            declared_names: vec![],
            custom_types: vec![],
            protocols: vec![],
            extensions: vec![],
            defaults: vec![],
        };

        let prelude = Position(0, Rc::new(String::from("<prelude>")));
        let io_params = || {
            vec![
                VariableDefinition::new("format", StoredType::String),
                VariableDefinition::new("str", StoredType::String),
            ]
        };

        file.add_extern(Prototype::new(
            "printf",
            io_params(),
            StoredType::Void,
            prelude.clone(),
        ));
        file.add_extern(Prototype::new(
            "scanf",
            io_params(),
            StoredType::Void,
            prelude.clone(),
        ));
        file.add_extern(Prototype::new(
            "scanLine",
            vec![],
            StoredType::String,
            prelude.clone(),
        ));

        let expr = |kind: ExprKind| Expr::new(kind, prelude.clone());
        let print_body = vec![expr(ExprKind::Call(FunctionCall {
            name: String::from("printf"),
            args: vec![
                FunctionArg {
                    label: Some(String::from("format")),
                    expr: expr(ExprKind::Literal(LiteralValue::String(String::from("%s\n")))),
                },
                FunctionArg {
                    label: Some(String::from("str")),
                    expr: expr(ExprKind::Variable(String::from("line"))),
                },
            ],
        }))];

        file.add_function_definition(FunctionDefinition::new(
            Prototype::new(
                "print",
                vec![VariableDefinition::new("line", StoredType::String)],
                StoredType::Void,
                prelude.clone(),
            ),
            print_body,
        ));

        file
    }

    pub fn prototype(&self, name: &str) -> Option<&Prototype> {
        self.prototype_map.get(name)
    }

    pub fn add_definition(&mut self, definition: Definition) {
        match definition {
            Definition::Function(function) => self.add_function_definition(function),
            Definition::Extern(prototype) => self.add_extern(prototype),
            Definition::Type(type_) => self.add_type(type_),
            Definition::Protocol(protocol) => self.protocols.push(protocol),
            Definition::Extension(extension) => self.extensions.push(extension),
            Definition::Default(default) => self.defaults.push(default),
        }
    }

    pub fn add_expression(&mut self, expression: Expr) {
        self.expressions.push(expression);
    }

    pub fn add_extern(&mut self, prototype: Prototype) {
        self.declare_name(&prototype);
        self.externs.push(prototype);
    }

    pub fn add_function_definition(&mut self, definition: FunctionDefinition) {
        self.declare_name(&definition.prototype);
        self.functions.push(definition);
    }

    pub fn add_type(&mut self, type_: TypeDefinition) {
        self.declare_name(&type_.init_method.prototype);
        self.custom_types.push(type_);
    }

    fn declare_name(&mut self, prototype: &Prototype) {
        self.declared_names
            .push((prototype.name.clone(), prototype.position.clone()));
        self.prototype_map
            .insert(prototype.name.clone(), prototype.clone());
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.custom_types.iter().find(|type_| type_.name == name)
    }

    pub fn find_protocol(&self, name: &str) -> Option<&ProtocolDefinition> {
        self.protocols.iter().find(|protocol| protocol.name == name)
    }
}
