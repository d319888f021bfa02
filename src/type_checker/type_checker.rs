use std::collections::HashMap;

use crate::{
    ast::{
        ast::{File, FunctionDefinition, Prototype},
        expressions::{Expr, ExprKind, FunctionArg, FunctionCall},
        types::StoredType,
    },
    errors::errors::{Error, ErrorImpl},
    scope::symbol_table::SymbolTable,
    Position,
};

use super::{
    registry::Registry,
    typed_ast::{TypedExpr, TypedExprKind, TypedFunctionArg, TypedFunctionCall},
};

/// Binding that holds the declared return type of the enclosing body.
///
/// The leading dot keeps it out of the source namespace. Where it is
/// missing, `return` is not allowed.
pub const RETURN_BINDING: &str = ".return";

pub const SELF_BINDING: &str = "self";

/// Infers a type for every expression of a module.
pub struct TypeResolver<'a> {
    registry: &'a Registry,
    globals: &'a HashMap<String, Prototype>,
    scope: SymbolTable<StoredType>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(registry: &'a Registry, globals: &'a HashMap<String, Prototype>) -> Self {
        TypeResolver {
            registry,
            globals,
            scope: SymbolTable::new(),
        }
    }

    fn resolve_function(&mut self, function: &mut FunctionDefinition) -> Result<(), Error> {
        self.scope.start_frame();
        for param in &function.prototype.params {
            self.scope.add_variable(&param.name, param.type_.clone());
        }
        self.scope
            .add_variable(RETURN_BINDING, function.prototype.return_type.clone());

        let typed_body = self.resolve_all(&function.body);
        self.scope.end_frame();

        function.typed_body = Some(typed_body?);
        Ok(())
    }

    fn resolve_all(&mut self, exprs: &[Expr]) -> Result<Vec<TypedExpr>, Error> {
        exprs.iter().map(|expr| self.resolve(expr)).collect()
    }

    fn resolve_call(&mut self, call: &FunctionCall) -> Result<TypedFunctionCall, Error> {
        let args = call
            .args
            .iter()
            .map(|FunctionArg { label, expr }| {
                Ok(TypedFunctionArg {
                    label: label.clone(),
                    expr: self.resolve(expr)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(TypedFunctionCall {
            name: call.name.clone(),
            args,
        })
    }

    fn ensure_same_type(lhs: &TypedExpr, rhs: &TypedExpr, position: &Position) -> Result<(), Error> {
        if lhs.type_.name() == rhs.type_.name() {
            return Ok(());
        }

        Err(Error::new(
            ErrorImpl::InvalidOperation {
                left: lhs.type_.to_string(),
                right: rhs.type_.to_string(),
            },
            position.clone(),
        ))
    }

    pub fn resolve(&mut self, expr: &Expr) -> Result<TypedExpr, Error> {
        let position = expr.position.clone();

        let (kind, type_) = match &expr.kind {
            ExprKind::Literal(literal) => {
                (TypedExprKind::Literal(literal.clone()), literal.stored_type())
            }
            ExprKind::Variable(name) => {
                let type_ = self.scope.find_variable(name, &position)?.clone();
                (TypedExprKind::Variable(name.clone()), type_)
            }
            ExprKind::VariableDefinition(definition) => {
                self.scope
                    .add_variable(&definition.name, definition.type_.clone());
                (
                    TypedExprKind::VariableDefinition(definition.clone()),
                    StoredType::Void,
                )
            }
            ExprKind::MemberProperty(instance, name) => {
                let instance = self.resolve(instance)?;
                let Some(callable) = self.registry.get(instance.type_.name()) else {
                    return Err(Error::new(
                        ErrorImpl::TypeDoesNotContainMembers {
                            type_: instance.type_.to_string(),
                        },
                        position,
                    ));
                };

                // A missing property is reported by the property checker
                let type_ = callable
                    .find_property(name)
                    .map_or(StoredType::Void, |property| property.type_.clone());
                (
                    TypedExprKind::MemberProperty(Box::new(instance), name.clone()),
                    type_,
                )
            }
            ExprKind::MemberCall(instance, call) => {
                let instance = self.resolve(instance)?;
                let call = self.resolve_call(call)?;
                let type_ = self
                    .registry
                    .find_prototype(instance.type_.name(), &call.name)
                    .map_or(StoredType::Void, |prototype| prototype.return_type.clone());
                (
                    TypedExprKind::MemberCall(Box::new(instance), call),
                    type_,
                )
            }
            ExprKind::Call(call) => {
                let call = self.resolve_call(call)?;
                let type_ = self
                    .globals
                    .get(&call.name)
                    .map_or(StoredType::Void, |prototype| prototype.return_type.clone());
                (TypedExprKind::Call(call), type_)
            }
            ExprKind::Assignment(target, value) => {
                let target = self.resolve(target)?;
                let value = self.resolve(value)?;
                (
                    TypedExprKind::Assignment(Box::new(target), Box::new(value)),
                    StoredType::Void,
                )
            }
            ExprKind::Binary(lhs, operator, rhs) => {
                let lhs = self.resolve(lhs)?;
                let rhs = self.resolve(rhs)?;
                Self::ensure_same_type(&lhs, &rhs, &position)?;
                let type_ = lhs.type_.clone();
                (
                    TypedExprKind::Binary(Box::new(lhs), *operator, Box::new(rhs)),
                    type_,
                )
            }
            ExprKind::Logical(lhs, operator, rhs) => {
                let lhs = self.resolve(lhs)?;
                let rhs = self.resolve(rhs)?;
                Self::ensure_same_type(&lhs, &rhs, &position)?;
                (
                    TypedExprKind::Logical(Box::new(lhs), *operator, Box::new(rhs)),
                    StoredType::Int,
                )
            }
            ExprKind::If(condition, thens, elses) => {
                let condition = self.resolve(condition)?;
                let thens = self.resolve_all(thens)?;
                let elses = self.resolve_all(elses)?;
                (
                    TypedExprKind::If(Box::new(condition), thens, elses),
                    StoredType::Void,
                )
            }
            ExprKind::For(init, condition, body) => {
                let init = self.resolve(init)?;
                let condition = self.resolve(condition)?;
                let body = self.resolve_all(body)?;
                (
                    TypedExprKind::For(Box::new(init), Box::new(condition), body),
                    StoredType::Void,
                )
            }
            ExprKind::While(condition, body) => {
                let condition = self.resolve(condition)?;
                let body = self.resolve_all(body)?;
                (
                    TypedExprKind::While(Box::new(condition), body),
                    StoredType::Void,
                )
            }
            ExprKind::Return(value) => match value {
                Some(value) => {
                    let value = self.resolve(value)?;
                    let type_ = value.type_.clone();
                    (TypedExprKind::Return(Some(Box::new(value))), type_)
                }
                None => (TypedExprKind::Return(None), StoredType::Void),
            },
        };

        tracing::trace!(?type_, "resolved expression");
        Ok(TypedExpr::new(kind, type_, position))
    }
}

/// Resolves the type of every expression in `file`, filling in the typed
/// bodies of all functions, methods, initializers and protocol defaults as
/// well as the typed top-level expressions.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve_types(file: &mut File) -> Result<(), Error> {
    let registry = Registry::new(file);
    let globals = file.prototype_map.clone();
    let mut resolver = TypeResolver::new(&registry, &globals);

    for type_ in file.custom_types.iter_mut() {
        resolver.scope.start_frame();
        resolver
            .scope
            .add_variable(SELF_BINDING, StoredType::Custom(type_.name.clone()));

        for function in type_.functions.iter_mut() {
            resolver.resolve_function(function)?;
        }
        resolver.resolve_function(&mut type_.init_method)?;

        resolver.scope.end_frame();
    }

    for protocol in file.protocols.iter_mut() {
        if protocol.defaults.is_empty() {
            continue;
        }

        resolver.scope.start_frame();
        resolver
            .scope
            .add_variable(SELF_BINDING, StoredType::Custom(protocol.name.clone()));

        for prototype in &protocol.prototypes {
            if let Some(default) = protocol.defaults.get_mut(&prototype.name) {
                resolver.resolve_function(default)?;
            }
        }

        resolver.scope.end_frame();
    }

    resolver.scope.start_frame();
    for function in file.functions.iter_mut() {
        resolver.resolve_function(function)?;
    }
    file.typed_expressions = resolver.resolve_all(&file.expressions)?;
    resolver.scope.end_frame();

    tracing::debug!(
        expressions = file.typed_expressions.len(),
        "resolved types"
    );

    Ok(())
}
