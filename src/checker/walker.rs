//! Shared traversal for the checker passes.
//!
//! Every pass sees the module exactly the way the resolver did: the same
//! bodies, in the same order, with the same bindings in scope.

use crate::{
    ast::{
        ast::{File, Prototype},
        types::StoredType,
    },
    errors::errors::Error,
    scope::symbol_table::SymbolTable,
    type_checker::{
        registry::Registry,
        type_checker::{RETURN_BINDING, SELF_BINDING},
        typed_ast::{TypedExpr, TypedExprKind},
    },
};

/// One sequence of expressions that is checked as a unit.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    /// Record type or protocol whose `self` is in scope.
    pub self_type: Option<&'a str>,
    /// `None` for the top-level expressions.
    pub prototype: Option<&'a Prototype>,
    pub exprs: &'a [TypedExpr],
}

/// Where in the module the walk currently is.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    pub registry: &'a Registry,
    pub self_type: Option<&'a str>,
    pub function: Option<&'a Prototype>,
    pub in_loop: bool,
}

/// Every body of `file`: methods and initializers per type, protocol
/// defaults, free functions, then the top-level expressions.
pub fn bodies(file: &File) -> Vec<Body<'_>> {
    let mut bodies = vec![];

    for type_ in &file.custom_types {
        for function in type_.functions.iter().chain([&type_.init_method]) {
            bodies.push(Body {
                self_type: Some(&type_.name),
                prototype: Some(&function.prototype),
                exprs: function.typed_body(),
            });
        }
    }

    for protocol in &file.protocols {
        for prototype in &protocol.prototypes {
            if let Some(default) = protocol.defaults.get(&prototype.name) {
                bodies.push(Body {
                    self_type: Some(&protocol.name),
                    prototype: Some(&default.prototype),
                    exprs: default.typed_body(),
                });
            }
        }
    }

    for function in &file.functions {
        bodies.push(Body {
            self_type: None,
            prototype: Some(&function.prototype),
            exprs: function.typed_body(),
        });
    }

    bodies.push(Body {
        self_type: None,
        prototype: None,
        exprs: &file.typed_expressions,
    });

    bodies
}

struct Walker<F> {
    scope: SymbolTable<StoredType>,
    callback: F,
}

impl<F> Walker<F>
where
    F: FnMut(&TypedExpr, &SymbolTable<StoredType>, &WalkContext) -> Result<(), Error>,
{
    fn walk_body(&mut self, body: &Body, registry: &Registry) -> Result<(), Error> {
        let context = WalkContext {
            registry,
            self_type: body.self_type,
            function: body.prototype,
            in_loop: false,
        };

        let frames = self.scope.depth();
        if let Some(self_type) = body.self_type {
            self.scope.start_frame();
            self.scope
                .add_variable(SELF_BINDING, StoredType::Custom(self_type.to_string()));
        }

        self.scope.start_frame();
        if let Some(prototype) = body.prototype {
            for param in &prototype.params {
                self.scope.add_variable(&param.name, param.type_.clone());
            }
            self.scope
                .add_variable(RETURN_BINDING, prototype.return_type.clone());
        }

        let result = self.walk_all(body.exprs, &context);

        while self.scope.depth() > frames {
            self.scope.end_frame();
        }

        result
    }

    fn walk_all(&mut self, exprs: &[TypedExpr], context: &WalkContext) -> Result<(), Error> {
        exprs.iter().try_for_each(|expr| self.walk(expr, context))
    }

    fn walk(&mut self, expr: &TypedExpr, context: &WalkContext) -> Result<(), Error> {
        (self.callback)(expr, &self.scope, context)?;

        let loop_context = WalkContext {
            in_loop: true,
            ..*context
        };

        match &expr.kind {
            TypedExprKind::Literal(_) | TypedExprKind::Variable(_) => Ok(()),
            TypedExprKind::VariableDefinition(definition) => {
                self.scope
                    .add_variable(&definition.name, definition.type_.clone());
                Ok(())
            }
            TypedExprKind::MemberProperty(instance, _) => self.walk(instance, context),
            TypedExprKind::MemberCall(instance, call) => {
                self.walk(instance, context)?;
                call.args
                    .iter()
                    .try_for_each(|arg| self.walk(&arg.expr, context))
            }
            TypedExprKind::Call(call) => call
                .args
                .iter()
                .try_for_each(|arg| self.walk(&arg.expr, context)),
            TypedExprKind::Assignment(lhs, rhs)
            | TypedExprKind::Binary(lhs, _, rhs)
            | TypedExprKind::Logical(lhs, _, rhs) => {
                self.walk(lhs, context)?;
                self.walk(rhs, context)
            }
            TypedExprKind::If(condition, thens, elses) => {
                self.walk(condition, context)?;
                self.walk_all(thens, context)?;
                self.walk_all(elses, context)
            }
            TypedExprKind::For(init, condition, body) => {
                self.walk(init, context)?;
                self.walk(condition, context)?;
                self.walk_all(body, &loop_context)
            }
            TypedExprKind::While(condition, body) => {
                self.walk(condition, context)?;
                self.walk_all(body, &loop_context)
            }
            TypedExprKind::Return(value) => match value {
                Some(value) => self.walk(value, context),
                None => Ok(()),
            },
        }
    }
}

/// Visits every typed expression of `file` in pre-order, left to right.
///
/// `callback` runs before a node's children and sees the bindings that are
/// in scope at that node. A variable definition becomes visible only after
/// its own callback has run.
pub fn walk_file<F>(file: &File, registry: &Registry, callback: F) -> Result<(), Error>
where
    F: FnMut(&TypedExpr, &SymbolTable<StoredType>, &WalkContext) -> Result<(), Error>,
{
    let mut walker = Walker {
        scope: SymbolTable::new(),
        callback,
    };

    for body in bodies(file) {
        walker.walk_body(&body, registry)?;
    }

    Ok(())
}
