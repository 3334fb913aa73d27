// src/sema/analyzer/expr.rs

use super::*;
use crate::frontend::{Expr, ExprKind, Symbol};
use crate::ir::{CallNode, Constant, FieldAccessNode, FieldRef, MethodRef, NewNode};
use crate::sema::catalog::DYNAMIC_TYPE_NAME;
use crate::sema::scope::VarId;

impl Analyzer<'_> {
    pub(crate) fn analyze_expr(
        &mut self,
        expr: &Expr,
        input: Input,
    ) -> Result<Output, SemanticError> {
        match &expr.kind {
            ExprKind::IntLiteral(value) => {
                let ty = Type::Concrete(self.well_known.int);
                Ok(Output {
                    actual: ty,
                    node: IrExpr::Constant {
                        value: Constant::Int(*value),
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::BoolLiteral(value) => {
                let ty = Type::Concrete(self.well_known.bool_ty);
                Ok(Output {
                    actual: ty,
                    node: IrExpr::Constant {
                        value: Constant::Bool(*value),
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::StringLiteral(value) => {
                let ty = Type::Concrete(self.well_known.string);
                Ok(Output {
                    actual: ty,
                    node: IrExpr::Constant {
                        value: Constant::Str(value.clone()),
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::NullLiteral => {
                // null adopts the type the position expects; bare null is def
                let ty = input.expected.unwrap_or(Type::Dynamic);
                Ok(Output {
                    actual: ty,
                    node: IrExpr::Constant {
                        value: Constant::Null,
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::Var(sym) => {
                let variable = self.resolve_var(*sym, expr.span)?;
                let ty = self.scope.get(variable).ty;
                Ok(Output {
                    actual: ty,
                    node: IrExpr::VarAccess {
                        variable,
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::Assign { target, value } => {
                let variable = self.resolve_var(*target, expr.span)?;
                let var = self.scope.get(variable);
                if var.read_only {
                    return Err(SemanticError::ReadOnlyAssignment {
                        name: var.name.display(self.interner).to_string(),
                        span: expr.span.into(),
                    });
                }
                let ty = var.ty;
                let out = self.analyze_expr(value, Input::expecting(ty))?;
                let value = self.cast_to(out, ty, true, true)?;
                Ok(Output {
                    actual: ty,
                    node: IrExpr::Assign {
                        variable,
                        value: Box::new(value),
                        ty,
                        span: expr.span,
                    },
                })
            }
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.analyze_call(expr.span, receiver, *method, args),
            ExprKind::Field { receiver, field } => {
                self.analyze_field_access(expr.span, receiver, *field)
            }
            ExprKind::New { ty, args } => self.analyze_new(expr.span, ty, args),
            ExprKind::Cast { ty, value } => {
                let target = self.resolve_type_expr(ty, expr.span)?;
                let out = self.analyze_expr(value, Input::expecting(target))?;
                let node = self.cast_to(out, target, true, true)?;
                Ok(Output {
                    actual: target,
                    node,
                })
            }
        }
    }

    fn resolve_var(&self, sym: Symbol, span: Span) -> Result<VarId, SemanticError> {
        self.scope
            .resolve(sym)
            .ok_or_else(|| SemanticError::UnresolvedName {
                name: self.interner.resolve(sym).to_string(),
                span: span.into(),
            })
    }

    /// Method calls resolve against the catalog when the receiver's static
    /// type is concrete; a `def` receiver defers dispatch to runtime, with
    /// every argument boxed into the dynamic type.
    #[tracing::instrument(skip_all, fields(method = self.interner.resolve(method)))]
    fn analyze_call(
        &mut self,
        span: Span,
        receiver: &Expr,
        method: Symbol,
        args: &[Expr],
    ) -> Result<Output, SemanticError> {
        let recv = self.analyze_expr(receiver, Input::default())?;
        let name = self.interner.resolve(method);

        match recv.actual {
            Type::Dynamic => {
                let mut ir_args = Vec::with_capacity(args.len());
                for arg in args {
                    let out = self.analyze_expr(arg, Input::expecting(Type::Dynamic))?;
                    ir_args.push(self.cast_to(out, Type::Dynamic, true, true)?);
                }
                Ok(Output {
                    actual: Type::Dynamic,
                    node: IrExpr::Call(Box::new(CallNode {
                        receiver: recv.node,
                        method: MethodRef::Deferred,
                        name: name.to_string(),
                        args: ir_args,
                        ret: Type::Dynamic,
                        span,
                    })),
                })
            }
            Type::Concrete(recv_id) => {
                let catalog = self.catalog;
                let method_id = catalog.lookup_method(recv_id, name, args.len()).ok_or_else(
                    || SemanticError::MethodNotFound {
                        receiver: catalog.display_type(recv.actual).to_string(),
                        method: name.to_string(),
                        arity: args.len(),
                        span: span.into(),
                    },
                )?;
                let def = catalog.get_method(method_id);
                let ret = def.return_type;

                let mut ir_args = Vec::with_capacity(args.len());
                for (arg, &param_ty) in args.iter().zip(def.params.iter()) {
                    let out = self.analyze_expr(arg, Input::expecting(param_ty))?;
                    ir_args.push(self.cast_to(out, param_ty, true, true)?);
                }
                Ok(Output {
                    actual: ret,
                    node: IrExpr::Call(Box::new(CallNode {
                        receiver: recv.node,
                        method: MethodRef::Resolved(method_id),
                        name: name.to_string(),
                        args: ir_args,
                        ret,
                        span,
                    })),
                })
            }
        }
    }

    fn analyze_field_access(
        &mut self,
        span: Span,
        receiver: &Expr,
        field: Symbol,
    ) -> Result<Output, SemanticError> {
        let recv = self.analyze_expr(receiver, Input::default())?;
        let name = self.interner.resolve(field);

        let (field_ref, ty) = match recv.actual {
            Type::Dynamic => (FieldRef::Deferred, Type::Dynamic),
            Type::Concrete(recv_id) => {
                let field_id = self.catalog.lookup_field(recv_id, name).ok_or_else(|| {
                    SemanticError::FieldNotFound {
                        receiver: self.catalog.display_type(recv.actual).to_string(),
                        field: name.to_string(),
                        span: span.into(),
                    }
                })?;
                (
                    FieldRef::Resolved(field_id),
                    self.catalog.get_field(field_id).ty,
                )
            }
        };

        Ok(Output {
            actual: ty,
            node: IrExpr::FieldAccess(Box::new(FieldAccessNode {
                receiver: recv.node,
                field: field_ref,
                name: name.to_string(),
                ty,
                span,
            })),
        })
    }

    fn analyze_new(
        &mut self,
        span: Span,
        ty: &TypeExpr,
        args: &[Expr],
    ) -> Result<Output, SemanticError> {
        let target = self.resolve_type_expr(ty, span)?;
        let Some(type_id) = target.concrete() else {
            // `new def(...)` has nothing to construct
            return Err(SemanticError::ConstructorNotFound {
                ty: DYNAMIC_TYPE_NAME.to_string(),
                arity: args.len(),
                span: span.into(),
            });
        };

        let catalog = self.catalog;
        let ctor_id = catalog
            .lookup_constructor(type_id, args.len())
            .ok_or_else(|| SemanticError::ConstructorNotFound {
                ty: catalog.get_type(type_id).name.clone(),
                arity: args.len(),
                span: span.into(),
            })?;
        let ctor = catalog.get_ctor(ctor_id);

        let mut ir_args = Vec::with_capacity(args.len());
        for (arg, &param_ty) in args.iter().zip(ctor.params.iter()) {
            let out = self.analyze_expr(arg, Input::expecting(param_ty))?;
            ir_args.push(self.cast_to(out, param_ty, true, true)?);
        }

        Ok(Output {
            actual: target,
            node: IrExpr::New(Box::new(NewNode {
                ty: target,
                ctor: ctor_id,
                args: ir_args,
                span,
            })),
        })
    }
}
