// src/sema/analyzer/stmt.rs

use super::*;
use crate::frontend::{
    DeclStmt, Expr, ForEachStmt, IfStmt, ReturnStmt, Stmt, WhileStmt,
};
use crate::ir::{
    DeclarationNode, ExpressionNode, ForEachIndexableNode, ForEachIterableNode, ForEachRangeNode,
    IfNode, IrStmt, MethodRef, ReturnNode, WhileNode,
};
use crate::sema::catalog::TypeDefKind;
use crate::sema::scope::VarId;

/// Zero-argument method a concrete type must expose to drive a for-each
pub const ITERATOR_METHOD: &str = "iterator";

// Prefixes for variables synthesized by loop lowering; the construct's
// source offset is appended so nested instances never collide.
const ITERATOR_PREFIX: &str = "#itr";
const ARRAY_PREFIX: &str = "#array";
const INDEX_PREFIX: &str = "#index";
const END_PREFIX: &str = "#end";

impl Analyzer<'_> {
    pub(crate) fn analyze_block(
        &mut self,
        block: &Block,
        input: Input,
    ) -> Result<IrBlock, SemanticError> {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(self.analyze_stmt(stmt, input)?);
        }
        Ok(IrBlock {
            stmts,
            span: block.span,
        })
    }

    fn analyze_stmt(&mut self, stmt: &Stmt, input: Input) -> Result<IrStmt, SemanticError> {
        match stmt {
            Stmt::Block(block) => {
                let ir = self.with_frame(|a| a.analyze_block(block, input))?;
                Ok(IrStmt::Block(ir))
            }
            Stmt::Declaration(decl) => self.analyze_declaration(decl),
            Stmt::Expression(expr_stmt) => {
                let out = self.analyze_expr(
                    &expr_stmt.expr,
                    Input {
                        discarded: true,
                        ..input
                    },
                )?;
                Ok(IrStmt::Expression(ExpressionNode {
                    expr: out.node,
                    discarded: true,
                    span: expr_stmt.span,
                }))
            }
            Stmt::If(if_stmt) => self.analyze_if(if_stmt, input),
            Stmt::While(while_stmt) => self.analyze_while(while_stmt, input),
            Stmt::ForEach(for_stmt) => self.analyze_for_each(for_stmt, input),
            Stmt::Return(ret) => self.analyze_return(ret),
            Stmt::Break(span) => {
                if !input.in_loop {
                    return Err(SemanticError::InvalidBreak { span: span.into() });
                }
                Ok(IrStmt::Break { span: *span })
            }
            Stmt::Continue(span) => {
                if !input.in_loop {
                    return Err(SemanticError::InvalidContinue { span: span.into() });
                }
                Ok(IrStmt::Continue { span: *span })
            }
        }
    }

    fn analyze_declaration(&mut self, decl: &DeclStmt) -> Result<IrStmt, SemanticError> {
        let ty = self.resolve_type_expr(&decl.ty, decl.span)?;
        let init = match &decl.init {
            Some(expr) => {
                let out = self.analyze_expr(expr, Input::expecting(ty))?;
                Some(self.cast_to(out, ty, true, true)?)
            }
            None => None,
        };
        // Declared after the initializer so `int x = x` resolves outward
        let variable = self
            .scope
            .declare_variable(decl.span, decl.name, ty, false, self.interner)?;
        Ok(IrStmt::Declaration(DeclarationNode {
            variable,
            ty,
            init,
            span: decl.span,
        }))
    }

    /// Conditions are a strict position: the value must already be `bool`,
    /// with no runtime-checked conversion available.
    fn analyze_condition(&mut self, expr: &Expr) -> Result<IrExpr, SemanticError> {
        let bool_ty = Type::Concrete(self.well_known.bool_ty);
        let out = self.analyze_expr(expr, Input::expecting(bool_ty))?;
        self.cast_to(out, bool_ty, true, false)
    }

    fn analyze_if(&mut self, stmt: &IfStmt, input: Input) -> Result<IrStmt, SemanticError> {
        let condition = self.analyze_condition(&stmt.condition)?;
        let then_block = self.with_frame(|a| a.analyze_block(&stmt.then_block, input))?;
        let else_block = match &stmt.else_block {
            Some(block) => Some(self.with_frame(|a| a.analyze_block(block, input))?),
            None => None,
        };
        Ok(IrStmt::If(IfNode {
            condition,
            then_block,
            else_block,
            span: stmt.span,
        }))
    }

    fn analyze_while(&mut self, stmt: &WhileStmt, input: Input) -> Result<IrStmt, SemanticError> {
        let condition = self.analyze_condition(&stmt.condition)?;
        let body = self.with_frame(|a| {
            a.analyze_block(
                &stmt.body,
                Input {
                    in_loop: true,
                    ..input
                },
            )
        })?;
        Ok(IrStmt::While(WhileNode {
            condition,
            body,
            span: stmt.span,
        }))
    }

    fn analyze_return(&mut self, stmt: &ReturnStmt) -> Result<IrStmt, SemanticError> {
        // Script bodies produce `def`; concrete values box on the way out
        let value = match &stmt.value {
            Some(expr) => {
                let out = self.analyze_expr(expr, Input::expecting(Type::Dynamic))?;
                Some(self.cast_to(out, Type::Dynamic, true, true)?)
            }
            None => None,
        };
        Ok(IrStmt::Return(ReturnNode {
            value,
            span: stmt.span,
        }))
    }

    /// Lower `for (T x in iterable) body`.
    ///
    /// The loop gets its own frame holding the user variable and every
    /// synthesized variable, so repeated entries at runtime reuse the same
    /// slots and siblings that follow the loop reclaim them. The frame pops
    /// on every exit path; a failed body or cast leaves no partial node
    /// behind.
    #[tracing::instrument(skip_all, fields(offset = stmt.span.offset()))]
    fn analyze_for_each(
        &mut self,
        stmt: &ForEachStmt,
        input: Input,
    ) -> Result<IrStmt, SemanticError> {
        self.with_frame(|a| {
            let variable_ty = a.resolve_type_expr(&stmt.decl_ty, stmt.span)?;
            let variable = a.scope.declare_variable(
                stmt.span,
                stmt.name,
                variable_ty,
                true,
                a.interner,
            )?;
            let iterable = a.analyze_expr(&stmt.iterable, Input::default())?;
            let body = a.analyze_block(
                &stmt.body,
                Input {
                    in_loop: true,
                    ..input
                },
            )?;

            match iterable.actual.concrete().map(|id| a.catalog.get_type(id).kind) {
                Some(TypeDefKind::Array { element }) => {
                    a.lower_each_indexable(stmt, iterable, variable, variable_ty, element, body)
                }
                Some(TypeDefKind::Range) => {
                    a.lower_each_range(stmt, iterable, variable, variable_ty, body)
                }
                Some(TypeDefKind::Class) | None => {
                    a.lower_each_iterable(stmt, iterable, variable, variable_ty, body)
                }
            }
        })
    }

    /// The iterable-protocol form: the value must answer a zero-argument
    /// `iterator` call, resolved statically for a concrete receiver and
    /// deferred to runtime dispatch for `def`.
    fn lower_each_iterable(
        &mut self,
        stmt: &ForEachStmt,
        iterable: Output,
        variable: VarId,
        variable_ty: Type,
        body: IrBlock,
    ) -> Result<IrStmt, SemanticError> {
        // The iterator handle needs a slot of its own; the offset suffix
        // keeps the name unique across nested loops.
        let iterator_ty = Type::Concrete(self.well_known.iterator);
        let iterator = self
            .scope
            .declare_internal(iterator_ty, ITERATOR_PREFIX, stmt.span.offset());

        let method = match iterable.actual {
            Type::Dynamic => MethodRef::Deferred,
            Type::Concrete(id) => {
                let method_id = self
                    .catalog
                    .lookup_method(id, ITERATOR_METHOD, 0)
                    .ok_or_else(|| SemanticError::MethodNotFound {
                        receiver: self.catalog.display_type(iterable.actual).to_string(),
                        method: ITERATOR_METHOD.to_string(),
                        arity: 0,
                        span: stmt.span.into(),
                    })?;
                MethodRef::Resolved(method_id)
            }
        };

        // The protocol yields type-erased elements; the declared type is
        // authoritative and narrowing is expected.
        let cast = self
            .casts
            .resolve(stmt.span, Type::Dynamic, variable_ty, true, true)?;

        Ok(IrStmt::ForEachIterable(ForEachIterableNode {
            iterable: iterable.node,
            body,
            variable,
            variable_ty,
            cast,
            iterator,
            iterator_ty,
            method,
            continuous: false,
            span: stmt.span,
        }))
    }

    /// The indexable form: host arrays iterate by position, so the lowering
    /// pins the array value and a counter instead of an iterator handle.
    fn lower_each_indexable(
        &mut self,
        stmt: &ForEachStmt,
        iterable: Output,
        variable: VarId,
        variable_ty: Type,
        element: Type,
        body: IrBlock,
    ) -> Result<IrStmt, SemanticError> {
        let offset = stmt.span.offset();
        let array_ty = iterable.actual;
        let array = self.scope.declare_internal(array_ty, ARRAY_PREFIX, offset);
        let index = self.scope.declare_internal(
            Type::Concrete(self.well_known.int),
            INDEX_PREFIX,
            offset,
        );

        let cast = self
            .casts
            .resolve(stmt.span, element, variable_ty, true, true)?;

        Ok(IrStmt::ForEachIndexable(ForEachIndexableNode {
            iterable: iterable.node,
            body,
            variable,
            variable_ty,
            cast,
            array,
            array_ty,
            index,
            element_ty: element,
            continuous: false,
            span: stmt.span,
        }))
    }

    /// The range form: elements are `int` counted up to a pinned end bound
    fn lower_each_range(
        &mut self,
        stmt: &ForEachStmt,
        iterable: Output,
        variable: VarId,
        variable_ty: Type,
        body: IrBlock,
    ) -> Result<IrStmt, SemanticError> {
        let int_ty = Type::Concrete(self.well_known.int);
        let end = self
            .scope
            .declare_internal(int_ty, END_PREFIX, stmt.span.offset());

        let cast = self
            .casts
            .resolve(stmt.span, int_ty, variable_ty, true, true)?;

        Ok(IrStmt::ForEachRange(ForEachRangeNode {
            iterable: iterable.node,
            body,
            variable,
            variable_ty,
            cast,
            end,
            continuous: false,
            span: stmt.span,
        }))
    }
}
