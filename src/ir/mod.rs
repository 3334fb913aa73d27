// src/ir/mod.rs
//! The lowering-ready tree handed to the code generator.
//!
//! Every node carries fully resolved types, casts, member references, and
//! variable identities; the generator switches on the tag and consumes the
//! fields directly, with no further resolution of its own. Nodes keep their
//! source span for error attribution in later stages.

use crate::frontend::Span;
use crate::sema::cast::Cast;
use crate::sema::catalog::{CtorId, FieldId, MethodId};
use crate::sema::scope::VarId;
use crate::sema::types::Type;

/// A method resolved at analysis time, or deferred to runtime dispatch
/// because the receiver's static type was `def`. Frozen into the IR node;
/// never re-resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRef {
    Resolved(MethodId),
    /// The generator emits a by-name runtime lookup on the receiver value
    Deferred,
}

impl MethodRef {
    pub fn is_deferred(&self) -> bool {
        matches!(self, MethodRef::Deferred)
    }
}

/// A field resolved at analysis time, or deferred for a `def` receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    Resolved(FieldId),
    Deferred,
}

#[derive(Debug)]
pub struct IrBlock {
    pub stmts: Vec<IrStmt>,
    pub span: Span,
}

#[derive(Debug)]
pub enum IrStmt {
    Block(IrBlock),
    Declaration(DeclarationNode),
    Expression(ExpressionNode),
    If(IfNode),
    While(WhileNode),
    ForEachIterable(ForEachIterableNode),
    ForEachIndexable(ForEachIndexableNode),
    ForEachRange(ForEachRangeNode),
    Return(ReturnNode),
    Break { span: Span },
    Continue { span: Span },
}

#[derive(Debug)]
pub struct DeclarationNode {
    pub variable: VarId,
    pub ty: Type,
    pub init: Option<IrExpr>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ExpressionNode {
    pub expr: IrExpr,
    /// The statement position discards the value
    pub discarded: bool,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfNode {
    pub condition: IrExpr,
    pub then_block: IrBlock,
    pub else_block: Option<IrBlock>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WhileNode {
    pub condition: IrExpr,
    pub body: IrBlock,
    pub span: Span,
}

/// Loop over a value satisfying the iteration protocol (or a `def` value,
/// with the protocol method looked up at runtime).
#[derive(Debug)]
pub struct ForEachIterableNode {
    pub iterable: IrExpr,
    pub body: IrBlock,
    pub variable: VarId,
    pub variable_ty: Type,
    /// From the protocol's type-erased element to the declared variable type
    pub cast: Cast,
    pub iterator: VarId,
    pub iterator_ty: Type,
    pub method: MethodRef,
    /// Bounded form; the unbounded variant shares this shape
    pub continuous: bool,
    pub span: Span,
}

/// Loop over a host array by index
#[derive(Debug)]
pub struct ForEachIndexableNode {
    pub iterable: IrExpr,
    pub body: IrBlock,
    pub variable: VarId,
    pub variable_ty: Type,
    /// From the array's element type to the declared variable type
    pub cast: Cast,
    pub array: VarId,
    pub array_ty: Type,
    pub index: VarId,
    pub element_ty: Type,
    pub continuous: bool,
    pub span: Span,
}

/// Loop over a numeric range by counting
#[derive(Debug)]
pub struct ForEachRangeNode {
    pub iterable: IrExpr,
    pub body: IrBlock,
    pub variable: VarId,
    pub variable_ty: Type,
    /// From the range's element type to the declared variable type
    pub cast: Cast,
    pub end: VarId,
    pub continuous: bool,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnNode {
    pub value: Option<IrExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Bool(bool),
    Str(String),
    Null,
}

#[derive(Debug)]
pub enum IrExpr {
    Constant {
        value: Constant,
        ty: Type,
        span: Span,
    },
    VarAccess {
        variable: VarId,
        ty: Type,
        span: Span,
    },
    Assign {
        variable: VarId,
        value: Box<IrExpr>,
        ty: Type,
        span: Span,
    },
    Call(Box<CallNode>),
    FieldAccess(Box<FieldAccessNode>),
    New(Box<NewNode>),
    /// A non-identity conversion wrapped around its operand
    Cast {
        cast: Cast,
        value: Box<IrExpr>,
        span: Span,
    },
}

impl IrExpr {
    /// The resolved type of the value this expression produces
    pub fn ty(&self) -> Type {
        match self {
            IrExpr::Constant { ty, .. } => *ty,
            IrExpr::VarAccess { ty, .. } => *ty,
            IrExpr::Assign { ty, .. } => *ty,
            IrExpr::Call(call) => call.ret,
            IrExpr::FieldAccess(access) => access.ty,
            IrExpr::New(new) => new.ty,
            IrExpr::Cast { cast, .. } => cast.to,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            IrExpr::Constant { span, .. } => *span,
            IrExpr::VarAccess { span, .. } => *span,
            IrExpr::Assign { span, .. } => *span,
            IrExpr::Call(call) => call.span,
            IrExpr::FieldAccess(access) => access.span,
            IrExpr::New(new) => new.span,
            IrExpr::Cast { span, .. } => *span,
        }
    }
}

#[derive(Debug)]
pub struct CallNode {
    pub receiver: IrExpr,
    pub method: MethodRef,
    /// Needed by the generator for deferred dispatch
    pub name: String,
    pub args: Vec<IrExpr>,
    pub ret: Type,
    pub span: Span,
}

#[derive(Debug)]
pub struct FieldAccessNode {
    pub receiver: IrExpr,
    pub field: FieldRef,
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug)]
pub struct NewNode {
    pub ty: Type,
    pub ctor: CtorId,
    pub args: Vec<IrExpr>,
    pub span: Span,
}
