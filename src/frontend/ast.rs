// src/frontend/ast.rs

use crate::frontend::Span;

/// Unique identifier for symbols (interned strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// A braced statement sequence. The parser hands the analyzer one of these
/// as the script body.
#[derive(Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statements
#[derive(Debug)]
pub enum Stmt {
    Block(Block),
    Declaration(DeclStmt),
    Expression(ExprStmt),
    If(IfStmt),
    While(WhileStmt),
    ForEach(ForEachStmt),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
}

/// Variable declaration: `T name = init` (initializer optional)
#[derive(Debug)]
pub struct DeclStmt {
    pub ty: TypeExpr,
    pub name: Symbol,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Expression evaluated for effect, result discarded
#[derive(Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for (T name in iterable) body`
#[derive(Debug)]
pub struct ForEachStmt {
    pub decl_ty: TypeExpr,
    pub name: Symbol,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Type expression. The parser recognizes the `def` keyword itself; every
/// other spelling arrives as a name to be resolved against the catalog.
#[derive(Debug, Clone)]
pub enum TypeExpr {
    Dynamic,
    Named(Symbol),
}

#[derive(Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug)]
pub enum ExprKind {
    IntLiteral(i64),
    BoolLiteral(bool),
    StringLiteral(String),
    NullLiteral,
    Var(Symbol),
    /// `target = value` where target is a resolved variable
    Assign {
        target: Symbol,
        value: Box<Expr>,
    },
    /// `receiver.method(args...)`
    Call {
        receiver: Box<Expr>,
        method: Symbol,
        args: Vec<Expr>,
    },
    /// `receiver.field`
    Field {
        receiver: Box<Expr>,
        field: Symbol,
    },
    /// `new T(args...)`
    New {
        ty: TypeExpr,
        args: Vec<Expr>,
    },
    /// `(T)value` - a user-requested conversion
    Cast {
        ty: TypeExpr,
        value: Box<Expr>,
    },
}
