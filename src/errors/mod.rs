// src/errors/mod.rs
//! Semantic analysis errors (E2xxx).
//!
//! All variants carry the span of the construct that raised them. The first
//! error aborts the analysis pass; there is no recovery or accumulation.

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum SemanticError {
    #[error("variable '{name}' is already declared in this scope")]
    #[diagnostic(code(E2001))]
    DuplicateDeclaration {
        name: String,
        #[label("redeclared here")]
        span: SourceSpan,
    },

    #[error("unresolved name '{name}'")]
    #[diagnostic(code(E2002))]
    UnresolvedName {
        name: String,
        #[label("not found")]
        span: SourceSpan,
    },

    #[error("method [{receiver}, {method}/{arity}] not found")]
    #[diagnostic(code(E2003))]
    MethodNotFound {
        receiver: String,
        method: String,
        arity: usize,
        #[label("no matching method")]
        span: SourceSpan,
    },

    #[error("cannot cast from [{from}] to [{to}]")]
    #[diagnostic(code(E2004))]
    IllegalCast {
        from: String,
        to: String,
        #[label("no conversion applies")]
        span: SourceSpan,
    },

    #[error("field [{receiver}, {field}] not found")]
    #[diagnostic(code(E2005))]
    FieldNotFound {
        receiver: String,
        field: String,
        #[label("no such field")]
        span: SourceSpan,
    },

    #[error("constructor [{ty}/{arity}] not found")]
    #[diagnostic(code(E2006))]
    ConstructorNotFound {
        ty: String,
        arity: usize,
        #[label("no matching constructor")]
        span: SourceSpan,
    },

    #[error("cannot assign to read-only variable '{name}'")]
    #[diagnostic(code(E2007))]
    ReadOnlyAssignment {
        name: String,
        #[label("cannot assign")]
        span: SourceSpan,
    },

    #[error("break outside of loop")]
    #[diagnostic(code(E2008))]
    InvalidBreak {
        #[label("not inside a loop")]
        span: SourceSpan,
    },

    #[error("continue outside of loop")]
    #[diagnostic(code(E2009))]
    InvalidContinue {
        #[label("not inside a loop")]
        span: SourceSpan,
    },
}
