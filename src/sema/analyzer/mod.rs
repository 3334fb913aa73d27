// src/sema/analyzer/mod.rs
//
// One analysis routine per syntax-node tag, run bottom-up in a single pass.
// Every routine consumes its children's outputs plus a contextual Input and
// produces typed output with the lowered IR subtree. The catalog is shared
// read-only; the scope is threaded mutably through every call.

mod expr;
mod stmt;

use crate::errors::SemanticError;
use crate::frontend::{Block, Interner, Span, TypeExpr};
use crate::ir::{IrBlock, IrExpr};
use crate::sema::cast::{Cast, CastResolver};
use crate::sema::catalog::TypeCatalog;
use crate::sema::scope::{Scope, Variable};
use crate::sema::types::{Type, TypeDefId};

/// Contextual input to a node's analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct Input {
    /// The type the surrounding position requires, when one is known
    pub expected: Option<Type>,
    /// The surrounding statement discards the produced value
    pub discarded: bool,
    /// A loop body encloses this node
    pub in_loop: bool,
}

impl Input {
    pub fn expecting(ty: Type) -> Self {
        Self {
            expected: Some(ty),
            ..Self::default()
        }
    }
}

/// Result of analyzing one expression: the resolved type and the lowered
/// subtree. Consumed by value by the parent node's analysis.
#[derive(Debug)]
pub struct Output {
    pub actual: Type,
    pub node: IrExpr,
}

/// The finished product of one analysis pass
#[derive(Debug)]
pub struct Analysis {
    pub root: IrBlock,
    /// Arena of every variable the pass declared, user and synthetic alike,
    /// referenced by VarId from the IR
    pub variables: Vec<Variable>,
}

/// Catalog handles the analyzer itself depends on, resolved once at
/// construction. A catalog missing any of these is a host-setup defect.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WellKnownTypes {
    pub bool_ty: TypeDefId,
    pub int: TypeDefId,
    pub string: TypeDefId,
    pub iterator: TypeDefId,
}

impl WellKnownTypes {
    fn resolve(catalog: &TypeCatalog) -> Result<Self, SemanticError> {
        let lookup = |name: &str| {
            catalog
                .resolve_type(name)
                .and_then(Type::concrete)
                .ok_or_else(|| SemanticError::UnresolvedName {
                    name: name.to_string(),
                    span: Span::default().into(),
                })
        };
        Ok(Self {
            bool_ty: lookup("bool")?,
            int: lookup("int")?,
            string: lookup("String")?,
            iterator: lookup("Iterator")?,
        })
    }
}

pub struct Analyzer<'a> {
    catalog: &'a TypeCatalog,
    interner: &'a Interner,
    casts: CastResolver<'a>,
    scope: Scope,
    well_known: WellKnownTypes,
}

impl<'a> Analyzer<'a> {
    pub fn new(catalog: &'a TypeCatalog, interner: &'a Interner) -> Result<Self, SemanticError> {
        let well_known = WellKnownTypes::resolve(catalog)?;
        Ok(Self {
            catalog,
            interner,
            casts: CastResolver::new(catalog),
            scope: Scope::new(),
            well_known,
        })
    }

    /// Analyze a script body. The first error aborts the pass; no partial
    /// IR is returned.
    #[tracing::instrument(skip_all)]
    pub fn analyze(&mut self, block: &Block) -> Result<IrBlock, SemanticError> {
        self.analyze_block(block, Input::default())
    }

    /// Release the variable arena once the pass completes
    pub fn into_variables(self) -> Vec<Variable> {
        self.scope.into_variables()
    }

    /// Current lexical nesting depth, root frame included
    pub fn scope_depth(&self) -> usize {
        self.scope.depth()
    }

    /// Run `f` inside a fresh frame, popping it on every exit path so that
    /// slot accounting stays correct for sibling constructs even when `f`
    /// fails.
    fn with_frame<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SemanticError>,
    ) -> Result<T, SemanticError> {
        self.scope.push_frame();
        let result = f(self);
        self.scope.pop_frame();
        result
    }

    fn resolve_type_expr(&self, ty: &TypeExpr, span: Span) -> Result<Type, SemanticError> {
        match ty {
            TypeExpr::Dynamic => Ok(Type::Dynamic),
            TypeExpr::Named(sym) => {
                let name = self.interner.resolve(*sym);
                self.catalog
                    .resolve_type(name)
                    .ok_or_else(|| SemanticError::UnresolvedName {
                        name: name.to_string(),
                        span: span.into(),
                    })
            }
        }
    }

    /// Reconcile an expression output with a required type, wrapping the
    /// node in a cast when the conversion is not the identity.
    fn cast_to(
        &self,
        output: Output,
        to: Type,
        permit_implicit: bool,
        permit_explicit: bool,
    ) -> Result<IrExpr, SemanticError> {
        let span = output.node.span();
        let cast = self
            .casts
            .resolve(span, output.actual, to, permit_implicit, permit_explicit)?;
        Ok(Self::apply_cast(output.node, cast))
    }

    fn apply_cast(node: IrExpr, cast: Cast) -> IrExpr {
        if cast.is_identity() {
            node
        } else {
            IrExpr::Cast {
                span: node.span(),
                cast,
                value: Box::new(node),
            }
        }
    }
}

/// Analyze one script body against a populated catalog, producing the IR
/// tree and the variable arena it references.
pub fn analyze(
    catalog: &TypeCatalog,
    interner: &Interner,
    block: &Block,
) -> Result<Analysis, SemanticError> {
    let mut analyzer = Analyzer::new(catalog, interner)?;
    let root = analyzer.analyze(block)?;
    Ok(Analysis {
        root,
        variables: analyzer.into_variables(),
    })
}
