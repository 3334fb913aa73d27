// src/sema/cast.rs
//
// Cast resolution between the static and dynamic type regimes. Every
// analyzer routine calls into here whenever a child's actual type must be
// reconciled with a position's required type; the resolved Cast is embedded
// by value into the IR node that needs it.

use crate::errors::SemanticError;
use crate::frontend::Span;
use crate::sema::catalog::TypeCatalog;
use crate::sema::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    Identity,
    /// Up the concrete hierarchy; always safe
    Widening,
    /// Down the concrete hierarchy; runtime-checked
    Narrowing,
    /// Concrete value widened into `def`
    BoxToDynamic,
    /// `def` value checked against a concrete target at runtime
    UnboxFromDynamic,
    /// Host-registered conversion between unrelated concrete types
    UserReference,
}

/// A resolved conversion rule between two types. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cast {
    pub from: Type,
    pub to: Type,
    pub kind: CastKind,
    /// Only unboxing and narrowing defer a type check to runtime
    pub can_fail: bool,
}

impl Cast {
    fn new(from: Type, to: Type, kind: CastKind) -> Self {
        let can_fail = matches!(kind, CastKind::Narrowing | CastKind::UnboxFromDynamic);
        Self {
            from,
            to,
            kind,
            can_fail,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind == CastKind::Identity
    }
}

/// Decides whether a conversion exists between a source and target type
pub struct CastResolver<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> CastResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve a conversion from `from` to `to`.
    ///
    /// `permit_implicit` covers conversions that always succeed (identity,
    /// boxing, widening); `permit_explicit` additionally admits the
    /// potentially-failing and user-requested ones (unboxing, narrowing,
    /// registered reference conversions). Strict positions pass
    /// `permit_explicit = false` to reject anything that could fail at
    /// runtime.
    pub fn resolve(
        &self,
        span: Span,
        from: Type,
        to: Type,
        permit_implicit: bool,
        permit_explicit: bool,
    ) -> Result<Cast, SemanticError> {
        if from == to {
            return Ok(Cast::new(from, to, CastKind::Identity));
        }

        let cast = match (from, to) {
            (Type::Concrete(_), Type::Dynamic) if permit_implicit || permit_explicit => {
                Some(Cast::new(from, to, CastKind::BoxToDynamic))
            }
            (Type::Dynamic, Type::Concrete(_)) if permit_explicit => {
                Some(Cast::new(from, to, CastKind::UnboxFromDynamic))
            }
            (Type::Concrete(source), Type::Concrete(target)) => {
                if self.catalog.is_assignable(source, target)
                    && (permit_implicit || permit_explicit)
                {
                    Some(Cast::new(from, to, CastKind::Widening))
                } else if self.catalog.is_assignable(target, source) && permit_explicit {
                    Some(Cast::new(from, to, CastKind::Narrowing))
                } else if self.catalog.has_conversion(source, target) && permit_explicit {
                    Some(Cast::new(from, to, CastKind::UserReference))
                } else {
                    None
                }
            }
            _ => None,
        };

        cast.ok_or_else(|| {
            tracing::debug!(
                from = self.catalog.display_type(from),
                to = self.catalog.display_type(to),
                permit_implicit,
                permit_explicit,
                "illegal cast"
            );
            SemanticError::IllegalCast {
                from: self.catalog.display_type(from).to_string(),
                to: self.catalog.display_type(to).to_string(),
                span: span.into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::types::TypeDefId;

    struct Fixture {
        catalog: TypeCatalog,
        object: TypeDefId,
        string: TypeDefId,
        int: TypeDefId,
    }

    fn fixture() -> Fixture {
        let mut catalog = TypeCatalog::new();
        let object = catalog.register_class("Object");
        let string = catalog.register_class("String");
        let int = catalog.register_class("int");
        catalog.add_supertype(string, object);
        Fixture {
            catalog,
            object,
            string,
            int,
        }
    }

    #[test]
    fn identity_always_permitted() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);
        let ty = Type::Concrete(f.string);

        let cast = resolver
            .resolve(Span::default(), ty, ty, false, false)
            .unwrap();
        assert_eq!(cast.kind, CastKind::Identity);
        assert!(!cast.can_fail);
    }

    #[test]
    fn box_and_unbox_round_trip() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);
        let string = Type::Concrete(f.string);

        let boxed = resolver
            .resolve(Span::default(), string, Type::Dynamic, true, true)
            .unwrap();
        assert_eq!(boxed.kind, CastKind::BoxToDynamic);
        assert!(!boxed.can_fail);

        let unboxed = resolver
            .resolve(Span::default(), Type::Dynamic, string, true, true)
            .unwrap();
        assert_eq!(unboxed.kind, CastKind::UnboxFromDynamic);
        assert!(unboxed.can_fail);
    }

    #[test]
    fn unbox_rejected_in_strict_implicit_position() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);

        let err = resolver
            .resolve(
                Span::default(),
                Type::Dynamic,
                Type::Concrete(f.string),
                true,
                false,
            )
            .unwrap_err();
        assert!(matches!(err, SemanticError::IllegalCast { .. }));
    }

    #[test]
    fn widening_is_implicit() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);

        let cast = resolver
            .resolve(
                Span::default(),
                Type::Concrete(f.string),
                Type::Concrete(f.object),
                true,
                false,
            )
            .unwrap();
        assert_eq!(cast.kind, CastKind::Widening);
        assert!(!cast.can_fail);
    }

    #[test]
    fn narrowing_requires_explicit() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);
        let object = Type::Concrete(f.object);
        let string = Type::Concrete(f.string);

        let err = resolver
            .resolve(Span::default(), object, string, true, false)
            .unwrap_err();
        assert!(matches!(err, SemanticError::IllegalCast { .. }));

        let cast = resolver
            .resolve(Span::default(), object, string, true, true)
            .unwrap();
        assert_eq!(cast.kind, CastKind::Narrowing);
        assert!(cast.can_fail);
    }

    #[test]
    fn registered_conversion_is_explicit_only() {
        let mut f = fixture();
        f.catalog.register_conversion(f.int, f.string);
        let resolver = CastResolver::new(&f.catalog);
        let int = Type::Concrete(f.int);
        let string = Type::Concrete(f.string);

        let cast = resolver
            .resolve(Span::default(), int, string, true, true)
            .unwrap();
        assert_eq!(cast.kind, CastKind::UserReference);
        assert!(!cast.can_fail);

        assert!(
            resolver
                .resolve(Span::default(), int, string, true, false)
                .is_err()
        );
    }

    #[test]
    fn unrelated_concrete_types_fail() {
        let f = fixture();
        let resolver = CastResolver::new(&f.catalog);

        let err = resolver
            .resolve(
                Span::default(),
                Type::Concrete(f.int),
                Type::Concrete(f.string),
                true,
                true,
            )
            .unwrap_err();
        match err {
            SemanticError::IllegalCast { from, to, .. } => {
                assert_eq!(from, "int");
                assert_eq!(to, "String");
            }
            other => panic!("expected IllegalCast, got {other:?}"),
        }
    }
}
