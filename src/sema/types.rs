// src/sema/types.rs
//
// The dual type regime: every value is either a concrete host type from the
// catalog or the single universal dynamic type `def`. Dynamic is a sentinel
// variant, never an entry in the catalog's concrete table, and every query
// that touches the catalog branches on the tag first.

/// Handle to a concrete type definition in the TypeCatalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(u32);

impl TypeDefId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}

/// A resolved type: a concrete host type or the dynamic sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// The universal `def` type; values carry their concrete type at runtime
    Dynamic,
    Concrete(TypeDefId),
}

impl Type {
    #[inline]
    pub fn is_dynamic(self) -> bool {
        matches!(self, Type::Dynamic)
    }

    /// The concrete handle, if this is not `def`
    #[inline]
    pub fn concrete(self) -> Option<TypeDefId> {
        match self {
            Type::Dynamic => None,
            Type::Concrete(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_is_copy_and_compares_by_identity() {
        let a = Type::Concrete(TypeDefId::new(3));
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, Type::Concrete(TypeDefId::new(4)));
        assert_ne!(a, Type::Dynamic);
        assert_eq!(Type::Dynamic, Type::Dynamic);
    }

    #[test]
    fn dynamic_has_no_concrete_handle() {
        assert!(Type::Dynamic.concrete().is_none());
        assert_eq!(
            Type::Concrete(TypeDefId::new(0)).concrete(),
            Some(TypeDefId::new(0))
        );
    }
}
